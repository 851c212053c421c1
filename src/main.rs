//! durabench CLI entry point

use anyhow::Context;
use durabench::config::cli::Cli;
use durabench::config::toml::load_config;
use durabench::config::validator::validate_config;
use durabench::output::{json, text};
use durabench::{Benchmark, Result, RunState};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if Cli::is_usage_exit(&e) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
            let _ = e.print();
            return code;
        }
    };

    let filter = EnvFilter::new(format!("durabench={}", cli.log_level()));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    println!("durabench v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let config = load_config(&cli)?;
    validate_config(&config).context("Configuration validation failed")?;

    text::print_configuration(&config);

    if config.runtime.dry_run {
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    let stop_flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop_flag);
    ctrlc::set_handler(move || {
        if handler_flag.swap(true, Ordering::SeqCst) {
            warn!("Second interrupt, exiting immediately");
            std::process::exit(130);
        }
        eprintln!("\nInterrupt received, stopping after the current operation...");
    })
    .context("Failed to install Ctrl+C handler")?;

    let started_at = chrono::Utc::now();
    let mut benchmark = Benchmark::new(config.clone())?.with_stop_flag(stop_flag);
    let report = benchmark.run()?;

    text::print_results(&report);
    if report.state == RunState::Interrupted {
        info!("Run interrupted; test files are left in {}", config.pool.directory.display());
    }

    if let Some(path) = &config.output.json_output {
        let output = json::build_json_output(&config, &report, started_at);
        json::write_json_output(path, &output)?;
        println!("Results written to {}", path.display());
    }

    Ok(())
}
