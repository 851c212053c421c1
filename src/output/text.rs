//! Human-readable text output

use crate::config::Config;
use crate::coordinator::{RunReport, RunState};
use crate::stats::live::capitalize;
use crate::util::time::{format_bytes, format_duration, format_throughput};

const RULE: &str = "═══════════════════════════════════════════════════════════";

/// Print the test parameters before the pool is filled
pub fn print_configuration(config: &Config) {
    println!("[Test Parameters]");
    print!("{}", config);
    println!();
}

/// Print the final summary of a run
pub fn print_results(report: &RunReport) {
    println!();
    println!("{}", RULE);
    println!("                    TEST RESULTS");
    println!("{}", RULE);
    println!();

    println!("Outcome: {}", describe_state(report));
    println!("{}", elapsed_line(report));
    println!();

    let label = capitalize(report.mode.verb());
    println!("Operations:");
    println!("{}", operations_line(report, &label));
    if report.workers > 1 {
        println!("  Workers: {}", report.workers);
    }
    println!();

    println!("Throughput:");
    println!("  {}: {}", label, format_throughput(report.throughput()));
    println!();

    println!("Latency:");
    match report.latency {
        Some(latency) => {
            println!("  Min:    {}", format_duration(latency.min));
            println!("  Mean:   {}", format_duration(latency.mean));
            println!("  Max:    {}", format_duration(latency.max));
            println!();
            println!("  Percentiles:");
            for (p, value) in [
                (50.0, latency.p50),
                (90.0, latency.p90),
                (99.0, latency.p99),
                (99.9, latency.p999),
            ] {
                println!("    p{:5.2}: {}", p, format_duration(value));
            }
        }
        None => println!("  No latency data collected"),
    }

    println!();
    println!("{}", RULE);
}

fn elapsed_line(report: &RunReport) -> String {
    format!(
        "Elapsed Time: {:.3}s (busy {:.3}s)",
        report.wall.as_secs_f64(),
        report.stats.total_duration.as_secs_f64()
    )
}

fn operations_line(report: &RunReport, label: &str) -> String {
    format!(
        "  {}: {} ops ({})",
        label,
        format_number(report.stats.operation_count),
        format_bytes(report.stats.total_bytes)
    )
}

fn describe_state(report: &RunReport) -> String {
    match report.state {
        RunState::Converged => format!(
            "throughput converged after {} samples",
            report.stability_samples
        ),
        RunState::Completed => "iteration budget completed".to_string(),
        RunState::Interrupted => "interrupted".to_string(),
        other => other.to_string(),
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();

    for (count, c) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}
