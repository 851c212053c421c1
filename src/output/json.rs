//! JSON results file
//!
//! Written once at the end of a run when `--json-output` is given:
//!
//! ```json
//! {
//!   "tool": "durabench",
//!   "version": "0.1.0",
//!   "started_at": "2024-05-01T12:00:00Z",
//!   "config": { "pool": { ... }, "workload": { ... }, ... },
//!   "result": {
//!     "state": "converged",
//!     "operations": 1000,
//!     "total_bytes": 1048576000,
//!     "busy_seconds": 8.4,
//!     "wall_seconds": 8.5,
//!     "throughput_bytes_per_sec": 124830000.0,
//!     "stability_samples": 10,
//!     "latency_us": { "min": 6100, "mean": 8400, ... }
//!   }
//! }
//! ```

use crate::config::Config;
use crate::coordinator::RunReport;
use crate::stats::LatencySummary;
use crate::Result;
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

/// Top-level results document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    pub tool: String,
    pub version: String,
    pub started_at: String,
    pub config: Config,
    pub result: JsonResult,
}

/// Outcome and counters of the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResult {
    pub state: String,
    pub operations: u64,
    pub total_bytes: u64,
    /// Sum of synced operation times
    pub busy_seconds: f64,
    pub wall_seconds: f64,
    pub throughput_bytes_per_sec: f64,
    pub stability_samples: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_us: Option<JsonLatency>,
}

/// Latency percentiles in microseconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonLatency {
    pub min: u64,
    pub mean: u64,
    pub max: u64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub p999: u64,
}

impl From<LatencySummary> for JsonLatency {
    fn from(summary: LatencySummary) -> Self {
        let us = |d: Duration| d.as_micros() as u64;
        Self {
            min: us(summary.min),
            mean: us(summary.mean),
            max: us(summary.max),
            p50: us(summary.p50),
            p90: us(summary.p90),
            p99: us(summary.p99),
            p999: us(summary.p999),
        }
    }
}

/// Build the results document for a finished run
pub fn build_json_output(config: &Config, report: &RunReport, started_at: DateTime<Utc>) -> JsonOutput {
    JsonOutput {
        tool: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        config: config.clone(),
        result: JsonResult {
            state: report.state.to_string(),
            operations: report.stats.operation_count,
            total_bytes: report.stats.total_bytes,
            busy_seconds: report.stats.total_duration.as_secs_f64(),
            wall_seconds: report.wall.as_secs_f64(),
            throughput_bytes_per_sec: report.throughput(),
            stability_samples: report.stability_samples,
            latency_us: report.latency.map(JsonLatency::from),
        },
    }
}

/// Write the results document to `output_path` (pretty-printed)
pub fn write_json_output(output_path: &Path, output: &JsonOutput) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, output)
        .with_context(|| format!("Failed to write JSON results to {}", output_path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::workload::Mode;
    use crate::coordinator::RunState;
    use crate::stats::RunStats;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn report() -> RunReport {
        RunReport {
            mode: Mode::Write,
            state: RunState::Converged,
            stats: RunStats {
                operation_count: 10,
                total_bytes: 10 * 4096,
                total_duration: Duration::from_secs(2),
            },
            wall: Duration::from_secs(3),
            latency: Some(LatencySummary {
                min: Duration::from_micros(100),
                mean: Duration::from_micros(200),
                max: Duration::from_micros(900),
                p50: Duration::from_micros(180),
                p90: Duration::from_micros(400),
                p99: Duration::from_micros(850),
                p999: Duration::from_micros(900),
            }),
            stability_samples: 2,
            workers: 1,
        }
    }

    #[test]
    fn test_build_json_output() {
        let config = Config::new("/tmp/pool", 2, 4096, Mode::Write);
        let started = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let output = build_json_output(&config, &report(), started);

        assert_eq!(output.tool, "durabench");
        assert_eq!(output.started_at, "2024-05-01T12:00:00Z");
        assert_eq!(output.result.state, "converged");
        assert_eq!(output.result.throughput_bytes_per_sec, 20480.0);
        assert_eq!(output.result.latency_us.unwrap().p99, 850);
    }

    #[test]
    fn test_write_json_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        let config = Config::new(dir.path(), 2, 4096, Mode::Write);
        let output = build_json_output(&config, &report(), Utc::now());

        write_json_output(&path, &output).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["result"]["operations"], 10);
        assert_eq!(value["result"]["stability_samples"], 2);
        assert_eq!(value["config"]["pool"]["file_count"], 2);
        assert_eq!(value["result"]["latency_us"]["min"], 100);
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("results.json");
        let config = Config::new(dir.path(), 1, 4096, Mode::Read);
        let output = build_json_output(&config, &report(), Utc::now());
        assert!(write_json_output(&path, &output).is_err());
    }
}
