//! CLI to Config conversion utilities

use crate::config::cli;
use crate::config::workload;
use crate::error::BenchError;
use anyhow::{Context, Result};

/// Parse a size string (e.g., "1G", "100M", "4k") to bytes
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("k") || s.ends_with("kb") {
        (s.trim_end_matches("kb").trim_end_matches("k"), 1024u64)
    } else if s.ends_with("m") || s.ends_with("mb") {
        (s.trim_end_matches("mb").trim_end_matches("m"), 1024 * 1024)
    } else if s.ends_with("g") || s.ends_with("gb") {
        (s.trim_end_matches("gb").trim_end_matches("g"), 1024 * 1024 * 1024)
    } else if s.ends_with("t") || s.ends_with("tb") {
        (s.trim_end_matches("tb").trim_end_matches("t"), 1024 * 1024 * 1024 * 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid size format: {}", s))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Size out of range: {}", s))
}

/// Resolve the FILE_SIZE positional, with the optional separate UNIT word
///
/// With a unit, the size must be a plain number and the unit one of
/// `kb`, `mb` or `gb` (case-insensitive). Without one, any [`parse_size`]
/// string is accepted.
pub fn parse_file_size(size: &str, unit: Option<&str>) -> Result<u64> {
    let Some(unit) = unit else {
        return parse_size(size);
    };

    let multiplier: u64 = match unit.trim().to_lowercase().as_str() {
        "kb" => 1024,
        "mb" => 1024 * 1024,
        "gb" => 1024 * 1024 * 1024,
        _ => return Err(BenchError::config("Invalid unit.").into()),
    };

    let num: u64 = size
        .trim()
        .parse()
        .with_context(|| format!("Invalid size format: {}", size))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Size out of range: {} {}", size, unit))
}

/// Parse a tolerance in bytes/second (e.g., "1m", "512k", "0")
pub fn parse_tolerance(s: &str) -> Result<f64> {
    parse_size(s)
        .map(|bytes| bytes as f64)
        .with_context(|| format!("Invalid tolerance: {}", s))
}

/// Convert CLI ModeArg to workload Mode
pub fn convert_mode(cli_mode: cli::ModeArg) -> workload::Mode {
    match cli_mode {
        cli::ModeArg::Write => workload::Mode::Write,
        cli::ModeArg::Read => workload::Mode::Read,
        cli::ModeArg::Endurance => workload::Mode::Endurance,
    }
}

/// Convert CLI SyncMethodArg to workload SyncMethod
pub fn convert_sync_method(cli_method: cli::SyncMethodArg) -> workload::SyncMethod {
    match cli_method {
        cli::SyncMethodArg::Fsync => workload::SyncMethod::Fsync,
        cli::SyncMethodArg::Fdatasync => workload::SyncMethod::Fdatasync,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_bytes() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("4096").unwrap(), 4096);
    }

    #[test]
    fn test_parse_size_suffixes() {
        assert_eq!(parse_size("4k").unwrap(), 4096);
        assert_eq!(parse_size("4KB").unwrap(), 4096);
        assert_eq!(parse_size("1mb").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("100M").unwrap(), 100 * 1024 * 1024);
        assert_eq!(parse_size("16G").unwrap(), 16 * 1024 * 1024 * 1024);
    }

    #[test]
    fn test_parse_size_rejects_garbage() {
        assert!(parse_size("abc").is_err());
        assert!(parse_size("-4k").is_err());
        assert!(parse_size("99999999999t").is_err());
    }

    #[test]
    fn test_parse_file_size_with_unit() {
        assert_eq!(parse_file_size("1", Some("gb")).unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_file_size("16", Some("KB")).unwrap(), 16 * 1024);
        assert_eq!(parse_file_size("1m", None).unwrap(), 1024 * 1024);
    }

    #[test]
    fn test_parse_file_size_invalid_unit() {
        let err = parse_file_size("1", Some("tb")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BenchError>(),
            Some(BenchError::Config(msg)) if msg == "Invalid unit."
        ));
    }

    #[test]
    fn test_parse_tolerance() {
        assert_eq!(parse_tolerance("0").unwrap(), 0.0);
        assert_eq!(parse_tolerance("1m").unwrap(), 1024.0 * 1024.0);
    }
}
