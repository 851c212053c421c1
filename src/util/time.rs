//! Size, rate and duration formatting

use std::time::Duration;

/// Format a byte count in binary units ("512.00 B", "16.00 KB", "1.50 GB")
///
/// # Examples
///
/// ```
/// use durabench::util::time::format_bytes;
///
/// assert_eq!(format_bytes(512), "512.00 B");
/// assert_eq!(format_bytes(4096), "4.00 KB");
/// assert_eq!(format_bytes(16 * 1024 * 1024 * 1024), "16.00 GB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    format_scaled(bytes as f64)
}

fn format_scaled(mut value: f64) -> String {
    const SUFFIXES: [&str; 6] = ["", "K", "M", "G", "T", "P"];

    for suffix in &SUFFIXES[..SUFFIXES.len() - 1] {
        if value < 1024.0 {
            return format!("{:.2} {}B", value, suffix);
        }
        value /= 1024.0;
    }
    format!("{:.4} {}B", value, SUFFIXES[SUFFIXES.len() - 1])
}

/// Format a throughput in the report style ("2.50 MB /s")
pub fn format_throughput(bytes_per_sec: f64) -> String {
    format!("{} /s", format_scaled(bytes_per_sec.max(0.0)))
}

/// Format a duration in human-readable form
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use durabench::util::time::format_duration;
///
/// assert_eq!(format_duration(Duration::from_nanos(500)), "500ns");
/// assert_eq!(format_duration(Duration::from_micros(2500)), "2.50ms");
/// assert_eq!(format_duration(Duration::from_secs(5)), "5.00s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos < 1_000 {
        format!("{}ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2}us", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.2}ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", nanos as f64 / 1_000_000_000.0)
    }
}

/// Calculate throughput from bytes transferred and duration
///
/// Returns 0 for a zero duration.
pub fn calculate_throughput(bytes: u64, duration: Duration) -> f64 {
    let seconds = duration.as_secs_f64();
    if seconds > 0.0 {
        bytes as f64 / seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536 * 1024), "1.50 MB");
        assert_eq!(format_bytes(1000 * 1024 * 1024), "1000.00 MB");
    }

    #[test]
    fn test_format_bytes_largest_unit() {
        let eb = 1024u64.pow(5) * 2048;
        assert_eq!(format_bytes(eb), "2048.0000 PB");
    }

    #[test]
    fn test_format_throughput() {
        assert_eq!(format_throughput(500.0), "500.00 B /s");
        assert_eq!(format_throughput(2_621_440.0), "2.50 MB /s");
        assert_eq!(format_throughput(-1.0), "0.00 B /s");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_nanos(1500)), "1.50us");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn test_calculate_throughput() {
        let duration = Duration::from_secs(10);
        let throughput = calculate_throughput(1024 * 1024 * 10, duration); // 10MB in 10s
        assert_eq!(throughput, 1024.0 * 1024.0);
        assert_eq!(calculate_throughput(1000, Duration::ZERO), 0.0);
    }
}
