//! Value Formatting

use sweepbench_core::Unit;

/// Human-readable duration from seconds
pub fn format_duration(seconds: f64) -> String {
    let nanos = seconds * 1e9;
    if nanos < 1_000.0 {
        format!("{:.2} ns", nanos)
    } else if nanos < 1_000_000.0 {
        format!("{:.2} us", nanos / 1_000.0)
    } else if nanos < 1_000_000_000.0 {
        format!("{:.2} ms", nanos / 1_000_000.0)
    } else {
        format!("{:.2} s", seconds)
    }
}

/// Human-readable size from bytes
pub fn format_bytes(bytes: f64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024.0 {
        return format!("{} B", bytes.round() as u64);
    }
    let mut value = bytes / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Format a value in its unit
pub fn format_value(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Seconds => format_duration(value),
        Unit::Bytes => format_bytes(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(5e-9), "5.00 ns");
        assert_eq!(format_duration(2.5e-6), "2.50 us");
        assert_eq!(format_duration(0.0123), "12.30 ms");
        assert_eq!(format_duration(3.0), "3.00 s");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512.0), "512 B");
        assert_eq!(format_bytes(1536.0), "1.50 KiB");
        assert_eq!(format_bytes(3.0 * 1024.0 * 1024.0), "3.00 MiB");
    }
}
