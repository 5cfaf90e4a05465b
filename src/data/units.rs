//! Number formatting for table cells.

const KIB: f64 = 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Bytes per second shown as KiB/s with one decimal.
pub fn format_kib_rate(bytes_per_sec: f64) -> String {
    format!("{:.1}", bytes_per_sec / KIB)
}

/// "used / max" in GiB, e.g. `  1.5 / 4.0  `.
pub fn format_gib_pair(used: u64, max: u64) -> String {
    format!("{:5.1} / {:<5.1}", used as f64 / GIB, max as f64 / GIB)
}

/// A percentage with one decimal.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}", value)
}

/// Cut `s` to at most `max` characters, ending in "..." when shortened.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().take(max).collect();
    }
    let mut out: String = s.chars().take(max - 3).collect();
    out.push_str("...");
    out
}
