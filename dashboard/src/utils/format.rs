//! Human-readable formatting for bytes, durations and percentages

/// Format bytes to human-readable string (1024-based, one decimal)
pub fn human_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;
    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.1} {}", size, UNITS[unit_index])
}

/// Percentage of `value` in `total`, 0 when total is 0
pub fn calculate_percentage(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    value / total * 100.0
}

/// Format a duration in milliseconds for table display
pub fn humanize_time_diff(ms: u64) -> String {
    if ms < 1000 {
        return format!("{}ms", ms);
    }

    // Rounded tenths of a second, so "59.95s" moves up to the minute format
    let tenths = ms / 100 + u64::from(ms % 100 >= 50);
    if tenths < 600 {
        return format!("{}.{}s", tenths / 10, tenths % 10);
    }

    let seconds = tenths / 10;
    if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
