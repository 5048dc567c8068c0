/// Format a countdown in seconds as "Xh Ym" or "Ym", rounding up to the
/// next whole minute so a prayer 20 seconds away never reads "0m".
pub fn format_duration_secs(secs: i64) -> String {
    if secs <= 0 {
        return "now".to_string();
    }
    let total_minutes = (secs + 59) / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Provider times come back as "5:12 am"; show them the way the clock does.
pub fn display_time(raw: &str) -> String {
    let trimmed = raw.trim();
    let upper = trimmed.to_ascii_uppercase();
    for marker in ["AM", "PM"] {
        if let Some(clock) = upper.strip_suffix(marker) {
            return format!("{} {}", clock.trim_end(), marker);
        }
    }
    trimmed.to_string()
}
