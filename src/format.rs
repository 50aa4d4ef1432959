use chrono::NaiveDateTime;

/// `m:ss`, minutes are not capped at 59
pub fn format_remaining(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Share of the quiz reached when showing question `index` (0-based)
pub fn progress_percent(index: usize, total: usize) -> u16 {
    match total {
        0 => 0,
        total => (((index + 1) as f64 / total as f64) * 100.0).round().min(100.0) as u16,
    }
}

pub fn format_due(due: NaiveDateTime) -> String {
    due.format("%b %-d, %Y %-I:%M %p").to_string()
}

pub fn format_average(avg: f64) -> String {
    if (avg - avg.round()).abs() < f64::EPSILON {
        format!("{}%", avg.round())
    } else {
        format!("{avg:.1}%")
    }
}
