use chrono::Duration;

/// Strip HTML tags from a string, decode common entities and collapse whitespace
pub fn strip_html(s: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    // Clean up HTML entities
    let decoded = result
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to `max_len` characters, ending with an ellipsis when shortened
pub fn truncate(s: &str, max_len: usize) -> String {
    // Replace tabs with spaces and trim to avoid display width issues
    let cleaned = s.replace('\t', " ");
    let cleaned = cleaned.trim();
    if cleaned.chars().count() <= max_len {
        cleaned.to_string()
    } else {
        let head: String = cleaned.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    // Try to parse ISO format and convert to readable
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        // Try to parse YYYY-MM-DD format
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// Human-friendly elapsed time, e.g. "just now", "5m ago", "2h ago"
pub fn age_display(elapsed: Duration) -> String {
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        // Also covers clock skew (negative durations)
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            // Round up: 1h 30m+ becomes 2h
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        format!("{}d ago", minutes / 1440)
    }
}
