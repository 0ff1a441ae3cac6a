/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

/// Format a price as rupiah with dot thousands separators ("Rp 52.000").
/// Values that are not numbers are shown as-is.
pub fn format_rupiah(harga: &str) -> String {
    let Ok(value) = harga.trim().parse::<f64>() else {
        return harga.to_string();
    };

    let rounded = value.abs().round() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if value < 0.0 && rounded > 0 {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%d %b %Y").to_string()
    } else if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S") {
        dt.format("%d %b %Y").to_string()
    } else if date.len() >= 10 && date.is_char_boundary(10) {
        date[..10].to_string()
    } else {
        date.to_string()
    }
}

/// Human-readable access token lifetime for `whoami`
pub fn format_expiry(minutes: Option<i64>) -> String {
    match minutes {
        None => "unknown".to_string(),
        Some(m) if m <= 0 => "expired".to_string(),
        Some(m) if m < 60 => format!("{} min", m),
        Some(m) => format!("{}h {}m", m / 60, m % 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Kertas HVS", 3), "Ker");
    }

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah("52000"), "Rp 52.000");
        assert_eq!(format_rupiah("1250000.4"), "Rp 1.250.000");
        assert_eq!(format_rupiah("999"), "Rp 999");
        assert_eq!(format_rupiah("0"), "Rp 0");
        assert_eq!(format_rupiah("-2500"), "-Rp 2.500");
        assert_eq!(format_rupiah("-"), "-");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-02-01T08:30:00Z"), "01 Feb 2024");
        assert_eq!(format_date("2024-02-01 08:30:00"), "01 Feb 2024");
        assert_eq!(format_date("2024-02-01"), "2024-02-01");
        assert_eq!(format_date("kemarin"), "kemarin");
    }

    #[test]
    fn test_format_expiry() {
        assert_eq!(format_expiry(None), "unknown");
        assert_eq!(format_expiry(Some(-3)), "expired");
        assert_eq!(format_expiry(Some(14)), "14 min");
        assert_eq!(format_expiry(Some(135)), "2h 15m");
    }
}
