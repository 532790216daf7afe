use chrono::{DateTime, FixedOffset, Utc};

/// long date in the user's offset, e.g. "Tuesday, 20 October 2026"
pub fn format_date(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%A, %-d %B %Y").to_string()
}

/// 12-hour clock time in the user's offset, e.g. "02:30 PM"
pub fn format_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%I:%M %p").to_string()
}

pub fn payment_type_label(is_recurring: bool) -> &'static str {
    if is_recurring {
        "Recurring Monthly"
    } else {
        "One-time Payment"
    }
}

/// prefix a formatted amount with the currency symbol
pub fn with_currency(symbol: &str, formatted: &str) -> String {
    format!("{}{}", symbol, formatted)
}
