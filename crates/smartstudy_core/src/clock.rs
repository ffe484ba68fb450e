//! Wall-clock helpers. Timestamps are Unix epoch milliseconds everywhere.

use chrono::{Local, TimeZone, Utc};

pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Formats an epoch-millis timestamp as a local `dd MMM yyyy` date, e.g.
/// `05 Mar 2024`. Out-of-range values fall back to today.
pub fn format_date(epoch_ms: i64) -> String {
    let date = Local
        .timestamp_millis_opt(epoch_ms)
        .single()
        .unwrap_or_else(Local::now);
    date.format("%d %b %Y").to_string()
}
