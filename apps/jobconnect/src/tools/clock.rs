use chrono::{DateTime, Duration, Utc};

/// Singapore does not observe daylight saving, so a fixed +8h offset is exact.
const SINGAPORE_UTC_OFFSET_HOURS: i64 = 8;

const DISPLAY_FORMAT: &str = "%I:%M %p, %d %B %Y";

/// Current wall-clock time in Singapore, e.g. `03:07 PM, 18 October 2026`.
pub fn singapore_time() -> String {
    format_singapore(Utc::now())
}

pub fn format_singapore(now: DateTime<Utc>) -> String {
    (now.naive_utc() + Duration::hours(SINGAPORE_UTC_OFFSET_HOURS))
        .format(DISPLAY_FORMAT)
        .to_string()
}
