use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Malaysia Time, UTC+08:00 (no daylight saving).
pub const MALAYSIA_UTC_OFFSET_SECS: i32 = 8 * 3600;

pub fn malaysia_offset() -> FixedOffset {
    FixedOffset::east_opt(MALAYSIA_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Current wall-clock time in Malaysia.
pub fn malaysia_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&malaysia_offset())
}
