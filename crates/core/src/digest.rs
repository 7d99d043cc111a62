//! Scheduling helpers for email digests.

use chrono::{Datelike, Duration, FixedOffset, NaiveDateTime, NaiveTime};

use crate::notification::DigestType;
use crate::types::Timestamp;

/// Local hour at which digests are scheduled.
pub const DIGEST_HOUR: u32 = 9;

/// Convert a local wall-clock time in `offset` back to UTC.
pub fn local_to_utc(local: NaiveDateTime, offset: FixedOffset) -> Timestamp {
    (local - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// Next delivery time for a digest of the given cadence.
///
/// Daily digests go out the next day at [`DIGEST_HOUR`]; weekly digests on the
/// next Monday (a full week ahead when today is Monday).
pub fn next_digest_time(digest_type: DigestType, now: Timestamp, offset: FixedOffset) -> Timestamp {
    let today = now.with_timezone(&offset).date_naive();
    let days_ahead = match digest_type {
        DigestType::Daily => 1,
        DigestType::Weekly => {
            let from_sunday = today.weekday().num_days_from_sunday();
            match (8 - from_sunday) % 7 {
                0 => 7,
                n => n,
            }
        }
    };
    let day = today + Duration::days(i64::from(days_ahead));
    let at = NaiveTime::from_hms_opt(DIGEST_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    local_to_utc(day.and_time(at), offset)
}
