//! Resolve local wall-clock slot times to UTC instants.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for slot start times that fall in a DST gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Drop instances whose local start does not exist.
    Skip,
    /// Move the start forward by one hour, past the gap.
    #[default]
    ShiftForward,
}

/// Convert a local datetime in `tz` to UTC.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Nonexistent times
/// follow `policy`; `None` means the instance is skipped.
pub fn localize(local: NaiveDateTime, tz: Tz, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => tz
                .from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        },
    }
}
