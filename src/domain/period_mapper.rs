//! Period-to-hour mapping under the power trading day convention.

/// Maps a raw 1-based period index to its calendar hour.
///
/// Period 1 is 23:00 of the previous day, period 2 is 00:00, and so on up to
/// period 24 at 22:00. Indices above 24 are passed through unchecked; the
/// resulting hour is validated when the report period is built.
pub fn period_to_hour(period: i32) -> i32 {
    if period == 1 { 23 } else { period - 2 }
}
