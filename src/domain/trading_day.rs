//! Trading date boundary: extracts at or after 23:00 belong to the next day.

use crate::domain::error::PositionError;
use chrono::{DateTime, Days, LocalResult, Offset, TimeDelta, TimeZone, Timelike};
use chrono_tz::Tz;

/// First hour that belongs to the following trading date.
pub const TRADING_DAY_START_HOUR: u32 = 23;

/// Local extract time shifted onto the trading date it reports on.
///
/// Before 23:00 the extract time is returned unchanged; from 23:00 it moves
/// one calendar day forward, keeping the wall-clock time. If a clock change
/// makes that wall-clock time ambiguous the earlier instant is used; if it
/// skips it, the extract time's offset is kept.
pub fn trading_date(extract_time: DateTime<Tz>) -> Result<DateTime<Tz>, PositionError> {
    if extract_time.hour() < TRADING_DAY_START_HOUR {
        return Ok(extract_time);
    }
    let zone = extract_time.timezone();
    let shifted = extract_time
        .naive_local()
        .checked_add_days(Days::new(1))
        .and_then(|next| match zone.from_local_datetime(&next) {
            LocalResult::Single(t) => Some(t),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => {
                let offset = i64::from(extract_time.offset().fix().local_minus_utc());
                next.checked_sub_signed(TimeDelta::seconds(offset))
                    .map(|utc| zone.from_utc_datetime(&utc))
            }
        });
    shifted.ok_or_else(|| PositionError::InvalidArgument {
        name: "extract_time".to_string(),
        reason: format!("no next trading day for {extract_time}"),
    })
}

/// Trading date expressed in the market time zone, as passed to the trade source.
pub fn market_trade_date(
    extract_time: DateTime<Tz>,
    market_zone: Tz,
) -> Result<DateTime<Tz>, PositionError> {
    Ok(trading_date(extract_time)?.with_timezone(&market_zone))
}
