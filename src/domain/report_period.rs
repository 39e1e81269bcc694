//! A single hourly row of a position report.

use crate::domain::error::PositionError;
use std::cmp::Ordering;

/// Hourly volume keyed by calendar hour.
///
/// Equality and ordering consider only `hour`, never `volume`. Ordering
/// follows the power trading day: 23 first, then 0 through 22.
#[derive(Debug, Clone, Copy)]
pub struct ReportPeriod {
    hour: u32,
    volume: f64,
}

impl ReportPeriod {
    pub fn new(hour: i32, volume: f64) -> Result<Self, PositionError> {
        match u32::try_from(hour) {
            Ok(h) if h <= 23 => Ok(Self { hour: h, volume }),
            _ => Err(PositionError::InvalidHour { hour }),
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// `HH:mm` label of the period start.
    pub fn label(&self) -> String {
        format!("{:02}:00", self.hour)
    }
}

/// Position of `hour` within the power trading day.
pub fn trading_day_order(hour: u32) -> u32 {
    if hour == 23 { 0 } else { hour + 1 }
}

/// Compares two possibly absent periods; a present period ranks after an
/// absent one.
pub fn compare_periods(a: Option<&ReportPeriod>, b: Option<&ReportPeriod>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

impl PartialEq for ReportPeriod {
    fn eq(&self, other: &Self) -> bool {
        self.hour == other.hour
    }
}

impl Eq for ReportPeriod {}

impl PartialOrd for ReportPeriod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReportPeriod {
    fn cmp(&self, other: &Self) -> Ordering {
        trading_day_order(self.hour).cmp(&trading_day_order(other.hour))
    }
}
