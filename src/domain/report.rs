//! Power position report: validated, trading-day ordered hourly volumes.

use crate::domain::error::PositionError;
use crate::domain::report_period::ReportPeriod;
use chrono::DateTime;
use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub struct PositionReport {
    timestamp: DateTime<Tz>,
    periods: Vec<ReportPeriod>,
}

impl PositionReport {
    /// Builds a report, rejecting duplicate hours and storing the periods
    /// in power trading day order regardless of input order.
    pub fn new(
        timestamp: DateTime<Tz>,
        periods: impl IntoIterator<Item = ReportPeriod>,
    ) -> Result<Self, PositionError> {
        let mut periods: Vec<ReportPeriod> = periods.into_iter().collect();

        let duplicates = duplicate_hours(&periods);
        if !duplicates.is_empty() {
            return Err(PositionError::DuplicatePeriods { hours: duplicates });
        }

        periods.sort();
        Ok(Self { timestamp, periods })
    }

    /// Like [`PositionReport::new`], for callers whose period list may be absent.
    pub fn from_optional(
        timestamp: DateTime<Tz>,
        periods: Option<Vec<ReportPeriod>>,
    ) -> Result<Self, PositionError> {
        match periods {
            Some(periods) => Self::new(timestamp, periods),
            None => Err(PositionError::MissingPeriods),
        }
    }

    pub fn timestamp(&self) -> DateTime<Tz> {
        self.timestamp
    }

    pub fn periods(&self) -> &[ReportPeriod] {
        &self.periods
    }

    pub fn period_count(&self) -> usize {
        self.periods.len()
    }
}

/// Hours seen more than once, in order of first occurrence.
fn duplicate_hours(periods: &[ReportPeriod]) -> Vec<u32> {
    let mut counts: Vec<(u32, usize)> = Vec::new();
    for p in periods {
        match counts.iter_mut().find(|(h, _)| *h == p.hour()) {
            Some((_, n)) => *n += 1,
            None => counts.push((p.hour(), 1)),
        }
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(h, _)| h)
        .collect()
}
