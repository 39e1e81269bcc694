//! Raw trade data as delivered by the external trade source.

/// One hourly slot of a trade. `period` is 1-based in feed order,
/// where period 1 is the 23:00 hour of the previous calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerPeriod {
    pub period: i32,
    pub volume: f64,
}

impl PowerPeriod {
    pub fn new(period: i32, volume: f64) -> Self {
        Self { period, volume }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerTrade {
    pub trade_id: String,
    pub periods: Vec<PowerPeriod>,
}

impl PowerTrade {
    pub fn new(trade_id: impl Into<String>, periods: Vec<PowerPeriod>) -> Self {
        Self {
            trade_id: trade_id.into(),
            periods,
        }
    }

    /// Builds a trade from per-period volumes, numbering periods from 1.
    pub fn from_volumes(trade_id: impl Into<String>, volumes: &[f64]) -> Self {
        let periods = volumes
            .iter()
            .enumerate()
            .map(|(i, &volume)| PowerPeriod::new(i as i32 + 1, volume))
            .collect();
        Self::new(trade_id, periods)
    }
}
