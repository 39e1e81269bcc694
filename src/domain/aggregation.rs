//! Volume aggregation across trades.

use crate::domain::trade::PowerTrade;
use std::collections::BTreeMap;
use tracing::trace;

/// Sums volumes per period index across all trades. Periods that never
/// appear are absent from the result.
pub fn aggregate_by_period(trades: &[PowerTrade]) -> BTreeMap<i32, f64> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for trade in trades {
        trace!(
            trade_id = %trade.trade_id,
            period_count = trade.periods.len(),
            "aggregating trade"
        );
        for p in &trade.periods {
            *totals.entry(p.period).or_insert(0.0) += p.volume;
        }
    }
    totals
}
