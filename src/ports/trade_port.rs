//! External trade source port trait.

use crate::domain::error::PositionError;
use crate::domain::trade::PowerTrade;
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;

/// Source of power trades for a trading date. Implementations may be slow
/// and may fail; retrying is the caller's concern.
#[async_trait]
pub trait TradePort: Send + Sync {
    async fn fetch_trades(&self, date: DateTime<Tz>) -> Result<Vec<PowerTrade>, PositionError>;
}
