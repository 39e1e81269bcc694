//! Position report generation from the external trade source.

use crate::domain::aggregation::aggregate_by_period;
use crate::domain::error::PositionError;
use crate::domain::period_mapper::period_to_hour;
use crate::domain::report::PositionReport;
use crate::domain::report_period::ReportPeriod;
use crate::domain::trading_day::market_trade_date;
use crate::ports::trade_port::TradePort;
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, error, info};

#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, extract_time: DateTime<Tz>) -> Result<PositionReport, PositionError>;
}

pub struct PositionReportGenerator {
    trades: Arc<dyn TradePort>,
    market_zone: Tz,
}

impl PositionReportGenerator {
    pub fn new(trades: Arc<dyn TradePort>, market_zone: Tz) -> Self {
        Self {
            trades,
            market_zone,
        }
    }

    async fn build(&self, extract_time: DateTime<Tz>) -> Result<PositionReport, PositionError> {
        let trade_date = market_trade_date(extract_time, self.market_zone)?;
        let trades = self.trades.fetch_trades(trade_date).await?;
        debug!(trade_count = trades.len(), %trade_date, "retrieved trades");

        let totals = aggregate_by_period(&trades);
        debug!(period_count = totals.len(), "aggregated trades by period");

        let periods = totals
            .into_iter()
            .map(|(period, volume)| ReportPeriod::new(period_to_hour(period), volume))
            .collect::<Result<Vec<_>, _>>()?;

        PositionReport::new(extract_time, periods)
    }
}

#[async_trait]
impl ReportGenerator for PositionReportGenerator {
    async fn generate(&self, extract_time: DateTime<Tz>) -> Result<PositionReport, PositionError> {
        info!(%extract_time, "generating power position report");
        match self.build(extract_time).await {
            Ok(report) => {
                info!(
                    period_count = report.period_count(),
                    "generated power position report"
                );
                Ok(report)
            }
            Err(e) => {
                error!(%extract_time, error = %e, "failed to generate power position report");
                Err(e)
            }
        }
    }
}
