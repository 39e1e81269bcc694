//! CSV file trade source.
//!
//! Reads `trades_YYYYMMDD.csv` for the requested trading date from a base
//! directory. Columns are `trade_id,period,volume`; rows sharing a
//! `trade_id` make up one trade.

use crate::domain::error::PositionError;
use crate::domain::trade::{PowerPeriod, PowerTrade};
use crate::ports::trade_port::TradePort;
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvTradeAdapter {
    base_path: PathBuf,
}

impl CsvTradeAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, date: &DateTime<Tz>) -> PathBuf {
        self.base_path
            .join(format!("trades_{}.csv", date.format("%Y%m%d")))
    }
}

fn source_err(reason: String) -> PositionError {
    PositionError::TradeSource { reason }
}

/// Parses trade rows, keeping trades in order of first appearance.
pub fn parse_trades(content: &str) -> Result<Vec<PowerTrade>, PositionError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut trades: Vec<PowerTrade> = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| source_err(format!("CSV parse error: {e}")))?;
        let line = row + 2;

        let trade_id = record
            .get(0)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| source_err(format!("missing trade_id on line {line}")))?;

        let period: i32 = record
            .get(1)
            .ok_or_else(|| source_err(format!("missing period on line {line}")))?
            .parse()
            .map_err(|e| source_err(format!("invalid period on line {line}: {e}")))?;
        if period < 1 {
            return Err(source_err(format!(
                "period must be at least 1 on line {line}, got {period}"
            )));
        }

        let volume: f64 = record
            .get(2)
            .ok_or_else(|| source_err(format!("missing volume on line {line}")))?
            .parse()
            .map_err(|e| source_err(format!("invalid volume on line {line}: {e}")))?;

        let entry = PowerPeriod::new(period, volume);
        match trades.iter_mut().find(|t| t.trade_id == trade_id) {
            Some(trade) => trade.periods.push(entry),
            None => trades.push(PowerTrade::new(trade_id, vec![entry])),
        }
    }

    Ok(trades)
}

#[async_trait]
impl TradePort for CsvTradeAdapter {
    async fn fetch_trades(&self, date: DateTime<Tz>) -> Result<Vec<PowerTrade>, PositionError> {
        let path = self.csv_path(&date);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| source_err(format!("failed to read {}: {}", path.display(), e)))?;
        let trades = parse_trades(&content)?;
        debug!(path = %path.display(), trade_count = trades.len(), "loaded trades");
        Ok(trades)
    }
}
