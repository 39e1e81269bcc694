//! Core domain types and logic.

pub mod aggregation;
pub mod error;
pub mod period_mapper;
pub mod report;
pub mod report_period;
pub mod settings;
pub mod trade;
pub mod trading_day;
