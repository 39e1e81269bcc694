//! Async services: report generation, retry policy and the reporting loop.

pub mod generator;
pub mod reporter;
pub mod retry;
