//! Report export port trait.

use crate::domain::error::PositionError;
use crate::domain::report::PositionReport;
use async_trait::async_trait;

/// Port for persisting a finished position report.
#[async_trait]
pub trait ReportPort: Send + Sync {
    async fn export(&self, report: &PositionReport) -> Result<(), PositionError>;
}
