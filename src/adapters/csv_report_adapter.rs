//! CSV position report exporter.

use crate::domain::error::PositionError;
use crate::domain::report::PositionReport;
use crate::ports::report_port::ReportPort;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const HEADER: [&str; 2] = ["Local Time", "Volume"];

pub struct CsvReportAdapter {
    output_directory: PathBuf,
}

impl CsvReportAdapter {
    pub fn new(output_directory: PathBuf) -> Self {
        Self { output_directory }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// `PowerPosition_report.YYYYMMDD_HHMM.csv`, from the report's local timestamp.
    pub fn file_name(report: &PositionReport) -> String {
        format!(
            "PowerPosition_report.{}.csv",
            report.timestamp().format("%Y%m%d_%H%M")
        )
    }

    pub fn file_path(&self, report: &PositionReport) -> PathBuf {
        self.output_directory.join(Self::file_name(report))
    }
}

/// Rounds half to even, so 100.5 becomes 100 and 101.5 becomes 102.
pub fn round_volume(volume: f64) -> i64 {
    volume.round_ties_even() as i64
}

/// Renders the report as CSV text in its stored period order.
pub fn render(report: &PositionReport) -> Result<Vec<u8>, PositionError> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(HEADER)?;
    for period in report.periods() {
        wtr.write_record([period.label(), round_volume(period.volume()).to_string()])?;
    }
    wtr.into_inner().map_err(|e| PositionError::Io(e.into_error()))
}

#[async_trait]
impl ReportPort for CsvReportAdapter {
    async fn export(&self, report: &PositionReport) -> Result<(), PositionError> {
        let path = self.file_path(report);
        let export_err = |e: &dyn std::fmt::Display| PositionError::Export {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        tokio::fs::create_dir_all(&self.output_directory)
            .await
            .map_err(|e| export_err(&e))?;
        let bytes = render(report).map_err(|e| export_err(&e))?;
        tokio::fs::write(&path, bytes).await.map_err(|e| export_err(&e))?;

        debug!(path = %path.display(), period_count = report.period_count(), "report written");
        Ok(())
    }
}
