//! Domain error types.

/// Top-level error type for the position reporting service.
#[derive(Debug, thiserror::Error)]
pub enum PositionError {
    #[error("invalid argument {name}: {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("hour {hour} is outside 0..=23")]
    InvalidHour { hour: i32 },

    #[error("duplicate periods found: {}", format_hours(.hours))]
    DuplicatePeriods { hours: Vec<u32> },

    #[error("report periods are missing")]
    MissingPeriods,

    #[error("trade source error: {reason}")]
    TradeSource { reason: String },

    #[error("export to {path} failed: {reason}")]
    Export { path: String, reason: String },

    #[error("trigger has been stopped and cannot be restarted")]
    TriggerDisposed,

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_hours(hours: &[u32]) -> String {
    hours
        .iter()
        .map(|h| format!("{h:02}:00"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<&PositionError> for std::process::ExitCode {
    fn from(err: &PositionError) -> Self {
        let code: u8 = match err {
            PositionError::Io(_) => 1,
            PositionError::ConfigParse { .. }
            | PositionError::ConfigMissing { .. }
            | PositionError::ConfigInvalid { .. } => 2,
            PositionError::TradeSource { .. } => 3,
            PositionError::InvalidHour { .. }
            | PositionError::DuplicatePeriods { .. }
            | PositionError::MissingPeriods => 4,
            PositionError::Export { .. } | PositionError::Csv(_) => 5,
            PositionError::InvalidArgument { .. } | PositionError::TriggerDisposed => 6,
        };
        std::process::ExitCode::from(code)
    }
}
