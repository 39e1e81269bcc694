//! CLI definition and dispatch.

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::csv_trade_adapter::CsvTradeAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::periodic_trigger::PeriodicTrigger;
use crate::adapters::system_clock::{FixedClock, SystemClock};
use crate::domain::error::PositionError;
use crate::domain::settings::ServiceSettings;
use crate::ports::clock_port::Clock;
use crate::service::generator::PositionReportGenerator;
use crate::service::reporter::IntradayReporter;
use crate::service::retry::RetryPolicy;

#[derive(Parser, Debug)]
#[command(name = "power-position", about = "Intraday power position reporting service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the reporting service until interrupted
    Run {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Generate and export a single report, then exit
    Once {
        #[arg(short, long)]
        config: PathBuf,
        /// Local extract time as "YYYY-MM-DD HH:MM" (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run { config } => run_service(&config),
        Command::Once { config, at } => run_once(&config, at.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_settings(path: &Path) -> Result<ServiceSettings, PositionError> {
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| PositionError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    ServiceSettings::from_config(&adapter)
}

/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Wires the file-backed adapters into a reporter.
pub fn build_reporter(
    settings: &ServiceSettings,
    clock: Arc<dyn Clock>,
) -> Result<IntradayReporter, PositionError> {
    let trades = Arc::new(CsvTradeAdapter::new(
        settings.require_trades_directory()?.clone(),
    ));
    let generator = Arc::new(PositionReportGenerator::new(trades, settings.market_zone));
    let exporter = Arc::new(CsvReportAdapter::new(settings.output_directory.clone()));
    let trigger = Arc::new(PeriodicTrigger::new(settings.interval, Arc::clone(&clock))?);
    Ok(IntradayReporter::new(
        trigger,
        generator,
        exporter,
        clock,
        RetryPolicy::new(&settings.retry),
    ))
}

/// Parses a local extract time in the given zone.
pub fn parse_extract_time(value: &str, zone: Tz) -> Result<DateTime<Tz>, PositionError> {
    let invalid = |reason: String| PositionError::InvalidArgument {
        name: "at".to_string(),
        reason,
    };
    let naive = NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M")
        .map_err(|e| invalid(format!("expected YYYY-MM-DD HH:MM: {e}")))?;
    naive
        .and_local_timezone(zone)
        .single()
        .ok_or_else(|| invalid(format!("{value} is ambiguous or skipped in {zone}")))
}

fn build_runtime() -> Result<tokio::runtime::Runtime, PositionError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn fail(err: PositionError) -> ExitCode {
    error!(error = %err, "fatal error");
    (&err).into()
}

fn load_or_report(config_path: &Path) -> Result<ServiceSettings, ExitCode> {
    load_settings(config_path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn run_service(config_path: &Path) -> ExitCode {
    let settings = match load_or_report(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    init_logging(&settings.log_level);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(settings.local_zone));
    let reporter = match build_reporter(&settings, clock) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };
    let runtime = match build_runtime() {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    let cancel = CancellationToken::new();
    let result = runtime.block_on(async {
        let signal = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => signal.cancel(),
                Err(e) => error!(error = %e, "unable to listen for shutdown signal"),
            }
        });
        reporter.run(cancel).await
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

fn run_once(config_path: &Path, at: Option<&str>) -> ExitCode {
    let settings = match load_or_report(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    init_logging(&settings.log_level);

    let clock: Arc<dyn Clock> = match at {
        Some(value) => match parse_extract_time(value, settings.local_zone) {
            Ok(t) => Arc::new(FixedClock::new(t)),
            Err(e) => return fail(e),
        },
        None => Arc::new(SystemClock::new(settings.local_zone)),
    };
    let extract_time = clock.now();
    let reporter = match build_reporter(&settings, clock) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };
    let runtime = match build_runtime() {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    match runtime.block_on(reporter.run_cycle(extract_time)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => (&e).into(),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let settings = match load_or_report(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    println!("interval:         {} minutes", settings.interval.as_secs() / 60);
    println!("output directory: {}", settings.output_directory.display());
    match &settings.trades_directory {
        Some(dir) => println!("trades directory: {}", dir.display()),
        None => println!("trades directory: (not set)"),
    }
    println!(
        "retry:            {} retries, {:?} backoff from {} ms",
        settings.retry.max_retry_attempts,
        settings.retry.backoff,
        settings.retry.initial_delay.as_millis()
    );
    println!("local zone:       {}", settings.local_zone);
    println!("market zone:      {}", settings.market_zone);
    ExitCode::SUCCESS
}
