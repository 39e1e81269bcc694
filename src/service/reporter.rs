//! Intraday position reporter: turns trigger ticks into report cycles.
//!
//! Each tick spawns an independent generate-then-export cycle wrapped in the
//! retry policy. Cycles are not serialized; back-to-back ticks may run
//! concurrently, each writing its own timestamped file. A failed cycle is
//! logged and the reporter keeps waiting for the next tick.

use crate::domain::error::PositionError;
use crate::ports::clock_port::Clock;
use crate::ports::report_port::ReportPort;
use crate::ports::trigger_port::{TriggerEvent, TriggerPort};
use crate::service::generator::ReportGenerator;
use crate::service::retry::RetryPolicy;
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Name under which report cycles run through the retry policy.
pub const OPERATION_NAME: &str = "ReportGeneration";

#[derive(Clone)]
pub struct IntradayReporter {
    trigger: Arc<dyn TriggerPort>,
    generator: Arc<dyn ReportGenerator>,
    exporter: Arc<dyn ReportPort>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl IntradayReporter {
    pub fn new(
        trigger: Arc<dyn TriggerPort>,
        generator: Arc<dyn ReportGenerator>,
        exporter: Arc<dyn ReportPort>,
        clock: Arc<dyn Clock>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            trigger,
            generator,
            exporter,
            clock,
            retry,
        }
    }

    /// Generates and exports one report for `timestamp` under the retry
    /// policy, logging the outcome.
    pub async fn run_cycle(&self, timestamp: DateTime<Tz>) -> Result<(), PositionError> {
        info!(%timestamp, "generating report for timestamp");

        let result = self
            .retry
            .execute(OPERATION_NAME, move || async move {
                let report = self.generator.generate(timestamp).await?;
                self.exporter.export(&report).await?;
                Ok::<_, PositionError>(report)
            })
            .await;

        match result {
            Ok(report) => {
                info!(
                    period_count = report.period_count(),
                    report_timestamp = %report.timestamp(),
                    "report generated and exported successfully"
                );
                Ok(())
            }
            Err(e) => {
                error!(%timestamp, error = %e, "failed to generate or export report");
                Err(e)
            }
        }
    }

    /// Runs until `cancel` fires: one warm-up cycle, then a cycle per tick.
    ///
    /// Cancellation during the warm-up cycle abandons it and returns without
    /// starting the trigger. Only a trigger that refuses to start is returned
    /// as an error. Cycles still in flight at shutdown are left to finish on
    /// their own.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), PositionError> {
        info!("intraday reporter starting");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("intraday reporter cancelled before trigger start");
                info!("intraday reporter stopped");
                return Ok(());
            }
            _ = self.run_cycle(self.clock.now()) => {}
        }

        let runtime = tokio::runtime::Handle::current();
        let reporter = self.clone();
        let subscription = self.trigger.subscribe(Arc::new(move |event: TriggerEvent| {
            let reporter = reporter.clone();
            runtime.spawn(async move {
                let _ = reporter.run_cycle(event.fired_at).await;
            });
        }));

        if let Err(e) = self.trigger.start() {
            self.trigger.unsubscribe(subscription);
            error!(error = %e, "failed to start trigger");
            return Err(e);
        }
        info!("intraday reporter started, trigger is now active");

        cancel.cancelled().await;
        info!("intraday reporter cancellation requested");

        self.trigger.stop();
        self.trigger.unsubscribe(subscription);
        info!("intraday reporter stopped");
        Ok(())
    }
}
