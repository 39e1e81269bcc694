#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};
use chrono_tz::Europe::London;
use chrono_tz::Tz;
use parking_lot::Mutex;
use power_position::domain::error::PositionError;
use power_position::domain::report::PositionReport;
use power_position::domain::report_period::ReportPeriod;
use power_position::domain::trade::PowerTrade;
use power_position::ports::report_port::ReportPort;
use power_position::ports::trade_port::TradePort;
use power_position::ports::trigger_port::{
    SubscriptionId, TriggerEvent, TriggerHandler, TriggerPort,
};
use power_position::service::generator::ReportGenerator;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

pub fn london(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
    London.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub fn failure(reason: &str) -> PositionError {
    PositionError::TradeSource {
        reason: reason.to_string(),
    }
}

pub fn empty_report(timestamp: DateTime<Tz>) -> PositionReport {
    PositionReport::new(timestamp, Vec::new()).unwrap()
}

pub fn report_with(timestamp: DateTime<Tz>, periods: &[(i32, f64)]) -> PositionReport {
    let periods = periods
        .iter()
        .map(|&(h, v)| ReportPeriod::new(h, v).unwrap());
    PositionReport::new(timestamp, periods).unwrap()
}

/// Trade source returning scripted results in order, then a fallback.
pub struct MockTradePort {
    script: Mutex<VecDeque<Result<Vec<PowerTrade>, String>>>,
    fallback: Vec<PowerTrade>,
    pub requested: Mutex<Vec<DateTime<Tz>>>,
}

impl MockTradePort {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Vec::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_trades(mut self, trades: Vec<PowerTrade>) -> Self {
        self.fallback = trades;
        self
    }

    pub fn then_fail(self, reason: &str) -> Self {
        self.script.lock().push_back(Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().len()
    }
}

#[async_trait]
impl TradePort for MockTradePort {
    async fn fetch_trades(&self, date: DateTime<Tz>) -> Result<Vec<PowerTrade>, PositionError> {
        self.requested.lock().push(date);
        match self.script.lock().pop_front() {
            Some(Ok(trades)) => Ok(trades),
            Some(Err(reason)) => Err(failure(&reason)),
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Generator that fails a set number of times before producing reports.
pub struct ScriptedGenerator {
    failures_before_success: usize,
    delay: Duration,
    pub calls: Mutex<Vec<DateTime<Tz>>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    periods: Vec<(i32, f64)>,
}

impl ScriptedGenerator {
    pub fn succeeding() -> Self {
        Self::failing(0)
    }

    pub fn failing(times: usize) -> Self {
        Self {
            failures_before_success: times,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            periods: Vec::new(),
        }
    }

    pub fn always_failing() -> Self {
        Self::failing(usize::MAX)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_periods(mut self, periods: &[(i32, f64)]) -> Self {
        self.periods = periods.to_vec();
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ReportGenerator for ScriptedGenerator {
    async fn generate(&self, extract_time: DateTime<Tz>) -> Result<PositionReport, PositionError> {
        let attempt = {
            let mut calls = self.calls.lock();
            calls.push(extract_time);
            calls.len()
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if attempt <= self.failures_before_success {
            return Err(failure(&format!("generation failure {attempt}")));
        }
        Ok(report_with(extract_time, &self.periods))
    }
}

/// Exporter that records every report it is handed.
#[derive(Default)]
pub struct RecordingExporter {
    pub exported: Mutex<Vec<PositionReport>>,
}

impl RecordingExporter {
    pub fn count(&self) -> usize {
        self.exported.lock().len()
    }
}

#[async_trait]
impl ReportPort for RecordingExporter {
    async fn export(&self, report: &PositionReport) -> Result<(), PositionError> {
        self.exported.lock().push(report.clone());
        Ok(())
    }
}

/// Trigger fired by hand from tests.
#[derive(Default)]
pub struct ManualTrigger {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, TriggerHandler)>>,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl ManualTrigger {
    pub fn fire(&self, fired_at: DateTime<Tz>) {
        let handlers: Vec<TriggerHandler> =
            self.handlers.lock().iter().map(|(_, h)| h.clone()).collect();
        for handler in handlers {
            handler(TriggerEvent { fired_at });
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().len()
    }
}

impl TriggerPort for ManualTrigger {
    fn subscribe(&self, handler: TriggerHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.handlers.lock().push((id, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != id);
        handlers.len() != before
    }

    fn start(&self) -> Result<(), PositionError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: String,
}

/// Tracing layer that keeps every event for later assertions.
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    /// Installs the capture as the thread's default subscriber.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        use tracing_subscriber::prelude::*;
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, level: Level, message: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.level == level && e.message.contains(message))
            .count()
    }

    pub fn find(&self, level: Level, message: &str) -> Option<CapturedEvent> {
        self.events
            .lock()
            .iter()
            .find(|e| e.level == level && e.message.contains(message))
            .cloned()
    }
}

#[derive(Default)]
struct FieldRecorder {
    message: String,
    fields: Vec<String>,
}

impl Visit for FieldRecorder {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);
        self.events.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            message: recorder.message,
            fields: recorder.fields.join(" "),
        });
    }
}
