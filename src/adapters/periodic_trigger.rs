//! Fixed-interval trigger driven by a tokio timer task.
//!
//! The first event fires as soon as the trigger starts, then once per
//! interval. Handlers run synchronously on the timer task; anything slow
//! belongs in a task the handler spawns.

use crate::domain::error::PositionError;
use crate::ports::clock_port::Clock;
use crate::ports::trigger_port::{SubscriptionId, TriggerEvent, TriggerHandler, TriggerPort};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

enum TriggerState {
    Idle,
    Running(JoinHandle<()>),
    Stopped,
}

#[derive(Default)]
struct Subscribers {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, TriggerHandler)>>,
}

impl Subscribers {
    fn add(&self, handler: TriggerHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().push((id, handler));
        id
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    fn snapshot(&self) -> Vec<TriggerHandler> {
        self.handlers
            .lock()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect()
    }
}

pub struct PeriodicTrigger {
    interval: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<TriggerState>,
    subscribers: Arc<Subscribers>,
    stopped: Arc<AtomicBool>,
}

impl PeriodicTrigger {
    pub fn new(interval: Duration, clock: Arc<dyn Clock>) -> Result<Self, PositionError> {
        if interval.is_zero() {
            return Err(PositionError::InvalidArgument {
                name: "interval".to_string(),
                reason: "interval must be greater than zero".to_string(),
            });
        }
        info!(interval_secs = interval.as_secs(), "periodic trigger configured");
        Ok(Self {
            interval,
            clock,
            state: Mutex::new(TriggerState::Idle),
            subscribers: Arc::new(Subscribers::default()),
            stopped: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.state.lock(), TriggerState::Running(_))
    }
}

fn fire(clock: &dyn Clock, subscribers: &Subscribers, stopped: &AtomicBool) {
    // A tick racing a concurrent stop must not reach subscribers.
    if stopped.load(Ordering::Acquire) {
        return;
    }
    let event = TriggerEvent {
        fired_at: clock.now(),
    };
    info!(fired_at = %event.fired_at, "trigger fired");
    for handler in subscribers.snapshot() {
        if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
            error!(fired_at = %event.fired_at, "trigger subscriber panicked");
        }
    }
}

impl TriggerPort for PeriodicTrigger {
    fn subscribe(&self, handler: TriggerHandler) -> SubscriptionId {
        self.subscribers.add(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    fn start(&self) -> Result<(), PositionError> {
        let mut state = self.state.lock();
        match *state {
            TriggerState::Stopped => Err(PositionError::TriggerDisposed),
            TriggerState::Running(_) => {
                warn!("periodic trigger is already started");
                Ok(())
            }
            TriggerState::Idle => {
                let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
                    PositionError::InvalidArgument {
                        name: "runtime".to_string(),
                        reason: e.to_string(),
                    }
                })?;
                info!("starting periodic trigger");
                let interval = self.interval;
                let clock = Arc::clone(&self.clock);
                let subscribers = Arc::clone(&self.subscribers);
                let stopped = Arc::clone(&self.stopped);
                let handle = runtime.spawn(async move {
                    let mut ticker = tokio::time::interval(interval);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    loop {
                        ticker.tick().await;
                        if stopped.load(Ordering::Acquire) {
                            break;
                        }
                        debug!("timer elapsed");
                        fire(clock.as_ref(), &subscribers, &stopped);
                    }
                });
                *state = TriggerState::Running(handle);
                info!("periodic trigger started");
                Ok(())
            }
        }
    }

    fn stop(&self) {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, TriggerState::Stopped) {
            TriggerState::Running(handle) => {
                info!("stopping periodic trigger");
                self.stopped.store(true, Ordering::Release);
                handle.abort();
                info!("periodic trigger stopped");
            }
            TriggerState::Idle => {
                *state = TriggerState::Idle;
                warn!("periodic trigger is already stopped");
            }
            TriggerState::Stopped => {
                warn!("periodic trigger is already stopped");
            }
        }
    }
}

impl Drop for PeriodicTrigger {
    fn drop(&mut self) {
        if let TriggerState::Running(handle) =
            std::mem::replace(self.state.get_mut(), TriggerState::Stopped)
        {
            self.stopped.store(true, Ordering::Release);
            handle.abort();
            info!("periodic trigger disposed");
        }
    }
}
