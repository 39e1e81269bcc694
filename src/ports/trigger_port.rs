//! Recurring trigger port trait.

use crate::domain::error::PositionError;
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;

/// A single tick. `fired_at` is the local time the tick happened, not the
/// interval boundary it was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub fired_at: DateTime<Tz>,
}

pub type TriggerHandler = Arc<dyn Fn(TriggerEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A source of timestamped events delivered synchronously to every
/// subscriber registered at fire time.
pub trait TriggerPort: Send + Sync {
    fn subscribe(&self, handler: TriggerHandler) -> SubscriptionId;

    /// Returns `false` if the subscription was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    fn start(&self) -> Result<(), PositionError>;

    fn stop(&self);
}
