//! Time source port trait.

use chrono::DateTime;
use chrono_tz::Tz;

pub trait Clock: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> DateTime<Tz>;
}
