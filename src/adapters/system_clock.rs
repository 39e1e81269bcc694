//! Clock adapters.

use crate::ports::clock_port::Clock;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;

/// Wall clock in a configured local zone.
pub struct SystemClock {
    zone: Tz,
}

impl SystemClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.zone)
    }
}

/// A clock that only moves when told to.
pub struct FixedClock {
    time: Mutex<DateTime<Tz>>,
}

impl FixedClock {
    pub fn new(time: DateTime<Tz>) -> Self {
        Self {
            time: Mutex::new(time),
        }
    }

    pub fn set(&self, time: DateTime<Tz>) {
        *self.time.lock() = time;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        *self.time.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::{London, Paris};

    #[test]
    fn system_clock_reports_in_its_zone() {
        let clock = SystemClock::new(Paris);
        assert_eq!(clock.now().timezone(), Paris);
    }

    #[test]
    fn fixed_clock_holds_until_set() {
        let t1 = London.with_ymd_and_hms(2025, 9, 26, 15, 0, 0).unwrap();
        let t2 = London.with_ymd_and_hms(2025, 9, 26, 16, 0, 0).unwrap();
        let clock = FixedClock::new(t1);
        assert_eq!(clock.now(), t1);
        clock.set(t2);
        assert_eq!(clock.now(), t2);
    }
}
