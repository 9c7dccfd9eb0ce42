//! Clock and identifier implementations.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::ports::outbound::{ClockPort, IdGeneratorPort};

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Random (v4) UUIDs.
pub struct UuidV4Generator;

impl IdGeneratorPort for UuidV4Generator {
    fn new_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Clock for testing that moves forward one second on every reading.
#[cfg(test)]
pub struct SteppingClock {
    next: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl SteppingClock {
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            next: std::sync::Mutex::new(start),
        }
    }
}

#[cfg(test)]
impl Default for SteppingClock {
    fn default() -> Self {
        use chrono::TimeZone;
        Self::starting_at(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
    }
}

#[cfg(test)]
impl ClockPort for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + chrono::Duration::seconds(1);
        now
    }
}
