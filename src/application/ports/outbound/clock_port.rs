//! Testability ports for injecting time and identifiers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[cfg_attr(test, mockall::automock)]
pub trait IdGeneratorPort: Send + Sync {
    fn new_uuid(&self) -> Uuid;
}
