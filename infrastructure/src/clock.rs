//! Wall-clock time source.

use bursar_application::ports::clock::Clock;
use chrono::{DateTime, Utc};

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
