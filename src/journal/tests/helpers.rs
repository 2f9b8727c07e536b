//! Shared fixtures for journal tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock pinned to one instant, so auto-generated headers are stable.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// 07.03.2024 09:15 UTC.
    pub fn new() -> Self {
        let instant = Utc
            .with_ymd_and_hms(2024, 3, 7, 9, 15, 0)
            .single()
            .expect("valid fixed timestamp");
        Self(instant)
    }

    /// The header line an append at this instant generates.
    pub const HEADER: &str = "[07.03.2024 09:15]:";
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}
