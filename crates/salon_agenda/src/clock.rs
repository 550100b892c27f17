// --- File: crates/salon_agenda/src/clock.rs ---
//! Source of "today" for the agenda.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the salon's time zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    time_zone: Tz,
}

impl SystemClock {
    pub fn new(time_zone: Tz) -> Self {
        Self { time_zone }
    }

    /// Build from an IANA name, falling back to America/Sao_Paulo.
    pub fn from_name(name: &str) -> Self {
        let time_zone = name.parse::<Tz>().unwrap_or_else(|_| {
            warn!("Unknown time zone '{}', using America/Sao_Paulo", name);
            Tz::America__Sao_Paulo
        });
        Self::new(time_zone)
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.time_zone).date_naive()
    }
}

/// A clock stuck on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
