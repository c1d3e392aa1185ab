// src/clock.rs
use chrono::{SecondsFormat, Utc};

/// Source of "now" for every timestamp written into a store.
///
/// Timestamps are UTC with second precision and a trailing `Z`
/// (e.g. `2025-09-04T14:00:00Z`). The fixed width is what lets the engine
/// order them as plain strings.
pub trait Clock {
    fn now(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
