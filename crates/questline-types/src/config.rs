use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::interval::{BookingIntervalFactory, BookingIntervalFactoryConfig};

/// Tunable scheduling parameters of the quest event.
///
/// Loaded from `config.toml` by questline-infra; every field has a default
/// so a missing file or section works out of the box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Length of one bookable interval, minutes. Also the quantization grid.
    pub interval_minutes: i64,
    /// Minimum gap between "now" and a booking's start, minutes.
    pub lead_minutes: i64,
    /// Length of a character's instruction window, hours.
    pub instruction_hours: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 30,
            lead_minutes: 5,
            instruction_hours: 4,
        }
    }
}

impl EngineConfig {
    pub fn interval_duration(&self) -> Duration {
        Duration::minutes(self.interval_minutes)
    }

    pub fn min_lead_time(&self) -> Duration {
        Duration::minutes(self.lead_minutes)
    }

    pub fn instruction_duration(&self) -> Duration {
        Duration::hours(self.instruction_hours)
    }

    /// Build the interval factory; fails on non-positive durations.
    pub fn factory(&self) -> Result<BookingIntervalFactory, DomainError> {
        BookingIntervalFactory::new(BookingIntervalFactoryConfig {
            interval_duration: self.interval_duration(),
            min_lead_time: self.min_lead_time(),
        })
    }
}
