//! Quantized booking intervals and the factory that mints them.
//!
//! An interval is a half-open `[from, to)` window of the configured
//! duration, aligned to the duration grid counted from the Unix epoch.
//! Intervals are immutable once minted; calendars remove them by value
//! equality.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::character::{Character, GroupName};
use crate::error::DomainError;
use crate::location::Location;

/// A committed or candidate time window on a location, owned by a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInterval {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    booked_by: GroupName,
}

impl BookingInterval {
    /// Reassemble an interval from stored fields.
    ///
    /// Used by the persistence layer; live intervals are minted by
    /// [`BookingIntervalFactory::new_interval`], which additionally
    /// enforces quantization and lead time.
    pub fn from_parts(
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        booked_by: GroupName,
    ) -> Result<Self, DomainError> {
        if from >= to {
            return Err(DomainError::InvalidInput(format!(
                "interval start {from} must precede end {to}"
            )));
        }

        Ok(Self { from, to, booked_by })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn booked_by(&self) -> &GroupName {
        &self.booked_by
    }

    /// Closed-open overlap test; equal intervals intersect.
    pub fn intersects(&self, other: &BookingInterval) -> bool {
        self.from < other.to && self.to > other.from
    }
}

/// Configuration for [`BookingIntervalFactory`].
#[derive(Debug, Clone, Copy)]
pub struct BookingIntervalFactoryConfig {
    /// Length of every bookable interval; also the grid step.
    pub interval_duration: Duration,
    /// Minimum gap between "now" and a bookable start.
    pub min_lead_time: Duration,
}

impl BookingIntervalFactoryConfig {
    fn validate(&self) -> Result<(), DomainError> {
        if self.interval_duration <= Duration::zero() {
            return Err(DomainError::invalid_input(
                "interval duration must be positive",
            ));
        }

        if self.min_lead_time <= Duration::zero() {
            return Err(DomainError::invalid_input(
                "minimum lead time must be positive",
            ));
        }

        Ok(())
    }
}

/// Policy object minting valid booking intervals from raw timestamps and
/// enumerating the candidates available to a character at a location.
#[derive(Debug, Clone, Copy)]
pub struct BookingIntervalFactory {
    cfg: BookingIntervalFactoryConfig,
}

impl BookingIntervalFactory {
    pub fn new(cfg: BookingIntervalFactoryConfig) -> Result<Self, DomainError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn interval_duration(&self) -> Duration {
        self.cfg.interval_duration
    }

    pub fn min_lead_time(&self) -> Duration {
        self.cfg.min_lead_time
    }

    /// Mint the interval `[from, from + interval_duration)` for a group.
    ///
    /// Fails `InvalidInput` if `from` is off the quantization grid and
    /// `TooLate` if it starts sooner than the minimum lead time.
    pub fn new_interval(
        &self,
        from: DateTime<Utc>,
        by: GroupName,
        now: DateTime<Utc>,
    ) -> Result<BookingInterval, DomainError> {
        if !self.is_quantized(from) {
            return Err(DomainError::InvalidInput(format!(
                "booking start {from} is not a multiple of {} minutes",
                self.cfg.interval_duration.num_minutes()
            )));
        }

        if from - now < self.cfg.min_lead_time {
            return Err(DomainError::TooLate);
        }

        Ok(BookingInterval {
            from,
            to: from + self.cfg.interval_duration,
            booked_by: by,
        })
    }

    /// Enumerate the intervals the character can still book at the location.
    ///
    /// Walks the quantization grid from the first boundary at or after `now`
    /// up to the character's finish time, dropping candidates that fail
    /// admission, conflict with the location's calendar, or fail the
    /// character's own booking checks. The result depends on `now` and is
    /// recomputed fresh on every call.
    pub fn available_intervals(
        &self,
        character: &Character,
        location: &Location,
        now: DateTime<Utc>,
    ) -> Result<Vec<BookingInterval>, DomainError> {
        let finish = character.finish_time()?;

        let mut available = Vec::new();
        let mut current = self.next_boundary(now);
        while current < finish {
            let candidate = self.new_interval(current, character.group().clone(), now);
            current += self.cfg.interval_duration;

            let Ok(interval) = candidate else { continue };
            if location.is_booked(&interval) {
                continue;
            }
            if character.can_book(location, &interval, self, now).is_err() {
                continue;
            }
            available.push(interval);
        }

        Ok(available)
    }

    fn is_quantized(&self, t: DateTime<Utc>) -> bool {
        t.timestamp_subsec_nanos() == 0
            && t.timestamp().rem_euclid(self.cfg.interval_duration.num_seconds()) == 0
    }

    /// First grid boundary at or after `now`.
    fn next_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let step = self.cfg.interval_duration.num_seconds();
        let ts = now.timestamp();
        let rem = ts.rem_euclid(step);

        let mut boundary = ts - rem;
        if rem != 0 || now.timestamp_subsec_nanos() != 0 {
            boundary += step;
        }

        DateTime::from_timestamp(boundary, 0).expect("grid boundary is a valid timestamp")
    }
}
