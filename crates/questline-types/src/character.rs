//! Participant groups and their instruction-window lifecycle.
//!
//! A character moves `NotStarted -> Started -> Finished`, may hold at most
//! one active booking, and accumulates grades that feed the rating.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::DomainError;
use crate::grade::{Grade, MAX_AWARD_POINTS};
use crate::interval::{BookingInterval, BookingIntervalFactory};
use crate::location::{Location, LocationId};
use crate::rating;
use crate::skill::{ALL_SKILLS, SkillType};

/// Faculty prefix, stream number, group number, optional suffix letter.
static GROUP_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{1,3}[0-9]{1,2}-[0-9]{2,3}[A-Z]?$").expect("group name pattern compiles")
});

/// Validated group name identifying a character, e.g. `RK9-51`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupName(String);

impl GroupName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if !GROUP_NAME_PATTERN.is_match(&name) {
            return Err(DomainError::InvalidInput(format!(
                "invalid group name '{name}'; expected a name like 'RK9-51'"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GroupName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for GroupName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GroupName> for String {
    fn from(value: GroupName) -> Self {
        value.0
    }
}

/// The single outstanding booking a character may hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBooking {
    pub location_id: LocationId,
    pub interval: BookingInterval,
}

/// A participant group progressing through the quest event.
#[derive(Debug, Clone, Serialize)]
pub struct Character {
    group: GroupName,
    username: String,
    started_at: Option<DateTime<Utc>>,
    finish_at: Option<DateTime<Utc>>,
    booking: Option<ActiveBooking>,
    grades: Vec<Grade>,
}

impl Character {
    pub fn new(group: GroupName, username: impl Into<String>) -> Result<Self, DomainError> {
        let username = username.into();
        if username.is_empty() {
            return Err(DomainError::invalid_input("expected a leader username"));
        }

        Ok(Self {
            group,
            username,
            started_at: None,
            finish_at: None,
            booking: None,
            grades: Vec::new(),
        })
    }

    /// Reassemble a character from stored fields.
    pub fn from_parts(
        group: GroupName,
        username: impl Into<String>,
        started_at: Option<DateTime<Utc>>,
        finish_at: Option<DateTime<Utc>>,
        booking: Option<ActiveBooking>,
        grades: Vec<Grade>,
    ) -> Result<Self, DomainError> {
        let username = username.into();
        if username.is_empty() {
            return Err(DomainError::invalid_input("expected a leader username"));
        }

        match (started_at, finish_at) {
            (Some(_), Some(_)) | (None, None) => {}
            _ => {
                return Err(DomainError::invalid_input(
                    "start and finish times must be set together",
                ));
            }
        }

        Ok(Self {
            group,
            username,
            started_at,
            finish_at,
            booking,
            grades,
        })
    }

    pub fn group(&self) -> &GroupName {
        &self.group
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finish_at(&self) -> Option<DateTime<Utc>> {
        self.finish_at
    }

    pub fn booking(&self) -> Option<&ActiveBooking> {
        self.booking.as_ref()
    }

    pub fn grades(&self) -> &[Grade] {
        &self.grades
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Finish time of the instruction window; `NotStarted` before `start`.
    pub fn finish_time(&self) -> Result<DateTime<Utc>, DomainError> {
        self.finish_at.ok_or(DomainError::NotStarted)
    }

    pub fn is_finished(&self, now: DateTime<Utc>) -> bool {
        self.finish_at.is_some_and(|finish| now > finish)
    }

    /// Open the instruction window. One-way; returns the finish time.
    pub fn start(
        &mut self,
        now: DateTime<Utc>,
        instruction_duration: Duration,
    ) -> Result<DateTime<Utc>, DomainError> {
        if self.is_started() {
            return Err(DomainError::AlreadyStarted);
        }

        let finish = now + instruction_duration;
        self.started_at = Some(now);
        self.finish_at = Some(finish);
        Ok(finish)
    }

    /// Force the instruction window shut at `now`.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.is_started() {
            return Err(DomainError::NotStarted);
        }

        if self.is_finished(now) {
            return Err(DomainError::AlreadyFinished);
        }

        self.finish_at = Some(now);
        Ok(())
    }

    /// Check whether the candidate interval is bookable; the first failing
    /// reason wins.
    pub fn can_book(
        &self,
        location: &Location,
        interval: &BookingInterval,
        factory: &BookingIntervalFactory,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let finish = self.finish_time()?;

        if self.is_finished(now) {
            return Err(DomainError::AlreadyFinished);
        }

        if interval.end() > finish {
            return Err(DomainError::TooLate);
        }

        if interval.start() - now < factory.min_lead_time() {
            return Err(DomainError::TooClose);
        }

        if self.booking.is_some() {
            return Err(DomainError::AlreadyHasBooking);
        }

        location.check_booked(interval)
    }

    /// Mint an interval starting at `start` and commit it to both the
    /// location's calendar and this character's booking reference.
    pub fn book(
        &mut self,
        location: &mut Location,
        factory: &BookingIntervalFactory,
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<BookingInterval, DomainError> {
        let interval = factory.new_interval(start, self.group.clone(), now)?;
        self.can_book(location, &interval, factory, now)?;

        location.add_booking(interval.clone())?;
        self.booking = Some(ActiveBooking {
            location_id: location.id().clone(),
            interval: interval.clone(),
        });

        Ok(interval)
    }

    /// Clear the active booking held against `location_id`, returning the
    /// released interval. The location-side removal is the caller's
    /// responsibility.
    pub fn remove_booking(
        &mut self,
        location_id: &LocationId,
    ) -> Result<BookingInterval, DomainError> {
        let Some(booking) = self.booking.as_ref() else {
            return Err(DomainError::NotBooked);
        };

        if booking.location_id != *location_id {
            return Err(DomainError::BookingMismatch {
                expected: booking.location_id.to_string(),
                actual: location_id.to_string(),
            });
        }

        let interval = booking.interval.clone();
        self.booking = None;
        Ok(interval)
    }

    /// Credit points for a skill. Scores outside `[0, MAX_AWARD_POINTS]`
    /// fail `InvalidScore`; a zero score is accepted but credits nothing.
    pub fn inc_skill(
        &mut self,
        skill: SkillType,
        points: i32,
        location_name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !(0..=MAX_AWARD_POINTS).contains(&points) {
            return Err(DomainError::InvalidScore(points));
        }

        if points == 0 {
            return Ok(());
        }

        let grade = Grade::new(skill, points, location_name, now)?;
        self.grades.push(grade);
        Ok(())
    }

    /// Per-skill point totals, zero-filled for skills without grades.
    pub fn skill_points(&self) -> BTreeMap<SkillType, i32> {
        let mut totals: BTreeMap<SkillType, i32> =
            ALL_SKILLS.iter().map(|skill| (*skill, 0)).collect();
        for grade in &self.grades {
            *totals.entry(grade.skill()).or_default() += grade.points();
        }
        totals
    }

    pub fn rating(&self) -> f64 {
        rating::rating(&self.grades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::BookingIntervalFactoryConfig;

    use chrono::TimeZone;

    fn factory() -> BookingIntervalFactory {
        BookingIntervalFactory::new(BookingIntervalFactoryConfig {
            interval_duration: Duration::minutes(30),
            min_lead_time: Duration::minutes(5),
        })
        .unwrap()
    }

    fn location() -> Location {
        Location::new(
            LocationId::new(),
            "Rocket Lab",
            None,
            None,
            Vec::new(),
            vec![SkillType::Engineering, SkillType::Social],
            4,
        )
        .unwrap()
    }

    fn character() -> Character {
        Character::new(GroupName::new("RK9-51").unwrap(), "leader").unwrap()
    }

    fn t(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 13, hour, min, 0).unwrap()
    }

    #[test]
    fn test_group_name_pattern() {
        for name in ["RK9-51", "SM1-11", "BMT12-105", "E4-42B"] {
            assert!(GroupName::new(name).is_ok(), "{name} should be valid");
        }
        for name in ["", "rk9-51", "RK-51", "RK9_51", "RK951", "RK9-5"] {
            assert!(GroupName::new(name).is_err(), "{name} should be invalid");
        }
    }

    #[test]
    fn test_start_is_one_way() {
        let mut c = character();
        let finish = c.start(t(10, 0), Duration::hours(4)).unwrap();
        assert_eq!(finish, t(14, 0));
        assert_eq!(c.started_at(), Some(t(10, 0)));
        assert_eq!(c.finish_at(), Some(t(14, 0)));

        assert_eq!(
            c.start(t(11, 0), Duration::hours(4)).unwrap_err(),
            DomainError::AlreadyStarted
        );
    }

    #[test]
    fn test_finish_transitions() {
        let mut c = character();
        assert_eq!(c.finish(t(10, 0)).unwrap_err(), DomainError::NotStarted);

        c.start(t(10, 0), Duration::hours(4)).unwrap();
        assert!(!c.is_finished(t(11, 0)));

        c.finish(t(11, 0)).unwrap();
        assert_eq!(c.finish_at(), Some(t(11, 0)));
        assert!(c.is_finished(t(11, 1)));

        assert_eq!(c.finish(t(12, 0)).unwrap_err(), DomainError::AlreadyFinished);
    }

    #[test]
    fn test_can_book_check_order() {
        let factory = factory();
        let mut loc = location();
        let mut c = character();
        let now = t(10, 0);

        let interval = factory
            .new_interval(t(11, 0), c.group().clone(), now)
            .unwrap();

        // Not started wins over everything else.
        assert_eq!(
            c.can_book(&loc, &interval, &factory, now).unwrap_err(),
            DomainError::NotStarted
        );

        c.start(now, Duration::hours(4)).unwrap();
        assert!(c.can_book(&loc, &interval, &factory, now).is_ok());

        // Past the finish window.
        let late = factory
            .new_interval(t(14, 0), c.group().clone(), now)
            .unwrap();
        assert_eq!(
            c.can_book(&loc, &late, &factory, now).unwrap_err(),
            DomainError::TooLate
        );

        // Within the lead time.
        assert_eq!(
            c.can_book(&loc, &interval, &factory, t(10, 57))
                .unwrap_err(),
            DomainError::TooClose
        );

        // Conflicting committed interval on the location.
        let other = GroupName::new("RK9-52").unwrap();
        loc.add_booking(factory.new_interval(t(11, 0), other, now).unwrap())
            .unwrap();
        assert_eq!(
            c.can_book(&loc, &interval, &factory, now).unwrap_err(),
            DomainError::AlreadyBooked
        );

        // After the window closes entirely.
        assert_eq!(
            c.can_book(&loc, &interval, &factory, t(14, 1)).unwrap_err(),
            DomainError::AlreadyFinished
        );
    }

    #[test]
    fn test_book_commits_both_sides() {
        let factory = factory();
        let mut loc = location();
        let mut c = character();
        let now = t(10, 0);

        c.start(now, Duration::hours(4)).unwrap();
        let interval = c.book(&mut loc, &factory, t(11, 0), now).unwrap();

        assert!(loc.is_booked(&interval));
        let booking = c.booking().unwrap();
        assert_eq!(&booking.interval, &interval);
        assert_eq!(&booking.location_id, loc.id());
    }

    #[test]
    fn test_single_active_booking() {
        let factory = factory();
        let mut loc = location();
        let mut c = character();
        let now = t(10, 0);

        c.start(now, Duration::hours(4)).unwrap();
        c.book(&mut loc, &factory, t(11, 0), now).unwrap();

        assert_eq!(
            c.book(&mut loc, &factory, t(12, 0), now).unwrap_err(),
            DomainError::AlreadyHasBooking
        );
    }

    #[test]
    fn test_remove_booking_twice_fails_not_booked() {
        let factory = factory();
        let mut loc = location();
        let mut c = character();
        let now = t(10, 0);

        c.start(now, Duration::hours(4)).unwrap();
        let interval = c.book(&mut loc, &factory, t(11, 0), now).unwrap();

        let released = c.remove_booking(&loc.id().clone()).unwrap();
        assert_eq!(released, interval);
        assert!(c.booking().is_none());

        assert_eq!(
            c.remove_booking(&loc.id().clone()).unwrap_err(),
            DomainError::NotBooked
        );
    }

    #[test]
    fn test_remove_booking_checks_location() {
        let factory = factory();
        let mut loc = location();
        let mut c = character();
        let now = t(10, 0);

        c.start(now, Duration::hours(4)).unwrap();
        c.book(&mut loc, &factory, t(11, 0), now).unwrap();

        let other = LocationId::new();
        assert!(matches!(
            c.remove_booking(&other).unwrap_err(),
            DomainError::BookingMismatch { .. }
        ));
        assert!(c.booking().is_some());
    }

    #[test]
    fn test_inc_skill_score_bounds() {
        let mut c = character();
        let now = t(12, 0);

        assert_eq!(
            c.inc_skill(SkillType::Social, -1, "Rocket Lab", now)
                .unwrap_err(),
            DomainError::InvalidScore(-1)
        );
        assert_eq!(
            c.inc_skill(SkillType::Social, MAX_AWARD_POINTS + 1, "Rocket Lab", now)
                .unwrap_err(),
            DomainError::InvalidScore(MAX_AWARD_POINTS + 1)
        );

        // Zero is accepted but credits nothing.
        c.inc_skill(SkillType::Social, 0, "Rocket Lab", now).unwrap();
        assert!(c.grades().is_empty());

        c.inc_skill(SkillType::Social, 3, "Rocket Lab", now).unwrap();
        assert_eq!(c.skill_points()[&SkillType::Social], 3);
    }
}
