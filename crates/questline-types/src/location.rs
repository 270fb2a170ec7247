//! Bookable stations and their committed-interval calendars.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chrono::{DateTime, Utc};

use std::fmt;
use std::str::FromStr;

use crate::character::Character;
use crate::error::DomainError;
use crate::grade::MAX_AWARD_POINTS;
use crate::interval::BookingInterval;
use crate::skill::SkillType;
use crate::user::{Role, User};

/// Number of reward skills every location carries.
pub const REWARD_SKILLS_NUMBER: usize = 2;

/// Unique identifier for a location, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(pub Uuid);

impl LocationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for LocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A bookable station offering skill-point rewards.
///
/// Owns a calendar of committed intervals kept sorted by start time; no two
/// committed intervals intersect.
#[derive(Debug, Clone, Serialize)]
pub struct Location {
    id: LocationId,
    name: String,
    description: Option<String>,
    place: Option<String>,
    calendar: Vec<BookingInterval>,
    admins: Vec<User>,
    skills: Vec<SkillType>,
    max_points: i32,
}

impl Location {
    pub fn new(
        id: LocationId,
        name: impl Into<String>,
        description: Option<String>,
        place: Option<String>,
        admins: Vec<User>,
        skills: Vec<SkillType>,
        max_points: i32,
    ) -> Result<Self, DomainError> {
        Self::from_parts(id, name, description, place, admins, skills, max_points, Vec::new())
    }

    /// Reassemble a location from stored fields. The calendar is re-sorted
    /// and checked for overlaps.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: LocationId,
        name: impl Into<String>,
        description: Option<String>,
        place: Option<String>,
        admins: Vec<User>,
        skills: Vec<SkillType>,
        max_points: i32,
        mut calendar: Vec<BookingInterval>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::invalid_input("expected a location name"));
        }

        if description.as_deref() == Some("") {
            return Err(DomainError::invalid_input(
                "expected a non-empty description or none",
            ));
        }

        if place.as_deref() == Some("") {
            return Err(DomainError::invalid_input(
                "expected a non-empty place or none",
            ));
        }

        for admin in &admins {
            if admin.role() != Role::Administrator {
                return Err(DomainError::InvalidInput(format!(
                    "user '{}' is not an administrator",
                    admin.username()
                )));
            }
        }

        if skills.len() != REWARD_SKILLS_NUMBER {
            return Err(DomainError::InvalidInput(format!(
                "expected {} reward skills, got {}",
                REWARD_SKILLS_NUMBER,
                skills.len()
            )));
        }

        if skills[0] == skills[1] {
            return Err(DomainError::invalid_input(
                "reward skills must be distinct",
            ));
        }

        if !(1..=MAX_AWARD_POINTS).contains(&max_points) {
            return Err(DomainError::InvalidInput(format!(
                "max points must be within 1..={MAX_AWARD_POINTS}, got {max_points}"
            )));
        }

        calendar.sort_by_key(BookingInterval::start);
        for pair in calendar.windows(2) {
            if pair[0].intersects(&pair[1]) {
                return Err(DomainError::invalid_input(
                    "calendar contains overlapping intervals",
                ));
            }
        }

        Ok(Self {
            id,
            name,
            description,
            place,
            calendar,
            admins,
            skills,
            max_points,
        })
    }

    pub fn id(&self) -> &LocationId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn place(&self) -> Option<&str> {
        self.place.as_deref()
    }

    /// Committed intervals, sorted by start time.
    pub fn calendar(&self) -> &[BookingInterval] {
        &self.calendar
    }

    pub fn admins(&self) -> &[User] {
        &self.admins
    }

    pub fn is_admin(&self, username: &str) -> bool {
        self.admins.iter().any(|admin| admin.username() == username)
    }

    pub fn skills(&self) -> &[SkillType] {
        &self.skills
    }

    pub fn rewards(&self, skill: SkillType) -> bool {
        self.skills.contains(&skill)
    }

    pub fn max_points(&self) -> i32 {
        self.max_points
    }

    /// True iff any committed interval intersects the given one.
    pub fn is_booked(&self, interval: &BookingInterval) -> bool {
        let pos = self
            .calendar
            .partition_point(|committed| committed.start() < interval.start());

        // Only the neighbours can overlap in a sorted, non-overlapping
        // calendar.
        let before = pos.checked_sub(1).and_then(|p| self.calendar.get(p));
        let after = self.calendar.get(pos);

        before.is_some_and(|c| c.intersects(interval))
            || after.is_some_and(|c| c.intersects(interval))
    }

    /// Guard form of [`Location::is_booked`].
    pub fn check_booked(&self, interval: &BookingInterval) -> Result<(), DomainError> {
        if self.is_booked(interval) {
            return Err(DomainError::AlreadyBooked);
        }
        Ok(())
    }

    /// Commit an interval to the calendar, keeping it sorted.
    pub fn add_booking(&mut self, interval: BookingInterval) -> Result<(), DomainError> {
        self.check_booked(&interval)?;

        let pos = self
            .calendar
            .partition_point(|committed| committed.start() < interval.start());
        self.calendar.insert(pos, interval);
        Ok(())
    }

    /// Remove a committed interval by exact match.
    pub fn remove_booking(&mut self, interval: &BookingInterval) -> Result<(), DomainError> {
        let pos = self
            .calendar
            .iter()
            .position(|committed| committed == interval)
            .ok_or(DomainError::NotBooked)?;
        self.calendar.remove(pos);
        Ok(())
    }

    /// Release the character's booking against this location and credit the
    /// points.
    ///
    /// The points cap is validated first, before any mutation. The booking
    /// release happens before the reward-set check, so a `CannotAward`
    /// failure leaves the booking released -- that ordering is intentional.
    pub fn complete(
        &mut self,
        character: &mut Character,
        skill: SkillType,
        points: i32,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if points > self.max_points {
            return Err(DomainError::MaxPointsExceeded {
                points,
                max: self.max_points,
            });
        }

        let interval = character.remove_booking(&self.id)?;
        self.remove_booking(&interval)?;

        if !self.rewards(skill) {
            return Err(DomainError::CannotAward(skill));
        }

        character.inc_skill(skill, points, &self.name, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::GroupName;
    use crate::interval::{BookingIntervalFactory, BookingIntervalFactoryConfig};

    use chrono::{Duration, TimeZone};

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
            Some("Build and launch a model rocket".to_string()),
            Some("Hall 2".to_string()),
            Vec::new(),
            vec![SkillType::Engineering, SkillType::Social],
            4,
        )
        .unwrap()
    }

    fn t(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 13, hour, min, 0).unwrap()
    }

    fn interval(group: &str, hour: u32, min: u32) -> BookingInterval {
        factory()
            .new_interval(t(hour, min), GroupName::new(group).unwrap(), t(8, 0))
            .unwrap()
    }

    #[test]
    fn test_new_location_validates_skills() {
        let err = Location::new(
            LocationId::new(),
            "Rocket Lab",
            None,
            None,
            Vec::new(),
            vec![SkillType::Engineering],
            4,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let err = Location::new(
            LocationId::new(),
            "Rocket Lab",
            None,
            None,
            Vec::new(),
            vec![SkillType::Engineering, SkillType::Engineering],
            4,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn test_add_booking_rejects_conflicts() {
        let mut loc = location();
        loc.add_booking(interval("RK9-51", 11, 0)).unwrap();

        assert_eq!(
            loc.add_booking(interval("RK9-52", 11, 0)).unwrap_err(),
            DomainError::AlreadyBooked
        );

        // Adjacent intervals are fine.
        loc.add_booking(interval("RK9-52", 11, 30)).unwrap();
        loc.add_booking(interval("RK9-53", 10, 30)).unwrap();

        let starts: Vec<_> = loc.calendar().iter().map(BookingInterval::start).collect();
        assert_eq!(starts, vec![t(10, 30), t(11, 0), t(11, 30)]);
    }

    #[test]
    fn test_remove_booking_exact_match() {
        let mut loc = location();
        let committed = interval("RK9-51", 11, 0);
        loc.add_booking(committed.clone()).unwrap();

        // Same window, different owner: no match.
        let foreign = interval("RK9-52", 11, 0);
        assert_eq!(
            loc.remove_booking(&foreign).unwrap_err(),
            DomainError::NotBooked
        );

        loc.remove_booking(&committed).unwrap();
        assert!(loc.calendar().is_empty());
        assert_eq!(
            loc.remove_booking(&committed).unwrap_err(),
            DomainError::NotBooked
        );
    }

    #[test]
    fn test_from_parts_rejects_overlapping_calendar() {
        let a = BookingInterval::from_parts(
            t(11, 0),
            t(11, 30),
            GroupName::new("RK9-51").unwrap(),
        )
        .unwrap();
        let b = BookingInterval::from_parts(
            t(11, 15),
            t(11, 45),
            GroupName::new("RK9-52").unwrap(),
        )
        .unwrap();

        let err = Location::from_parts(
            LocationId::new(),
            "Rocket Lab",
            None,
            None,
            Vec::new(),
            vec![SkillType::Engineering, SkillType::Social],
            4,
            vec![a, b],
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn test_complete_releases_and_credits() {
        let factory = factory();
        let mut loc = location();
        let mut c = Character::new(GroupName::new("RK9-51").unwrap(), "leader").unwrap();
        let now = t(10, 0);

        c.start(now, Duration::hours(4)).unwrap();
        c.book(&mut loc, &factory, t(11, 0), now).unwrap();

        loc.complete(&mut c, SkillType::Engineering, 4, t(11, 30))
            .unwrap();

        assert!(c.booking().is_none());
        assert!(loc.calendar().is_empty());
        assert_eq!(c.skill_points()[&SkillType::Engineering], 4);

        // The booking is gone, so a second completion has nothing to
        // release.
        assert_eq!(
            loc.complete(&mut c, SkillType::Researching, 4, t(11, 31))
                .unwrap_err(),
            DomainError::NotBooked
        );
    }

    #[test]
    fn test_complete_max_points_checked_before_release() {
        let factory = factory();
        let mut loc = location();
        let mut c = Character::new(GroupName::new("RK9-51").unwrap(), "leader").unwrap();
        let now = t(10, 0);

        c.start(now, Duration::hours(4)).unwrap();
        c.book(&mut loc, &factory, t(11, 0), now).unwrap();

        assert_eq!(
            loc.complete(&mut c, SkillType::Engineering, 5, t(11, 30))
                .unwrap_err(),
            DomainError::MaxPointsExceeded { points: 5, max: 4 }
        );

        // Nothing was released.
        assert!(c.booking().is_some());
        assert_eq!(loc.calendar().len(), 1);
    }

    #[test]
    fn test_complete_cannot_award_still_releases() {
        let factory = factory();
        let mut loc = location();
        let mut c = Character::new(GroupName::new("RK9-51").unwrap(), "leader").unwrap();
        let now = t(10, 0);

        c.start(now, Duration::hours(4)).unwrap();
        c.book(&mut loc, &factory, t(11, 0), now).unwrap();

        assert_eq!(
            loc.complete(&mut c, SkillType::Sportive, 2, t(11, 30))
                .unwrap_err(),
            DomainError::CannotAward(SkillType::Sportive)
        );

        // Release took effect; no points were credited.
        assert!(c.booking().is_none());
        assert!(loc.calendar().is_empty());
        assert_eq!(c.skill_points()[&SkillType::Sportive], 0);
    }
}
