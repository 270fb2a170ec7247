//! Booking command service.
//!
//! Each command is one atomic unit of work: load the location and then the
//! character for update (fixed lock order), apply the pure domain
//! transition, save both sides, commit. A failed transition drops the unit
//! of work and rolls back.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use questline_types::character::GroupName;
use questline_types::error::DomainError;
use questline_types::interval::{BookingInterval, BookingIntervalFactory};
use questline_types::location::LocationId;
use questline_types::skill::SkillType;

use crate::clock::Clock;
use crate::repository::storage::{Storage, UnitOfWork};
use crate::service::ServiceError;

/// Service executing the mutating booking operations.
pub struct BookingService<S: Storage, C: Clock> {
    storage: S,
    clock: C,
    factory: BookingIntervalFactory,
    instruction_duration: Duration,
}

impl<S: Storage, C: Clock> BookingService<S, C> {
    pub fn new(
        storage: S,
        clock: C,
        factory: BookingIntervalFactory,
        instruction_duration: Duration,
    ) -> Self {
        Self {
            storage,
            clock,
            factory,
            instruction_duration,
        }
    }

    pub fn factory(&self) -> &BookingIntervalFactory {
        &self.factory
    }

    /// Open the character's instruction window; returns the finish time.
    pub async fn start_instruction(
        &self,
        group: &GroupName,
    ) -> Result<DateTime<Utc>, ServiceError> {
        let now = self.clock.now();

        let mut uow = self.storage.begin().await?;
        let mut character = uow.character_for_update(group).await?;
        let finish = character.start(now, self.instruction_duration)?;
        uow.save_character(&character).await?;
        uow.commit().await?;

        info!(group = %group, finish = %finish, "Instruction started");
        Ok(finish)
    }

    /// Force the character's instruction window shut.
    pub async fn finish_instruction(&self, group: &GroupName) -> Result<(), ServiceError> {
        let now = self.clock.now();

        let mut uow = self.storage.begin().await?;
        let mut character = uow.character_for_update(group).await?;
        character.finish(now)?;
        uow.save_character(&character).await?;
        uow.commit().await?;

        info!(group = %group, "Instruction finished");
        Ok(())
    }

    /// Book the interval starting at `start` for the group at the location.
    pub async fn book(
        &self,
        group: &GroupName,
        location_id: &LocationId,
        start: DateTime<Utc>,
    ) -> Result<BookingInterval, ServiceError> {
        let now = self.clock.now();

        let mut uow = self.storage.begin().await?;
        let mut location = uow.location_for_update(location_id).await?;
        let mut character = uow.character_for_update(group).await?;

        let interval = character.book(&mut location, &self.factory, start, now)?;

        uow.save_location(&location).await?;
        uow.save_character(&character).await?;
        uow.commit().await?;

        info!(group = %group, location = %location.name(), start = %interval.start(), "Booked");
        Ok(interval)
    }

    /// Release the group's booking at the location without scoring.
    pub async fn cancel_booking(
        &self,
        group: &GroupName,
        location_id: &LocationId,
    ) -> Result<(), ServiceError> {
        let mut uow = self.storage.begin().await?;
        let mut location = uow.location_for_update(location_id).await?;
        let mut character = uow.character_for_update(group).await?;

        let interval = character.remove_booking(location_id)?;
        location.remove_booking(&interval)?;

        uow.save_location(&location).await?;
        uow.save_character(&character).await?;
        uow.commit().await?;

        info!(group = %group, location = %location.name(), "Booking cancelled");
        Ok(())
    }

    /// Release the group's finished booking at the location and credit the
    /// points.
    ///
    /// A `CannotAward`/`InvalidScore` failure happens after the release,
    /// which stands by design -- the released state is committed before the
    /// error is reported.
    pub async fn complete(
        &self,
        group: &GroupName,
        location_id: &LocationId,
        skill: SkillType,
        points: i32,
    ) -> Result<(), ServiceError> {
        let now = self.clock.now();

        let mut uow = self.storage.begin().await?;
        let mut location = uow.location_for_update(location_id).await?;
        let mut character = uow.character_for_update(group).await?;

        match location.complete(&mut character, skill, points, now) {
            Ok(()) => {
                uow.save_location(&location).await?;
                uow.save_character(&character).await?;
                uow.commit().await?;

                info!(
                    group = %group,
                    location = %location.name(),
                    skill = %skill,
                    points,
                    "Completed and awarded"
                );
                Ok(())
            }
            Err(err @ (DomainError::CannotAward(_) | DomainError::InvalidScore(_))) => {
                uow.save_location(&location).await?;
                uow.save_character(&character).await?;
                uow.commit().await?;
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::testsupport::MemStorage;

    use chrono::TimeZone;
    use questline_types::character::Character;
    use questline_types::error::RepositoryError;
    use questline_types::interval::BookingIntervalFactoryConfig;
    use questline_types::location::{Location, LocationId};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 13, 10, 0, 0).unwrap()
    }

    fn t(min: i64) -> DateTime<Utc> {
        t0() + Duration::minutes(min)
    }

    fn factory() -> BookingIntervalFactory {
        BookingIntervalFactory::new(BookingIntervalFactoryConfig {
            interval_duration: Duration::minutes(20),
            min_lead_time: Duration::minutes(5),
        })
        .unwrap()
    }

    fn service(store: MemStorage, now: DateTime<Utc>) -> BookingService<MemStorage, FixedClock> {
        BookingService::new(store, FixedClock(now), factory(), Duration::hours(4))
    }

    fn seeded_store() -> (MemStorage, GroupName, LocationId) {
        let store = MemStorage::new();
        let group = GroupName::new("RK9-51").unwrap();
        let location = Location::new(
            LocationId::new(),
            "Rocket Lab",
            None,
            None,
            Vec::new(),
            vec![SkillType::Engineering, SkillType::Social],
            4,
        )
        .unwrap();
        let id = location.id().clone();

        store.put_character(Character::new(group.clone(), "leader").unwrap());
        store.put_location(location);
        (store, group, id)
    }

    #[tokio::test]
    async fn test_end_to_end_booking_scenario() {
        let (store, group, loc_id) = seeded_store();
        let svc = service(store.clone(), t0());

        svc.start_instruction(&group).await.unwrap();

        let interval = svc.book(&group, &loc_id, t(20)).await.unwrap();
        assert_eq!(interval.start(), t(20));
        assert_eq!(interval.end(), t(40));

        svc.complete(&group, &loc_id, SkillType::Engineering, 4)
            .await
            .unwrap();

        let character = store.character(&group);
        assert_eq!(character.skill_points()[&SkillType::Engineering], 4);
        assert!(character.booking().is_none());
        assert!(store.location(&loc_id).calendar().is_empty());

        // The booking is already released: nothing left to complete.
        let err = svc
            .complete(&group, &loc_id, SkillType::Researching, 4)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::NotBooked)
        ));
    }

    #[tokio::test]
    async fn test_second_booking_is_rejected() {
        let (store, group, loc_id) = seeded_store();
        let svc = service(store.clone(), t0());

        svc.start_instruction(&group).await.unwrap();
        svc.book(&group, &loc_id, t(20)).await.unwrap();

        let err = svc.book(&group, &loc_id, t(40)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::AlreadyHasBooking)
        ));

        // The failed command left no stray interval behind.
        assert_eq!(store.location(&loc_id).calendar().len(), 1);
    }

    #[tokio::test]
    async fn test_conflicting_groups_cannot_share_an_interval() {
        let (store, group, loc_id) = seeded_store();
        let other = GroupName::new("RK9-52").unwrap();
        store.put_character(Character::new(other.clone(), "other-leader").unwrap());

        let svc = service(store.clone(), t0());
        svc.start_instruction(&group).await.unwrap();
        svc.start_instruction(&other).await.unwrap();

        svc.book(&group, &loc_id, t(20)).await.unwrap();
        let err = svc.book(&other, &loc_id, t(20)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::AlreadyBooked)
        ));
    }

    #[tokio::test]
    async fn test_cancel_frees_the_interval() {
        let (store, group, loc_id) = seeded_store();
        let svc = service(store.clone(), t0());

        svc.start_instruction(&group).await.unwrap();
        svc.book(&group, &loc_id, t(20)).await.unwrap();
        svc.cancel_booking(&group, &loc_id).await.unwrap();

        assert!(store.character(&group).booking().is_none());
        assert!(store.location(&loc_id).calendar().is_empty());

        // Cancelled interval can be taken again.
        svc.book(&group, &loc_id, t(20)).await.unwrap();
    }

    #[tokio::test]
    async fn test_cannot_award_persists_the_release() {
        let (store, group, loc_id) = seeded_store();
        let svc = service(store.clone(), t0());

        svc.start_instruction(&group).await.unwrap();
        svc.book(&group, &loc_id, t(20)).await.unwrap();

        let err = svc
            .complete(&group, &loc_id, SkillType::Sportive, 2)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::CannotAward(SkillType::Sportive))
        ));

        // Release committed despite the error; no points credited.
        assert!(store.character(&group).booking().is_none());
        assert!(store.location(&loc_id).calendar().is_empty());
        assert_eq!(store.character(&group).grades().len(), 0);
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let (store, _, loc_id) = seeded_store();
        let svc = service(store, t0());

        let ghost = GroupName::new("ZZ9-99").unwrap();
        let err = svc.book(&ghost, &loc_id, t(20)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Repository(RepositoryError::NotFound)
        ));
    }
}
