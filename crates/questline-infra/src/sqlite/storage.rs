//! Transactional unit of work over the single-connection writer pool.
//!
//! Implements the `Storage` port from `questline-core`. Each unit of work
//! is one sqlx transaction: loads read inside the transaction, saves
//! rewrite entity rows, commit ends it. Dropping an uncommitted unit of
//! work rolls the transaction back.

use sqlx::{Sqlite, Transaction};

use questline_core::repository::storage::{Storage, UnitOfWork};
use questline_types::character::{Character, GroupName};
use questline_types::error::RepositoryError;
use questline_types::location::{Location, LocationId};

use super::character::{fetch_character, update_character};
use super::location::{fetch_location, update_location};
use super::map_sqlx_err;
use super::pool::DatabasePool;

/// SQLite-backed implementation of the `Storage` port.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: DatabasePool,
}

impl SqliteStorage {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl Storage for SqliteStorage {
    type Uow = SqliteUnitOfWork;

    async fn begin(&self) -> Result<Self::Uow, RepositoryError> {
        let tx = self.pool.writer.begin().await.map_err(map_sqlx_err)?;
        Ok(SqliteUnitOfWork { tx })
    }
}

impl UnitOfWork for SqliteUnitOfWork {
    async fn location_for_update(
        &mut self,
        id: &LocationId,
    ) -> Result<Location, RepositoryError> {
        fetch_location(&mut self.tx, id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn character_for_update(
        &mut self,
        group: &GroupName,
    ) -> Result<Character, RepositoryError> {
        fetch_character(&mut self.tx, group.as_str())
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn save_location(&mut self, location: &Location) -> Result<(), RepositoryError> {
        update_location(&mut self.tx, location).await
    }

    async fn save_character(&mut self, character: &Character) -> Result<(), RepositoryError> {
        update_character(&mut self.tx, character).await
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await.map_err(map_sqlx_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::character::SqliteCharacterRepository;
    use crate::sqlite::location::SqliteLocationRepository;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use questline_core::clock::FixedClock;
    use questline_core::repository::character::CharacterRepository;
    use questline_core::repository::location::LocationRepository;
    use questline_core::service::booking::BookingService;
    use questline_types::interval::{BookingIntervalFactory, BookingIntervalFactoryConfig};
    use questline_types::skill::SkillType;

    async fn test_pool() -> (tempfile::TempDir, DatabasePool) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, pool)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 13, 10, 0, 0).unwrap()
    }

    fn factory() -> BookingIntervalFactory {
        BookingIntervalFactory::new(BookingIntervalFactoryConfig {
            interval_duration: Duration::minutes(20),
            min_lead_time: Duration::minutes(5),
        })
        .unwrap()
    }

    async fn seed(pool: &DatabasePool) -> (GroupName, LocationId) {
        let group = GroupName::new("RK9-51").unwrap();
        SqliteCharacterRepository::new(pool.clone())
            .create(&Character::new(group.clone(), "leader").unwrap())
            .await
            .unwrap();

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
        SqliteLocationRepository::new(pool.clone())
            .create(&location)
            .await
            .unwrap();

        (group, id)
    }

    #[tokio::test]
    async fn test_uncommitted_unit_of_work_rolls_back() {
        let (_dir, pool) = test_pool().await;
        let (group, _) = seed(&pool).await;

        let storage = SqliteStorage::new(pool.clone());
        {
            let mut uow = storage.begin().await.unwrap();
            let mut character = uow.character_for_update(&group).await.unwrap();
            character.start(t0(), Duration::hours(4)).unwrap();
            uow.save_character(&character).await.unwrap();
            // Dropped without commit.
        }

        let loaded = SqliteCharacterRepository::new(pool)
            .get(&group)
            .await
            .unwrap()
            .unwrap();
        assert!(loaded.started_at().is_none());
    }

    #[tokio::test]
    async fn test_booking_flow_end_to_end() {
        let (_dir, pool) = test_pool().await;
        let (group, loc_id) = seed(&pool).await;

        let service = BookingService::new(
            SqliteStorage::new(pool.clone()),
            FixedClock(t0()),
            factory(),
            Duration::hours(4),
        );

        service.start_instruction(&group).await.unwrap();
        let interval = service
            .book(&group, &loc_id, t0() + Duration::minutes(20))
            .await
            .unwrap();

        // Both sides of the booking survived the round trip.
        let character = SqliteCharacterRepository::new(pool.clone())
            .get(&group)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(character.booking().unwrap().interval, interval);

        let location = SqliteLocationRepository::new(pool.clone())
            .get(&loc_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(location.calendar(), &[interval]);

        service
            .complete(&group, &loc_id, SkillType::Engineering, 4)
            .await
            .unwrap();

        let character = SqliteCharacterRepository::new(pool.clone())
            .get(&group)
            .await
            .unwrap()
            .unwrap();
        assert!(character.booking().is_none());
        assert_eq!(character.skill_points()[&SkillType::Engineering], 4);

        let location = SqliteLocationRepository::new(pool)
            .get(&loc_id)
            .await
            .unwrap()
            .unwrap();
        assert!(location.calendar().is_empty());
    }
}
