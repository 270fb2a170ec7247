//! Read-only queries over characters, locations, and ratings.
//!
//! Queries are snapshots relative to the clock's "now" and carry no
//! consistency guarantee across calls; `BookingService` re-validates at
//! commit time.

use serde::Serialize;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use questline_types::character::GroupName;
use questline_types::error::RepositoryError;
use questline_types::interval::{BookingInterval, BookingIntervalFactory};
use questline_types::location::Location;
use questline_types::skill::SkillType;
use questline_types::user::Role;

use crate::clock::Clock;
use crate::repository::character::CharacterRepository;
use crate::repository::location::LocationRepository;
use crate::repository::user::UserRepository;
use crate::service::ServiceError;

/// A character's public profile.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterProfile {
    pub group: String,
    pub username: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finish_at: Option<DateTime<Utc>>,
    pub skills: BTreeMap<SkillType, i32>,
    pub rating: f64,
    pub booking: Option<BookingView>,
}

/// The active booking as shown to users.
#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    pub location: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// One leaderboard row.
#[derive(Debug, Clone, Serialize)]
pub struct RatingRow {
    pub group: String,
    pub username: String,
    pub rating: f64,
}

pub struct QueryService<CR, LR, UR, C>
where
    CR: CharacterRepository,
    LR: LocationRepository,
    UR: UserRepository,
    C: Clock,
{
    characters: CR,
    locations: LR,
    users: UR,
    clock: C,
    factory: BookingIntervalFactory,
}

impl<CR, LR, UR, C> QueryService<CR, LR, UR, C>
where
    CR: CharacterRepository,
    LR: LocationRepository,
    UR: UserRepository,
    C: Clock,
{
    pub fn new(
        characters: CR,
        locations: LR,
        users: UR,
        clock: C,
        factory: BookingIntervalFactory,
    ) -> Self {
        Self {
            characters,
            locations,
            users,
            clock,
            factory,
        }
    }

    /// Intervals the group can still book at the named location, freshly
    /// computed against "now".
    pub async fn available_intervals(
        &self,
        group: &GroupName,
        location_name: &str,
    ) -> Result<Vec<BookingInterval>, ServiceError> {
        let location = self
            .locations
            .get_by_name(location_name)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let character = self
            .characters
            .get(group)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let intervals = self
            .factory
            .available_intervals(&character, &location, self.clock.now())?;
        Ok(intervals)
    }

    pub async fn profile(&self, group: &GroupName) -> Result<CharacterProfile, ServiceError> {
        let character = self
            .characters
            .get(group)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let booking = match character.booking() {
            None => None,
            Some(active) => {
                let location = self
                    .locations
                    .get(&active.location_id)
                    .await?
                    .ok_or(RepositoryError::NotFound)?;
                Some(BookingView {
                    location: location.name().to_string(),
                    from: active.interval.start(),
                    to: active.interval.end(),
                })
            }
        };

        Ok(CharacterProfile {
            group: character.group().to_string(),
            username: character.username().to_string(),
            started_at: character.started_at(),
            finish_at: character.finish_at(),
            skills: character.skill_points(),
            rating: character.rating(),
            booking,
        })
    }

    /// Every character ranked by rating, highest first; ties break on the
    /// group name.
    pub async fn leaderboard(&self) -> Result<Vec<RatingRow>, ServiceError> {
        let mut rows: Vec<RatingRow> = self
            .characters
            .list()
            .await?
            .into_iter()
            .map(|c| RatingRow {
                group: c.group().to_string(),
                username: c.username().to_string(),
                rating: c.rating(),
            })
            .collect();

        rows.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.group.cmp(&b.group))
        });
        Ok(rows)
    }

    pub async fn locations(&self) -> Result<Vec<Location>, ServiceError> {
        Ok(self.locations.list().await?)
    }

    pub async fn location_by_name(&self, name: &str) -> Result<Location, ServiceError> {
        Ok(self
            .locations
            .get_by_name(name)
            .await?
            .ok_or(RepositoryError::NotFound)?)
    }

    /// The location the given administrator runs.
    pub async fn location_by_admin(&self, username: &str) -> Result<Location, ServiceError> {
        Ok(self
            .locations
            .find_by_admin(username)
            .await?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub async fn is_administrator(&self, username: &str) -> Result<bool, ServiceError> {
        Ok(self
            .users
            .get(username)
            .await?
            .is_some_and(|user| user.role() == Role::Administrator))
    }
}
