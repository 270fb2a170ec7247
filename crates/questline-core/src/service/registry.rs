//! Registration and seeding service.
//!
//! Registers characters and creates locations from seed descriptions
//! (the bulk import the event staff runs before doors open).

use serde::Deserialize;
use tracing::info;

use questline_types::character::{Character, GroupName};
use questline_types::error::DomainError;
use questline_types::location::{Location, LocationId};
use questline_types::skill::SkillType;
use questline_types::user::{Role, User};

use crate::repository::character::CharacterRepository;
use crate::repository::location::LocationRepository;
use crate::repository::user::UserRepository;
use crate::service::ServiceError;

/// One location in a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationSeed {
    pub name: String,
    pub description: Option<String>,
    pub place: Option<String>,
    /// Exactly two reward skill names.
    pub skills: Vec<String>,
    pub max_points: i32,
    #[serde(default)]
    pub admins: Vec<AdminSeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    pub chat_id: i64,
    pub username: String,
}

pub struct RegistryService<CR, LR, UR>
where
    CR: CharacterRepository,
    LR: LocationRepository,
    UR: UserRepository,
{
    characters: CR,
    locations: LR,
    users: UR,
}

impl<CR, LR, UR> RegistryService<CR, LR, UR>
where
    CR: CharacterRepository,
    LR: LocationRepository,
    UR: UserRepository,
{
    pub fn new(characters: CR, locations: LR, users: UR) -> Self {
        Self {
            characters,
            locations,
            users,
        }
    }

    /// Register a new character for the event.
    pub async fn register_character(
        &self,
        group: GroupName,
        username: &str,
        chat_id: i64,
    ) -> Result<Character, ServiceError> {
        let leader = User::new(chat_id, username, Role::Participant)?;
        let character = Character::new(group, username)?;

        self.characters.create(&character).await?;
        self.users.upsert(&leader).await?;

        info!(group = %character.group(), username, "Character registered");
        Ok(character)
    }

    /// Create a location (and its administrator users) from a seed entry.
    pub async fn seed_location(&self, seed: LocationSeed) -> Result<Location, ServiceError> {
        let skills = seed
            .skills
            .iter()
            .map(|s| s.parse::<SkillType>().map_err(DomainError::InvalidInput))
            .collect::<Result<Vec<_>, _>>()?;

        let admins = seed
            .admins
            .iter()
            .map(|a| User::new(a.chat_id, a.username.clone(), Role::Administrator))
            .collect::<Result<Vec<_>, _>>()?;

        let location = Location::new(
            LocationId::new(),
            seed.name,
            seed.description,
            seed.place,
            admins.clone(),
            skills,
            seed.max_points,
        )?;

        self.locations.create(&location).await?;
        for admin in &admins {
            self.users.upsert(admin).await?;
        }

        info!(location = %location.name(), admins = admins.len(), "Location seeded");
        Ok(location)
    }
}
