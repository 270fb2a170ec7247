//! In-memory fakes of the storage ports for service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use questline_types::character::{Character, GroupName};
use questline_types::error::RepositoryError;
use questline_types::location::{Location, LocationId};
use questline_types::user::User;

use crate::repository::character::CharacterRepository;
use crate::repository::location::LocationRepository;
use crate::repository::storage::{Storage, UnitOfWork};
use crate::repository::user::UserRepository;

#[derive(Default)]
struct Inner {
    characters: HashMap<GroupName, Character>,
    locations: HashMap<LocationId, Location>,
    users: HashMap<String, User>,
}

/// Shared in-memory store implementing every repository port.
#[derive(Clone, Default)]
pub(crate) struct MemStorage {
    inner: Arc<Mutex<Inner>>,
}

impl MemStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn put_character(&self, character: Character) {
        self.inner
            .lock()
            .unwrap()
            .characters
            .insert(character.group().clone(), character);
    }

    pub(crate) fn put_location(&self, location: Location) {
        self.inner
            .lock()
            .unwrap()
            .locations
            .insert(location.id().clone(), location);
    }

    pub(crate) fn character(&self, group: &GroupName) -> Character {
        self.inner
            .lock()
            .unwrap()
            .characters
            .get(group)
            .cloned()
            .expect("character exists")
    }

    pub(crate) fn location(&self, id: &LocationId) -> Location {
        self.inner
            .lock()
            .unwrap()
            .locations
            .get(id)
            .cloned()
            .expect("location exists")
    }
}

/// Stages saves and applies them on commit; dropping discards them.
pub(crate) struct MemUow {
    inner: Arc<Mutex<Inner>>,
    staged_characters: Vec<Character>,
    staged_locations: Vec<Location>,
}

impl UnitOfWork for MemUow {
    async fn location_for_update(&mut self, id: &LocationId) -> Result<Location, RepositoryError> {
        self.inner
            .lock()
            .unwrap()
            .locations
            .get(id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn character_for_update(
        &mut self,
        group: &GroupName,
    ) -> Result<Character, RepositoryError> {
        self.inner
            .lock()
            .unwrap()
            .characters
            .get(group)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn save_location(&mut self, location: &Location) -> Result<(), RepositoryError> {
        self.staged_locations.push(location.clone());
        Ok(())
    }

    async fn save_character(&mut self, character: &Character) -> Result<(), RepositoryError> {
        self.staged_characters.push(character.clone());
        Ok(())
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        for location in self.staged_locations {
            inner.locations.insert(location.id().clone(), location);
        }
        for character in self.staged_characters {
            inner.characters.insert(character.group().clone(), character);
        }
        Ok(())
    }
}

impl Storage for MemStorage {
    type Uow = MemUow;

    async fn begin(&self) -> Result<Self::Uow, RepositoryError> {
        Ok(MemUow {
            inner: self.inner.clone(),
            staged_characters: Vec::new(),
            staged_locations: Vec::new(),
        })
    }
}

impl CharacterRepository for MemStorage {
    async fn create(&self, character: &Character) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.characters.contains_key(character.group()) {
            return Err(RepositoryError::Conflict(character.group().to_string()));
        }
        inner
            .characters
            .insert(character.group().clone(), character.clone());
        Ok(())
    }

    async fn get(&self, group: &GroupName) -> Result<Option<Character>, RepositoryError> {
        Ok(self.inner.lock().unwrap().characters.get(group).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Character>, RepositoryError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .characters
            .values()
            .find(|c| c.username() == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Character>, RepositoryError> {
        Ok(self.inner.lock().unwrap().characters.values().cloned().collect())
    }
}

impl LocationRepository for MemStorage {
    async fn create(&self, location: &Location) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.locations.values().any(|l| l.name() == location.name()) {
            return Err(RepositoryError::Conflict(location.name().to_string()));
        }
        inner
            .locations
            .insert(location.id().clone(), location.clone());
        Ok(())
    }

    async fn get(&self, id: &LocationId) -> Result<Option<Location>, RepositoryError> {
        Ok(self.inner.lock().unwrap().locations.get(id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Location>, RepositoryError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .locations
            .values()
            .find(|l| l.name() == name)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Location>, RepositoryError> {
        Ok(self.inner.lock().unwrap().locations.values().cloned().collect())
    }

    async fn find_by_admin(&self, username: &str) -> Result<Option<Location>, RepositoryError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .locations
            .values()
            .find(|l| l.is_admin(username))
            .cloned())
    }
}

impl UserRepository for MemStorage {
    async fn upsert(&self, user: &User) -> Result<(), RepositoryError> {
        self.inner
            .lock()
            .unwrap()
            .users
            .insert(user.username().to_string(), user.clone());
        Ok(())
    }

    async fn get(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.inner.lock().unwrap().users.get(username).cloned())
    }
}
