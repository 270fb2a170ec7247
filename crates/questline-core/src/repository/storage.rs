//! Transactional storage port.
//!
//! Every mutating command runs as an atomic read-modify-write: begin a
//! unit of work, load the entities for update, apply the pure domain
//! transition, save, commit. Dropping an uncommitted unit of work rolls
//! everything back, so a failed transition never leaves a half-committed
//! booking behind.
//!
//! Lock order is fixed: locations before characters.

use questline_types::character::{Character, GroupName};
use questline_types::error::RepositoryError;
use questline_types::location::{Location, LocationId};

/// One atomic read-modify-write scope.
///
/// `*_for_update` fails `NotFound` for a missing key.
pub trait UnitOfWork: Send {
    fn location_for_update(
        &mut self,
        id: &LocationId,
    ) -> impl std::future::Future<Output = Result<Location, RepositoryError>> + Send;

    fn character_for_update(
        &mut self,
        group: &GroupName,
    ) -> impl std::future::Future<Output = Result<Character, RepositoryError>> + Send;

    fn save_location(
        &mut self,
        location: &Location,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn save_character(
        &mut self,
        character: &Character,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Make every save in this scope durable.
    fn commit(self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Factory of units of work.
pub trait Storage: Send + Sync {
    type Uow: UnitOfWork;

    fn begin(
        &self,
    ) -> impl std::future::Future<Output = Result<Self::Uow, RepositoryError>> + Send;
}
