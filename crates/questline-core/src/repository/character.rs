//! Character repository trait definition.

use questline_types::character::{Character, GroupName};
use questline_types::error::RepositoryError;

/// Read-side repository for characters.
///
/// Implementations live in questline-infra (e.g., SqliteCharacterRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
/// Mutations of existing characters go through the unit of work instead
/// (see [`crate::repository::storage::Storage`]).
pub trait CharacterRepository: Send + Sync {
    /// Register a new character. Fails `Conflict` if the group name or
    /// leader username is already taken.
    fn create(
        &self,
        character: &Character,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a character by its group name.
    fn get(
        &self,
        group: &GroupName,
    ) -> impl std::future::Future<Output = Result<Option<Character>, RepositoryError>> + Send;

    /// Get a character by its leader's username.
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<Character>, RepositoryError>> + Send;

    /// List every registered character.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Character>, RepositoryError>> + Send;
}
