//! User repository trait definition.

use questline_types::error::RepositoryError;
use questline_types::user::User;

pub trait UserRepository: Send + Sync {
    /// Insert or replace a user keyed by username.
    fn upsert(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a user by username.
    fn get(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;
}
