//! Location repository trait definition.

use questline_types::error::RepositoryError;
use questline_types::location::{Location, LocationId};

/// Read-side repository for locations.
pub trait LocationRepository: Send + Sync {
    /// Create a new location. Fails `Conflict` if the name is taken.
    fn create(
        &self,
        location: &Location,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a location by its unique ID.
    fn get(
        &self,
        id: &LocationId,
    ) -> impl std::future::Future<Output = Result<Option<Location>, RepositoryError>> + Send;

    /// Get a location by its unique display name.
    fn get_by_name(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<Location>, RepositoryError>> + Send;

    /// List every location.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Location>, RepositoryError>> + Send;

    /// Find the location administered by the given username, if any.
    fn find_by_admin(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Option<Location>, RepositoryError>> + Send;
}
