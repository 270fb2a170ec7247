//! Command and query services composing the domain operations.

pub mod booking;
pub mod query;
pub mod registry;

use questline_types::error::{DomainError, RepositoryError};
use thiserror::Error;

/// Failure of a service operation: either a domain rule or the storage
/// boundary. Non-ok means no mutation occurred, with the single documented
/// exception of a completion failing `CannotAward` (the release is
/// persisted; see `BookingService::complete`).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
