use thiserror::Error;

use crate::skill::SkillType;

/// Errors raised by the booking and scoring domain.
///
/// Every operation that returns one of these has made no change to the
/// entity it was called on, with one documented exception: a completion
/// that fails [`DomainError::CannotAward`] has already released the
/// booking (see `Location::complete`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("interval is already booked")]
    AlreadyBooked,

    #[error("character already has an active booking")]
    AlreadyHasBooking,

    #[error("booking start is too close to now")]
    TooClose,

    #[error("too late to book")]
    TooLate,

    #[error("instruction has not been started")]
    NotStarted,

    #[error("instruction has already been started")]
    AlreadyStarted,

    #[error("instruction has already finished")]
    AlreadyFinished,

    #[error("character has no active booking")]
    NotBooked,

    #[error("booking belongs to location {expected}, not {actual}")]
    BookingMismatch { expected: String, actual: String },

    #[error("location cannot award skill '{0}'")]
    CannotAward(SkillType),

    #[error("{points} points exceed the location maximum of {max}")]
    MaxPointsExceeded { points: i32, max: i32 },

    #[error("invalid score: {0}")]
    InvalidScore(i32),
}

impl DomainError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

/// Errors from repository operations (used by trait definitions in
/// questline-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_display() {
        let err = DomainError::BookingMismatch {
            expected: "a".to_string(),
            actual: "b".to_string(),
        };
        assert!(err.to_string().contains('a'));
        assert!(err.to_string().contains('b'));
    }

    #[test]
    fn test_cannot_award_names_the_skill() {
        let err = DomainError::CannotAward(SkillType::Creative);
        assert_eq!(err.to_string(), "location cannot award skill 'creative'");
    }
}
