use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::skill::SkillType;

/// Upper bound on the points a single award may credit.
pub const MAX_AWARD_POINTS: i32 = 5;

/// A single skill-point credit in a character's history.
///
/// Immutable once created; appended to the grade history, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    skill: SkillType,
    points: i32,
    location_name: String,
    awarded_at: DateTime<Utc>,
}

impl Grade {
    pub fn new(
        skill: SkillType,
        points: i32,
        location_name: impl Into<String>,
        awarded_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let location_name = location_name.into();

        if points <= 0 {
            return Err(DomainError::invalid_input(
                "expected a positive number of points",
            ));
        }

        if location_name.is_empty() {
            return Err(DomainError::invalid_input("expected a location name"));
        }

        Ok(Self {
            skill,
            points,
            location_name,
            awarded_at,
        })
    }

    pub fn skill(&self) -> SkillType {
        self.skill
    }

    pub fn points(&self) -> i32 {
        self.points
    }

    pub fn location_name(&self) -> &str {
        &self.location_name
    }

    pub fn awarded_at(&self) -> DateTime<Utc> {
        self.awarded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_requires_positive_points() {
        let now = Utc::now();
        assert!(Grade::new(SkillType::Social, 0, "Rocket Lab", now).is_err());
        assert!(Grade::new(SkillType::Social, -3, "Rocket Lab", now).is_err());
        assert!(Grade::new(SkillType::Social, 1, "Rocket Lab", now).is_ok());
    }

    #[test]
    fn test_grade_requires_location_name() {
        let err = Grade::new(SkillType::Social, 2, "", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
