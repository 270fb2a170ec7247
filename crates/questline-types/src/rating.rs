//! Rating computation over a character's grade history.
//!
//! `rating = factor * base`, where the base sums general-skill points and
//! the factor is `1 + RATING_LAMBDA * additional points`. Additional skills
//! never score on their own; they only amplify the general-skill base.

use crate::grade::Grade;

/// Weight of one additional-skill point in the rating multiplier.
pub const RATING_LAMBDA: f64 = 1.0 / 72.0;

/// Sum of general-skill points.
pub fn rating_base(grades: &[Grade]) -> i32 {
    grades
        .iter()
        .filter(|g| g.skill().is_general())
        .map(Grade::points)
        .sum()
}

/// `1 + RATING_LAMBDA * additional points`.
pub fn rating_factor(grades: &[Grade]) -> f64 {
    let additional: i32 = grades
        .iter()
        .filter(|g| g.skill().is_additional())
        .map(Grade::points)
        .sum();
    1.0 + RATING_LAMBDA * f64::from(additional)
}

pub fn rating(grades: &[Grade]) -> f64 {
    rating_factor(grades) * f64::from(rating_base(grades))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::SkillType;

    use chrono::Utc;

    fn grade(skill: SkillType, points: i32) -> Grade {
        Grade::new(skill, points, "Rocket Lab", Utc::now()).unwrap()
    }

    #[test]
    fn test_rating_sums_general_skills() {
        let grades = vec![
            grade(SkillType::Engineering, 3),
            grade(SkillType::Researching, 4),
        ];
        assert_eq!(rating_base(&grades), 7);
        assert!((rating(&grades) - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_additional_skills_amplify_the_base() {
        let grades = vec![
            grade(SkillType::Engineering, 3),
            grade(SkillType::Researching, 4),
            grade(SkillType::Creative, 3),
            grade(SkillType::Sportive, 4),
        ];
        let expected = 7.0 * (1.0 + RATING_LAMBDA * 7.0);
        assert!((rating(&grades) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_additional_skills_alone_rate_zero() {
        let grades = vec![grade(SkillType::Creative, 5), grade(SkillType::Sportive, 5)];
        assert_eq!(rating(&grades), 0.0);
    }
}
