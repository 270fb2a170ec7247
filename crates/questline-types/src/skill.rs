use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Scoring categories a location may reward.
///
/// The set is closed and partitioned into *general* skills, which feed the
/// rating base, and *additional* skills, which feed the rating multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillType {
    Engineering,
    Researching,
    Social,
    Creative,
    Sportive,
}

/// Skills contributing to the rating base.
pub const GENERAL_SKILLS: [SkillType; 3] = [
    SkillType::Engineering,
    SkillType::Researching,
    SkillType::Social,
];

/// Skills contributing to the rating multiplier.
pub const ADDITIONAL_SKILLS: [SkillType; 2] = [SkillType::Creative, SkillType::Sportive];

/// Every skill type, general first.
pub const ALL_SKILLS: [SkillType; 5] = [
    SkillType::Engineering,
    SkillType::Researching,
    SkillType::Social,
    SkillType::Creative,
    SkillType::Sportive,
];

impl SkillType {
    pub fn is_general(self) -> bool {
        GENERAL_SKILLS.contains(&self)
    }

    pub fn is_additional(self) -> bool {
        ADDITIONAL_SKILLS.contains(&self)
    }
}

impl fmt::Display for SkillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillType::Engineering => write!(f, "engineering"),
            SkillType::Researching => write!(f, "researching"),
            SkillType::Social => write!(f, "social"),
            SkillType::Creative => write!(f, "creative"),
            SkillType::Sportive => write!(f, "sportive"),
        }
    }
}

impl FromStr for SkillType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "engineering" => Ok(SkillType::Engineering),
            "researching" => Ok(SkillType::Researching),
            "social" => Ok(SkillType::Social),
            "creative" => Ok(SkillType::Creative),
            "sportive" => Ok(SkillType::Sportive),
            other => Err(format!(
                "invalid skill type '{other}'; expected one of \
                 [engineering, researching, social, creative, sportive]"
            )),
        }
    }
}
