use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Event roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Participant,
    Administrator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Participant => write!(f, "participant"),
            Role::Administrator => write!(f, "administrator"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "participant" => Ok(Role::Participant),
            "administrator" => Ok(Role::Administrator),
            other => Err(format!(
                "invalid role '{other}'; expected one of [participant, administrator]"
            )),
        }
    }
}

/// A chat user known to the event: a group leader or a station
/// administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    chat_id: i64,
    username: String,
    role: Role,
}

impl User {
    pub fn new(chat_id: i64, username: impl Into<String>, role: Role) -> Result<Self, DomainError> {
        let username = username.into();

        if chat_id == 0 {
            return Err(DomainError::invalid_input("expected a chat id"));
        }

        if username.is_empty() {
            return Err(DomainError::invalid_input("expected a username"));
        }

        Ok(Self {
            chat_id,
            username,
            role,
        })
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Participant, Role::Administrator] {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(role, parsed);
        }
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_validation() {
        assert!(User::new(0, "ada", Role::Participant).is_err());
        assert!(User::new(7, "", Role::Participant).is_err());
        assert!(User::new(7, "ada", Role::Administrator).is_ok());
    }
}
