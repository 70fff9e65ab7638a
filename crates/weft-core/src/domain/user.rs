//! Users, roles and the acting principal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::UserId;

/// Capability level of a viewer/actor.
///
/// Wire names are `Manager` and `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Unrestricted visibility and mutation rights.
    Manager,
    /// Assignee role: status updates and filtered visibility on own tasks.
    #[serde(rename = "User")]
    Member,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Manager => "Manager",
            Role::Member => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Manager" => Ok(Role::Manager),
            "User" => Ok(Role::Member),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A user known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// The authenticated principal behind a request.
///
/// Authentication happens upstream; the core only trusts what it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn manager(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Manager,
        }
    }

    pub fn member(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Member,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Manager", Some(Role::Manager))]
    #[case("User", Some(Role::Member))]
    #[case("Member", None)]
    #[case("manager", None)]
    fn role_wire_names(#[case] raw: &str, #[case] expected: Option<Role>) {
        assert_eq!(raw.parse::<Role>().ok(), expected);
        if let Some(role) = expected {
            assert_eq!(serde_json::to_value(role).unwrap(), raw);
        }
    }
}
