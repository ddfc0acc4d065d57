//! User roles.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Error;

/// The role a user account holds.
///
/// Roles gate both routes and the fields a user may change on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Visitor account that can browse published projects and comment.
    Community,

    /// Submits proposals and projects.
    Student,

    /// Supervises and reviews proposals and projects.
    Teacher,

    /// Full access.
    Admin,
}

impl Role {
    /// All roles, lowest privilege first.
    pub const ALL: [Role; 4] = [Role::Community, Role::Student, Role::Teacher, Role::Admin];

    /// Returns `true` if this role may submit proposals and projects.
    pub fn can_submit(&self) -> bool {
        matches!(self, Role::Student)
    }

    /// Returns `true` if this role may review (supervised) documents.
    pub fn can_review(&self) -> bool {
        matches!(self, Role::Teacher | Role::Admin)
    }

    /// Returns `true` if this role may upload files to the media host.
    pub fn can_upload(&self) -> bool {
        !matches!(self, Role::Community)
    }

    /// Returns `true` if a user may pick this role for themselves at
    /// registration.
    pub fn self_assignable(&self) -> bool {
        matches!(self, Role::Community | Role::Student)
    }

    /// Returns `true` for admins.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// The lowercase wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Community => "community",
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation_field("role", format!("unknown role '{s}'")))
    }
}
