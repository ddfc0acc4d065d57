//! Unique identifier types for stored documents.
//!
//! Every identifier is a UUID v4 newtype that serializes as a plain string,
//! so `{"id": "…"}` on the wire and `proposals/<uuid>` in storage look the
//! same for every kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from a UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

document_id!(
    /// Identifier of a user account.
    UserId
);

document_id!(
    /// Identifier of a proposal.
    ProposalId
);

document_id!(
    /// Identifier of a project.
    ProjectId
);

document_id!(
    /// Identifier of a comment inside a proposal or project.
    CommentId
);

document_id!(
    /// Identifier of a feedback entry inside a proposal or project.
    FeedbackId
);
