//! Project-HUB Core: domain types, validation and access policy.
//!
//! This crate holds everything about proposals, projects and reviews that
//! does not depend on HTTP or storage. It has no internal Project-HUB
//! dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`ids`]: Document identifiers
//! - [`role`]: User roles
//! - [`user`]: Accounts, profiles and profile updates
//! - [`review`]: Review status, ratings, feedback and comments
//! - [`proposal`] / [`project`]: The two reviewable document kinds
//! - [`access`]: Who may see, edit and review what

#![forbid(unsafe_code)]

pub mod access;
pub mod attachment;
pub mod error;
pub mod ids;
pub mod project;
pub mod proposal;
pub mod review;
pub mod role;
pub mod user;

mod validate;

// Re-export key types at crate root for convenience
pub use access::{Actor, ListScope};
pub use attachment::Attachment;
pub use error::{Error, Result};
pub use ids::{CommentId, FeedbackId, ProjectId, ProposalId, UserId};
pub use project::{AppLink, NewProject, Project, ProjectUpdate, TeamMember};
pub use proposal::{NewProposal, Proposal, ProposalUpdate};
pub use review::{Comment, Feedback, NewComment, NewFeedback, Ratings, ReviewStatus, Reviewable};
pub use role::Role;
pub use user::{NewUser, User, UserProfile, UserUpdate};
