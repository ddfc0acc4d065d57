//! Access policy: who may see, change and review which documents.
//!
//! Updates are *stripped* rather than rejected: fields the acting role may
//! not touch are dropped from the update, and only an actor with no write
//! access at all gets [`Error::Forbidden`].

use crate::review::{Comment, Feedback, Reviewable};
use crate::{Error, Project, ProjectUpdate, Proposal, ProposalUpdate, Result, Role, User, UserId, UserUpdate};

/// The user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Account identifier.
    pub id: UserId,
    /// Account role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    fn owns<D: Reviewable>(&self, doc: &D) -> bool {
        doc.owner() == self.id
    }

    fn supervises<D: Reviewable>(&self, doc: &D) -> bool {
        self.role == Role::Teacher && doc.supervisor() == self.id
    }
}

/// Returns `Ok(())` when `allowed`, otherwise a forbidden error.
pub fn require(allowed: bool, message: &str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(Error::forbidden(message))
    }
}

/// Owner, supervisor and admins may always view; anyone else only when
/// the document is public.
pub fn can_view<D: Reviewable>(actor: Option<&Actor>, doc: &D) -> bool {
    match actor {
        Some(actor) if actor.role.is_admin() || actor.owns(doc) || actor.supervises(doc) => true,
        _ => doc.is_public(),
    }
}

/// Anyone who can view may comment, except anonymous visitors.
pub fn can_comment<D: Reviewable>(actor: Option<&Actor>, doc: &D) -> bool {
    actor.is_some() && can_view(actor, doc)
}

/// The assigned supervisor or an admin.
pub fn can_review<D: Reviewable>(actor: &Actor, doc: &D) -> bool {
    actor.role.is_admin() || actor.supervises(doc)
}

/// The feedback author or an admin.
pub fn can_remove_feedback(actor: &Actor, feedback: &Feedback) -> bool {
    actor.role.is_admin() || feedback.reviewer == actor.id
}

/// The comment author or an admin.
pub fn can_remove_comment(actor: &Actor, comment: &Comment) -> bool {
    actor.role.is_admin() || comment.author == actor.id
}

/// Admins always; the owner only while nothing has been reviewed.
pub fn can_delete_proposal(actor: &Actor, proposal: &Proposal) -> bool {
    actor.role.is_admin()
        || (actor.owns(proposal) && proposal.status == crate::ReviewStatus::Pending)
}

/// Admins always; the owner unless the project was approved.
pub fn can_delete_project(actor: &Actor, project: &Project) -> bool {
    actor.role.is_admin()
        || (actor.owns(project) && project.status != crate::ReviewStatus::Approved)
}

/// Which documents a listing shows to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Every document (admins).
    All,
    /// Documents owned by a student.
    OwnedBy(UserId),
    /// Documents supervised by a teacher.
    SupervisedBy(UserId),
    /// Nothing (community accounts).
    Nothing,
}

impl ListScope {
    /// The scope for an actor's own listing.
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            Role::Admin => ListScope::All,
            Role::Student => ListScope::OwnedBy(actor.id),
            Role::Teacher => ListScope::SupervisedBy(actor.id),
            Role::Community => ListScope::Nothing,
        }
    }

    /// Whether `doc` falls in this scope.
    pub fn includes<D: Reviewable>(&self, doc: &D) -> bool {
        match self {
            ListScope::All => true,
            ListScope::OwnedBy(id) => doc.owner() == *id,
            ListScope::SupervisedBy(id) => doc.supervisor() == *id,
            ListScope::Nothing => false,
        }
    }
}

/// Strips a profile update for `actor` editing `target`.
///
/// Only the account itself and admins may edit a profile. Non-admins lose
/// `role`; an admin editing someone else loses the password fields.
pub fn strip_user_update(actor: &Actor, target: &User, mut update: UserUpdate) -> Result<UserUpdate> {
    let is_self = actor.id == target.id;
    require(is_self || actor.role.is_admin(), "cannot edit another user's profile")?;

    let mut stripped = Vec::new();
    if !actor.role.is_admin() && update.role.take().is_some() {
        stripped.push("role");
    }
    if !is_self && (update.password.take().is_some() | update.current_password.take().is_some()) {
        stripped.push("password");
    }
    log_stripped("user", actor, &stripped);
    Ok(update)
}

/// Strips a proposal update for `actor`.
///
/// The owner keeps content fields and loses `status`, and may only edit
/// while the proposal is pending or sent back for revision. The
/// supervisor keeps only `status`. Admins keep everything.
pub fn strip_proposal_update(
    actor: &Actor,
    proposal: &Proposal,
    mut update: ProposalUpdate,
) -> Result<ProposalUpdate> {
    if actor.role.is_admin() {
        return Ok(update);
    }

    let mut stripped = Vec::new();
    if actor.owns(proposal) {
        require(
            proposal.status.is_editable(),
            "proposal can no longer be edited",
        )?;
        if update.status.take().is_some() {
            stripped.push("status");
        }
    } else if actor.supervises(proposal) {
        if update.has_content() {
            stripped.push("content");
        }
        update = ProposalUpdate {
            status: update.status,
            ..Default::default()
        };
    } else {
        return Err(Error::forbidden("cannot edit this proposal"));
    }

    log_stripped("proposal", actor, &stripped);
    Ok(update)
}

/// Strips a project update for `actor`.
///
/// The owner keeps content fields and loses `status` and `published`,
/// editing only while pending or sent back for revision. The supervisor
/// keeps `status` and `published`. Admins keep everything.
pub fn strip_project_update(
    actor: &Actor,
    project: &Project,
    mut update: ProjectUpdate,
) -> Result<ProjectUpdate> {
    if actor.role.is_admin() {
        return Ok(update);
    }

    let mut stripped = Vec::new();
    if actor.owns(project) {
        require(project.status.is_editable(), "project can no longer be edited")?;
        if update.status.take().is_some() {
            stripped.push("status");
        }
        if update.published.take().is_some() {
            stripped.push("published");
        }
    } else if actor.supervises(project) {
        if update.has_content() {
            stripped.push("content");
        }
        update = ProjectUpdate {
            status: update.status,
            published: update.published,
            ..Default::default()
        };
    } else {
        return Err(Error::forbidden("cannot edit this project"));
    }

    log_stripped("project", actor, &stripped);
    Ok(update)
}

fn log_stripped(kind: &str, actor: &Actor, fields: &[&str]) {
    if !fields.is_empty() {
        log::debug!(
            "stripped {fields:?} from {kind} update by {} ({})",
            actor.id,
            actor.role
        );
    }
}
