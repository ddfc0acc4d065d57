//! Proposals: what a student submits to a teacher before project work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::Actor;
use crate::attachment::{self, Attachment};
use crate::review::{Comment, Feedback, ReviewStatus, Reviewable};
use crate::{validate, Error, ProposalId, Result, UserId};

const MAX_OBJECTIVES: usize = 20;
const MAX_ATTACHMENTS: usize = 10;

/// A stored proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// Proposal identifier.
    pub id: ProposalId,
    /// Working title.
    pub title: String,
    /// Problem statement and approach.
    pub summary: String,
    /// Planned outcomes.
    pub objectives: Vec<String>,
    /// Subject area.
    pub category: Option<String>,
    /// Submitting student.
    pub student: UserId,
    /// Teacher asked to supervise.
    pub supervisor: UserId,
    /// Review status.
    pub status: ReviewStatus,
    /// Supporting files.
    pub attachments: Vec<Attachment>,
    /// Supervisor feedback.
    pub feedback: Vec<Feedback>,
    /// Discussion.
    pub comments: Vec<Comment>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Creates a pending proposal from validated input.
    pub fn create(student: UserId, input: NewProposal) -> Self {
        let now = Utc::now();
        Self {
            id: ProposalId::new(),
            title: input.title,
            summary: input.summary,
            objectives: input.objectives,
            category: input.category,
            student,
            supervisor: input.supervisor,
            status: ReviewStatus::Pending,
            attachments: input.attachments,
            feedback: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies an update that has already been stripped for `actor`.
    ///
    /// Content fields are validated like on creation. Non-admin status
    /// changes must follow [`ReviewStatus::can_transition_to`]. A content
    /// edit by the owner on a proposal sent back for revision resubmits it.
    pub fn apply_update(&mut self, update: ProposalUpdate, actor: &Actor) -> Result<()> {
        let content_changed = update.has_content();

        if let Some(title) = update.title {
            self.title = validate::text("title", &title, 3, 200)?;
        }
        if let Some(summary) = update.summary {
            self.summary = validate::text("summary", &summary, 1, 10_000)?;
        }
        if let Some(objectives) = update.objectives {
            self.objectives = validate::text_list("objectives", objectives, MAX_OBJECTIVES, 500)?;
        }
        if let Some(category) = update.category {
            self.category = validate::optional_text("category", Some(&category), 80)?;
        }
        if let Some(supervisor) = update.supervisor {
            self.supervisor = supervisor;
        }
        if let Some(attachments) = update.attachments {
            attachment::validate_all("attachments", &attachments, MAX_ATTACHMENTS)?;
            self.attachments = attachments;
        }

        match update.status {
            Some(next) => self.change_status(next, actor)?,
            None if content_changed
                && actor.id == self.student
                && self.status == ReviewStatus::RevisionRequested =>
            {
                self.status = ReviewStatus::Pending;
            }
            None => {}
        }

        self.updated_at = Utc::now();
        Ok(())
    }

    fn change_status(&mut self, next: ReviewStatus, actor: &Actor) -> Result<()> {
        if next == self.status {
            return Ok(());
        }
        if !actor.role.is_admin() && !self.status.can_transition_to(next) {
            return Err(Error::validation_field(
                "status",
                format!("cannot move a proposal from {} to {next}", self.status),
            ));
        }
        log::debug!("proposal {} status {} -> {next} by {}", self.id, self.status, actor.id);
        self.status = next;
        Ok(())
    }
}

impl Reviewable for Proposal {
    const KIND: &'static str = "proposal";

    fn owner(&self) -> UserId {
        self.student
    }

    fn supervisor(&self) -> UserId {
        self.supervisor
    }

    fn status(&self) -> ReviewStatus {
        self.status
    }

    fn set_status(&mut self, status: ReviewStatus) {
        self.status = status;
    }

    fn is_public(&self) -> bool {
        false
    }

    fn feedback(&self) -> &[Feedback] {
        &self.feedback
    }

    fn feedback_mut(&mut self) -> &mut Vec<Feedback> {
        &mut self.feedback
    }

    fn comments(&self) -> &[Comment] {
        &self.comments
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        &mut self.comments
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Proposal submission input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProposal {
    /// Working title.
    pub title: String,
    /// Problem statement and approach.
    pub summary: String,
    /// Planned outcomes.
    #[serde(default)]
    pub objectives: Vec<String>,
    /// Subject area.
    #[serde(default)]
    pub category: Option<String>,
    /// Teacher asked to supervise.
    pub supervisor: UserId,
    /// Supporting files, already uploaded.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl NewProposal {
    /// Validates and trims the input.
    pub fn normalize(self) -> Result<Self> {
        attachment::validate_all("attachments", &self.attachments, MAX_ATTACHMENTS)?;
        Ok(Self {
            title: validate::text("title", &self.title, 3, 200)?,
            summary: validate::text("summary", &self.summary, 1, 10_000)?,
            objectives: validate::text_list("objectives", self.objectives, MAX_OBJECTIVES, 500)?,
            category: validate::optional_text("category", self.category.as_deref(), 80)?,
            supervisor: self.supervisor,
            attachments: self.attachments,
        })
    }
}

/// Partial proposal update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProposalUpdate {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Replacement objectives.
    #[serde(default)]
    pub objectives: Option<Vec<String>>,
    /// New category; empty clears it.
    #[serde(default)]
    pub category: Option<String>,
    /// New supervisor.
    #[serde(default)]
    pub supervisor: Option<UserId>,
    /// Replacement attachments.
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
    /// New review status.
    #[serde(default)]
    pub status: Option<ReviewStatus>,
}

impl ProposalUpdate {
    /// Returns `true` if any owner-editable field is set.
    pub fn has_content(&self) -> bool {
        self.title.is_some()
            || self.summary.is_some()
            || self.objectives.is_some()
            || self.category.is_some()
            || self.supervisor.is_some()
            || self.attachments.is_some()
    }

    /// Returns `true` if nothing is set.
    pub fn is_empty(&self) -> bool {
        !self.has_content() && self.status.is_none()
    }
}
