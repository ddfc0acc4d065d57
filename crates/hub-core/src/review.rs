//! Review status, structured feedback and comments.
//!
//! Proposals and projects share the same review machinery, expressed by the
//! [`Reviewable`] trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{validate, CommentId, Error, FeedbackId, Result, User, UserId};

/// Review state of a proposal or project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Submitted and waiting for the supervisor.
    Pending,

    /// The supervisor has started reviewing.
    UnderReview,

    /// Sent back to the student for changes.
    RevisionRequested,

    /// Accepted.
    Approved,

    /// Declined.
    Rejected,
}

impl ReviewStatus {
    /// Returns `true` if the review is finished (Approved or Rejected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReviewStatus::Approved | ReviewStatus::Rejected)
    }

    /// Returns `true` if the owning student may still edit the document.
    pub fn is_editable(&self) -> bool {
        matches!(self, ReviewStatus::Pending | ReviewStatus::RevisionRequested)
    }

    /// Whether a non-admin may move a document from `self` to `next`.
    ///
    /// Moving to the same state is not a transition.
    pub fn can_transition_to(&self, next: ReviewStatus) -> bool {
        use ReviewStatus::*;
        match self {
            Pending => matches!(next, UnderReview | RevisionRequested | Approved | Rejected),
            UnderReview => matches!(next, RevisionRequested | Approved | Rejected),
            RevisionRequested => matches!(next, Pending),
            Approved | Rejected => false,
        }
    }

    /// The snake_case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::UnderReview => "under_review",
            ReviewStatus::RevisionRequested => "revision_requested",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ratings given by a reviewer, each from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratings {
    /// Novelty of the idea.
    pub originality: u8,
    /// Whether the work can be delivered as planned.
    pub feasibility: u8,
    /// Soundness of the approach.
    pub methodology: u8,
    /// Quality of the write-up and materials.
    pub presentation: u8,
}

impl Ratings {
    /// Lowest allowed rating.
    pub const MIN: u8 = 1;
    /// Highest allowed rating.
    pub const MAX: u8 = 5;

    /// Checks every rating is within range.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("ratings.originality", self.originality),
            ("ratings.feasibility", self.feasibility),
            ("ratings.methodology", self.methodology),
            ("ratings.presentation", self.presentation),
        ] {
            if !(Self::MIN..=Self::MAX).contains(&value) {
                return Err(Error::validation_field(
                    field,
                    format!("must be between {} and {}", Self::MIN, Self::MAX),
                ));
            }
        }
        Ok(())
    }

    /// Mean of the four ratings.
    pub fn average(&self) -> f32 {
        let sum = u16::from(self.originality)
            + u16::from(self.feasibility)
            + u16::from(self.methodology)
            + u16::from(self.presentation);
        f32::from(sum) / 4.0
    }
}

/// A structured review left by a supervisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// Feedback identifier.
    pub id: FeedbackId,
    /// Reviewer account.
    pub reviewer: UserId,
    /// Reviewer name at the time of writing.
    pub reviewer_name: String,
    /// Ratings.
    pub ratings: Ratings,
    /// What works well.
    pub strengths: Vec<String>,
    /// What should improve.
    pub improvements: Vec<String>,
    /// Free-form remarks.
    pub comment: String,
    /// When the feedback was left.
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    /// Creates feedback from validated input.
    pub fn new(reviewer: &User, input: NewFeedback) -> Self {
        Self {
            id: FeedbackId::new(),
            reviewer: reviewer.id,
            reviewer_name: reviewer.name.clone(),
            ratings: input.ratings,
            strengths: input.strengths,
            improvements: input.improvements,
            comment: input.comment,
            created_at: Utc::now(),
        }
    }
}

/// Feedback input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFeedback {
    /// Ratings.
    pub ratings: Ratings,
    /// What works well.
    #[serde(default)]
    pub strengths: Vec<String>,
    /// What should improve.
    #[serde(default)]
    pub improvements: Vec<String>,
    /// Free-form remarks.
    #[serde(default)]
    pub comment: String,
}

impl NewFeedback {
    /// Validates and trims the input.
    pub fn normalize(self) -> Result<Self> {
        self.ratings.validate()?;
        let strengths = validate::text_list("strengths", self.strengths, 10, 500)?;
        let improvements = validate::text_list("improvements", self.improvements, 10, 500)?;
        let comment = self.comment.trim().to_string();
        if comment.chars().count() > 5000 {
            return Err(Error::validation_field(
                "comment",
                "must be at most 5000 characters",
            ));
        }
        if strengths.is_empty() && improvements.is_empty() && comment.is_empty() {
            return Err(Error::validation(
                "feedback needs at least one strength, improvement or comment",
            ));
        }
        Ok(Self {
            ratings: self.ratings,
            strengths,
            improvements,
            comment,
        })
    }
}

/// A discussion comment on a proposal or project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    pub id: CommentId,
    /// Author account.
    pub author: UserId,
    /// Author name at the time of writing.
    pub author_name: String,
    /// Comment text.
    pub body: String,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment from validated input.
    pub fn new(author: &User, input: NewComment) -> Self {
        Self {
            id: CommentId::new(),
            author: author.id,
            author_name: author.name.clone(),
            body: input.body,
            created_at: Utc::now(),
        }
    }
}

/// Comment input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    /// Comment text.
    pub body: String,
}

impl NewComment {
    /// Validates and trims the input.
    pub fn normalize(self) -> Result<Self> {
        Ok(Self {
            body: validate::text("body", &self.body, 1, 2000)?,
        })
    }
}

/// A document that goes through supervisor review.
pub trait Reviewable {
    /// Document kind used in messages ("proposal", "project").
    const KIND: &'static str;

    /// The student who owns the document.
    fn owner(&self) -> UserId;

    /// The teacher assigned to review it.
    fn supervisor(&self) -> UserId;

    /// Current review status.
    fn status(&self) -> ReviewStatus;

    /// Sets the review status.
    fn set_status(&mut self, status: ReviewStatus);

    /// Whether anyone, including anonymous visitors, may view it.
    fn is_public(&self) -> bool;

    /// Feedback entries, oldest first.
    fn feedback(&self) -> &[Feedback];

    /// Mutable feedback entries.
    fn feedback_mut(&mut self) -> &mut Vec<Feedback>;

    /// Comments, oldest first.
    fn comments(&self) -> &[Comment];

    /// Mutable comments.
    fn comments_mut(&mut self) -> &mut Vec<Comment>;

    /// Bumps the modification time.
    fn touch(&mut self);

    /// Appends feedback. A pending document moves to under review.
    fn add_feedback(&mut self, feedback: Feedback) {
        if self.status() == ReviewStatus::Pending {
            self.set_status(ReviewStatus::UnderReview);
        }
        self.feedback_mut().push(feedback);
        self.touch();
    }

    /// Removes feedback by id, returning it.
    fn remove_feedback(&mut self, id: FeedbackId) -> Option<Feedback> {
        let index = self.feedback().iter().position(|f| f.id == id)?;
        self.touch();
        Some(self.feedback_mut().remove(index))
    }

    /// Appends a comment.
    fn add_comment(&mut self, comment: Comment) {
        self.comments_mut().push(comment);
        self.touch();
    }

    /// Removes a comment by id, returning it.
    fn remove_comment(&mut self, id: CommentId) -> Option<Comment> {
        let index = self.comments().iter().position(|c| c.id == id)?;
        self.touch();
        Some(self.comments_mut().remove(index))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ratings(v: u8) -> Ratings {
        Ratings {
            originality: v,
            feasibility: v,
            methodology: v,
            presentation: v,
        }
    }

    #[test]
    fn test_status_terminal() {
        assert!(ReviewStatus::Approved.is_terminal());
        assert!(ReviewStatus::Rejected.is_terminal());
        assert!(!ReviewStatus::Pending.is_terminal());
        assert!(!ReviewStatus::UnderReview.is_terminal());
        assert!(!ReviewStatus::RevisionRequested.is_terminal());
    }

    #[test]
    fn test_status_transitions() {
        use ReviewStatus::*;
        assert!(Pending.can_transition_to(UnderReview));
        assert!(Pending.can_transition_to(Approved));
        assert!(UnderReview.can_transition_to(RevisionRequested));
        assert!(RevisionRequested.can_transition_to(Pending));
        assert!(!RevisionRequested.can_transition_to(Approved));
        assert!(!UnderReview.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Rejected));
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&ReviewStatus::RevisionRequested).unwrap();
        assert_eq!(json, "\"revision_requested\"");
        let status: ReviewStatus = serde_json::from_str("\"under_review\"").unwrap();
        assert_eq!(status, ReviewStatus::UnderReview);
    }

    #[test]
    fn test_ratings_range() {
        assert!(ratings(1).validate().is_ok());
        assert!(ratings(5).validate().is_ok());
        assert!(ratings(0).validate().is_err());
        assert!(ratings(6).validate().is_err());
    }

    #[test]
    fn test_ratings_average() {
        let r = Ratings {
            originality: 5,
            feasibility: 4,
            methodology: 3,
            presentation: 2,
        };
        assert!((r.average() - 3.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_feedback_requires_content() {
        let input = NewFeedback {
            ratings: ratings(3),
            strengths: vec!["  ".into()],
            improvements: vec![],
            comment: " ".into(),
        };
        assert!(input.normalize().is_err());
    }

    #[test]
    fn test_feedback_normalizes_lists() {
        let input = NewFeedback {
            ratings: ratings(4),
            strengths: vec![" Clear scope ".into(), "".into()],
            improvements: vec![],
            comment: String::new(),
        };
        let out = input.normalize().unwrap();
        assert_eq!(out.strengths, vec!["Clear scope".to_string()]);
    }

    #[test]
    fn test_comment_body_bounds() {
        assert!(NewComment { body: "  ".into() }.normalize().is_err());
        assert!(NewComment { body: "x".repeat(2001) }.normalize().is_err());
        assert_eq!(
            NewComment { body: " Nice work ".into() }.normalize().unwrap().body,
            "Nice work"
        );
    }

    fn any_status() -> impl Strategy<Value = ReviewStatus> {
        prop_oneof![
            Just(ReviewStatus::Pending),
            Just(ReviewStatus::UnderReview),
            Just(ReviewStatus::RevisionRequested),
            Just(ReviewStatus::Approved),
            Just(ReviewStatus::Rejected),
        ]
    }

    proptest! {
        #[test]
        fn prop_no_self_transitions(status in any_status()) {
            prop_assert!(!status.can_transition_to(status));
        }

        #[test]
        fn prop_terminal_states_are_final(from in any_status(), to in any_status()) {
            if from.is_terminal() {
                prop_assert!(!from.can_transition_to(to));
            }
        }
    }
}
