//! Projects: the body of work built from an approved proposal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::Actor;
use crate::attachment::{self, Attachment};
use crate::review::{Comment, Feedback, ReviewStatus, Reviewable};
use crate::{validate, Error, ProjectId, ProposalId, Result, UserId};

const MAX_TEAM: usize = 20;
const MAX_TOOLS: usize = 30;
const MAX_APPS: usize = 10;
const MAX_DOCUMENTS: usize = 20;

/// A member of the project team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Member name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Responsibility within the team.
    #[serde(default)]
    pub role: Option<String>,
}

impl TeamMember {
    fn normalize(self) -> Result<Self> {
        Ok(Self {
            name: validate::text("team.name", &self.name, 1, 100)?,
            email: match self.email.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(email) => Some(validate::email("team.email", email)?),
            },
            role: validate::optional_text("team.role", self.role.as_deref(), 60)?,
        })
    }
}

/// A deployed app or demo that belongs to the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppLink {
    /// App name.
    pub name: String,
    /// Where to reach it.
    pub url: String,
    /// Platform ("web", "android", ...).
    #[serde(default)]
    pub platform: Option<String>,
}

impl AppLink {
    fn normalize(self) -> Result<Self> {
        Ok(Self {
            name: validate::text("apps.name", &self.name, 1, 100)?,
            url: validate::url("apps.url", &self.url)?,
            platform: validate::optional_text("apps.platform", self.platform.as_deref(), 40)?,
        })
    }
}

fn normalize_team(team: Vec<TeamMember>) -> Result<Vec<TeamMember>> {
    validate::max_items("team", team.len(), MAX_TEAM)?;
    team.into_iter().map(TeamMember::normalize).collect()
}

fn normalize_apps(apps: Vec<AppLink>) -> Result<Vec<AppLink>> {
    validate::max_items("apps", apps.len(), MAX_APPS)?;
    apps.into_iter().map(AppLink::normalize).collect()
}

/// Trims tools and drops case-insensitive duplicates, keeping first spelling.
fn normalize_tools(tools: Vec<String>) -> Result<Vec<String>> {
    let tools = validate::text_list("tools", tools, MAX_TOOLS, 60)?;
    let mut seen = std::collections::HashSet::new();
    Ok(tools
        .into_iter()
        .filter(|tool| seen.insert(tool.to_lowercase()))
        .collect())
}

fn normalize_repository(url: Option<&str>) -> Result<Option<String>> {
    match url.map(str::trim) {
        None | Some("") => Ok(None),
        Some(url) => validate::url("repository_url", url).map(Some),
    }
}

/// A stored project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Project identifier.
    pub id: ProjectId,
    /// Title.
    pub title: String,
    /// Description of the delivered work.
    pub description: String,
    /// The approved proposal this project grew from.
    pub proposal: ProposalId,
    /// Owning student.
    pub owner: UserId,
    /// Supervising teacher, inherited from the proposal.
    pub supervisor: UserId,
    /// Team members.
    pub team: Vec<TeamMember>,
    /// Languages, frameworks and services used.
    pub tools: Vec<String>,
    /// Deployed apps and demos.
    pub apps: Vec<AppLink>,
    /// Reports, manuals, slides.
    pub documentation: Vec<Attachment>,
    /// Source repository.
    pub repository_url: Option<String>,
    /// Review status.
    pub status: ReviewStatus,
    /// Whether the project is listed publicly once approved.
    pub published: bool,
    /// Supervisor feedback.
    pub feedback: Vec<Feedback>,
    /// Discussion.
    pub comments: Vec<Comment>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a pending, unpublished project from validated input.
    pub fn create(owner: UserId, supervisor: UserId, input: NewProject) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            title: input.title,
            description: input.description,
            proposal: input.proposal,
            owner,
            supervisor,
            team: input.team,
            tools: input.tools,
            apps: input.apps,
            documentation: input.documentation,
            repository_url: input.repository_url,
            status: ReviewStatus::Pending,
            published: false,
            feedback: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `query` matches the title, description or a tool,
    /// case-insensitively.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.tools.iter().any(|t| t.to_lowercase().contains(&query))
    }

    /// Whether the project lists `tool` (case-insensitive exact match).
    pub fn uses_tool(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t.eq_ignore_ascii_case(tool.trim()))
    }

    /// Applies an update that has already been stripped for `actor`.
    ///
    /// Publishing requires the project to end up approved; moving an
    /// approved project to any other status unpublishes it.
    pub fn apply_update(&mut self, update: ProjectUpdate, actor: &Actor) -> Result<()> {
        let content_changed = update.has_content();

        if let Some(title) = update.title {
            self.title = validate::text("title", &title, 3, 200)?;
        }
        if let Some(description) = update.description {
            self.description = validate::text("description", &description, 1, 20_000)?;
        }
        if let Some(team) = update.team {
            self.team = normalize_team(team)?;
        }
        if let Some(tools) = update.tools {
            self.tools = normalize_tools(tools)?;
        }
        if let Some(apps) = update.apps {
            self.apps = normalize_apps(apps)?;
        }
        if let Some(documentation) = update.documentation {
            attachment::validate_all("documentation", &documentation, MAX_DOCUMENTS)?;
            self.documentation = documentation;
        }
        if let Some(repository_url) = update.repository_url {
            self.repository_url = normalize_repository(Some(&repository_url))?;
        }

        match update.status {
            Some(next) => self.change_status(next, actor)?,
            None if content_changed
                && actor.id == self.owner
                && self.status == ReviewStatus::RevisionRequested =>
            {
                self.status = ReviewStatus::Pending;
            }
            None => {}
        }

        if self.status != ReviewStatus::Approved {
            if update.published == Some(true) {
                return Err(Error::validation_field(
                    "published",
                    "only approved projects can be published",
                ));
            }
            self.published = false;
        } else if let Some(published) = update.published {
            self.published = published;
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
                format!("cannot move a project from {} to {next}", self.status),
            ));
        }
        log::debug!("project {} status {} -> {next} by {}", self.id, self.status, actor.id);
        self.status = next;
        Ok(())
    }
}

impl Reviewable for Project {
    const KIND: &'static str = "project";

    fn owner(&self) -> UserId {
        self.owner
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
        self.published && self.status == ReviewStatus::Approved
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

/// Project submission input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    /// The approved proposal this project grew from.
    pub proposal: ProposalId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Team members.
    #[serde(default)]
    pub team: Vec<TeamMember>,
    /// Tools used.
    #[serde(default)]
    pub tools: Vec<String>,
    /// Deployed apps.
    #[serde(default)]
    pub apps: Vec<AppLink>,
    /// Documentation files, already uploaded.
    #[serde(default)]
    pub documentation: Vec<Attachment>,
    /// Source repository.
    #[serde(default)]
    pub repository_url: Option<String>,
}

impl NewProject {
    /// Validates and trims the input.
    pub fn normalize(self) -> Result<Self> {
        attachment::validate_all("documentation", &self.documentation, MAX_DOCUMENTS)?;
        Ok(Self {
            proposal: self.proposal,
            title: validate::text("title", &self.title, 3, 200)?,
            description: validate::text("description", &self.description, 1, 20_000)?,
            team: normalize_team(self.team)?,
            tools: normalize_tools(self.tools)?,
            apps: normalize_apps(self.apps)?,
            documentation: self.documentation,
            repository_url: normalize_repository(self.repository_url.as_deref())?,
        })
    }
}

/// Partial project update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProjectUpdate {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// Replacement team.
    #[serde(default)]
    pub team: Option<Vec<TeamMember>>,
    /// Replacement tools.
    #[serde(default)]
    pub tools: Option<Vec<String>>,
    /// Replacement apps.
    #[serde(default)]
    pub apps: Option<Vec<AppLink>>,
    /// Replacement documentation.
    #[serde(default)]
    pub documentation: Option<Vec<Attachment>>,
    /// New repository URL; empty clears it.
    #[serde(default)]
    pub repository_url: Option<String>,
    /// New review status.
    #[serde(default)]
    pub status: Option<ReviewStatus>,
    /// Publish or unpublish.
    #[serde(default)]
    pub published: Option<bool>,
}

impl ProjectUpdate {
    /// Returns `true` if any owner-editable field is set.
    pub fn has_content(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.team.is_some()
            || self.tools.is_some()
            || self.apps.is_some()
            || self.documentation.is_some()
            || self.repository_url.is_some()
    }

    /// Returns `true` if nothing is set.
    pub fn is_empty(&self) -> bool {
        !self.has_content() && self.status.is_none() && self.published.is_none()
    }
}
