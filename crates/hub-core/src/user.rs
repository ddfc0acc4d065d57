//! User accounts, public profiles and profile updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::access::Actor;
use crate::{validate, Attachment, Result, Role, UserId};

/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum password length in characters.
pub const MAX_PASSWORD_LEN: usize = 128;

/// A stored user account.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Lowercase email, unique across accounts.
    pub email: String,
    /// Encoded password hash (PHC string).
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Department or faculty.
    pub department: Option<String>,
    /// Institutional student number.
    pub student_id: Option<String>,
    /// Short biography.
    pub bio: Option<String>,
    /// Profile picture.
    pub avatar: Option<Attachment>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last changed.
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl User {
    /// Creates an account from validated registration input.
    ///
    /// `input` is expected to have gone through [`NewUser::normalize`].
    pub fn create(input: NewUser, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name: input.name,
            email: input.email,
            password_hash,
            role,
            department: input.department,
            student_id: input.student_id,
            bio: None,
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The public view of this account.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            department: self.department.clone(),
            student_id: self.student_id.clone(),
            bio: self.bio.clone(),
            avatar: self.avatar.clone(),
            created_at: self.created_at,
        }
    }

    /// This user as an access-policy actor.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }

    /// Applies the profile fields of an update.
    ///
    /// Password fields are ignored here; the caller hashes a new password
    /// and stores it with [`User::set_password_hash`]. Role changes are
    /// applied as given, so strip the update with
    /// [`crate::access::strip_user_update`] first.
    pub fn apply_update(&mut self, update: &UserUpdate) -> Result<()> {
        if let Some(name) = &update.name {
            self.name = validate::text("name", name, 1, 100)?;
        }
        if let Some(department) = &update.department {
            self.department = validate::optional_text("department", Some(department), 120)?;
        }
        if let Some(student_id) = &update.student_id {
            self.student_id = validate::optional_text("student_id", Some(student_id), 40)?;
        }
        if let Some(bio) = &update.bio {
            self.bio = validate::optional_text("bio", Some(bio), 1000)?;
        }
        if let Some(avatar) = &update.avatar {
            avatar.validate("avatar")?;
            self.avatar = Some(avatar.clone());
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replaces the stored password hash.
    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = hash;
        self.updated_at = Utc::now();
    }
}

/// The public view of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Department or faculty.
    pub department: Option<String>,
    /// Institutional student number.
    pub student_id: Option<String>,
    /// Short biography.
    pub bio: Option<String>,
    /// Profile picture.
    pub avatar: Option<Attachment>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Registration input.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Requested role; defaults to student.
    #[serde(default)]
    pub role: Option<Role>,
    /// Department or faculty.
    #[serde(default)]
    pub department: Option<String>,
    /// Institutional student number.
    #[serde(default)]
    pub student_id: Option<String>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    /// Validates the input and returns it with trimmed fields and a
    /// lowercase email.
    pub fn normalize(self) -> Result<Self> {
        validate_password("password", &self.password)?;
        Ok(Self {
            name: validate::text("name", &self.name, 1, 100)?,
            email: validate::email("email", &self.email)?,
            password: self.password,
            role: self.role,
            department: validate::optional_text("department", self.department.as_deref(), 120)?,
            student_id: validate::optional_text("student_id", self.student_id.as_deref(), 40)?,
        })
    }
}

/// Checks a plain-text password against the length policy.
pub fn validate_password(field: &str, password: &str) -> Result<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(crate::Error::validation_field(
            field,
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(crate::Error::validation_field(
            field,
            format!("must be at most {MAX_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

/// Partial profile update. Absent fields are left unchanged; an empty
/// string clears an optional text field.
#[derive(Clone, Default, PartialEq, Deserialize)]
pub struct UserUpdate {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New department.
    #[serde(default)]
    pub department: Option<String>,
    /// New student number.
    #[serde(default)]
    pub student_id: Option<String>,
    /// New biography.
    #[serde(default)]
    pub bio: Option<String>,
    /// New profile picture.
    #[serde(default)]
    pub avatar: Option<Attachment>,
    /// New role (admins only).
    #[serde(default)]
    pub role: Option<Role>,
    /// New password.
    #[serde(default)]
    pub password: Option<String>,
    /// Current password, required when users change their own password.
    #[serde(default)]
    pub current_password: Option<String>,
}

impl fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserUpdate")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration() -> NewUser {
        NewUser {
            name: "  Ada Lovelace ".to_string(),
            email: "Ada@Uni.edu".to_string(),
            password: "correct horse".to_string(),
            role: None,
            department: Some("  ".to_string()),
            student_id: Some("S-001".to_string()),
        }
    }

    #[test]
    fn test_normalize_registration() {
        let input = registration().normalize().unwrap();
        assert_eq!(input.name, "Ada Lovelace");
        assert_eq!(input.email, "ada@uni.edu");
        assert_eq!(input.department, None);
        assert_eq!(input.student_id, Some("S-001".to_string()));
    }

    #[test]
    fn test_short_password_rejected() {
        let mut input = registration();
        input.password = "short".to_string();
        assert!(input.normalize().is_err());
    }

    #[test]
    fn test_profile_has_no_password_hash() {
        let user = User::create(registration().normalize().unwrap(), "$argon2id$x".into(), Role::Student);
        let json = serde_json::to_value(user.profile()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "student");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let user = User::create(registration().normalize().unwrap(), "$argon2id$secret".into(), Role::Student);
        assert!(!format!("{user:?}").contains("secret"));

        let update = UserUpdate {
            password: Some("hunter22hunter".into()),
            ..Default::default()
        };
        assert!(!format!("{update:?}").contains("hunter"));
    }

    #[test]
    fn test_apply_update_clears_optional_fields() {
        let mut user = User::create(registration().normalize().unwrap(), "h".into(), Role::Student);
        let update = UserUpdate {
            name: Some("Ada King".into()),
            student_id: Some(String::new()),
            bio: Some("Analyst".into()),
            ..Default::default()
        };
        user.apply_update(&update).unwrap();
        assert_eq!(user.name, "Ada King");
        assert_eq!(user.student_id, None);
        assert_eq!(user.bio.as_deref(), Some("Analyst"));
    }

    #[test]
    fn test_apply_update_rejects_blank_name() {
        let mut user = User::create(registration().normalize().unwrap(), "h".into(), Role::Student);
        let update = UserUpdate {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert!(user.apply_update(&update).is_err());
    }
}
