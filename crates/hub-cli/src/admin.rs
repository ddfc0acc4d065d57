//! Account administration straight against the document store.
//!
//! Registration over HTTP never hands out the admin role, so the first
//! admin is created here.

use std::sync::Arc;

use hub_auth_local::PasswordHasher;
use hub_core::{NewUser, Role, User, UserProfile, UserUpdate};
use hub_storage::{DocumentStore, EmailIndex, Repository};

use crate::{Error, Result};

/// Account operations over one store.
pub struct Accounts {
    users: Repository<User>,
    emails: EmailIndex,
    hasher: PasswordHasher,
}

impl Accounts {
    /// Creates the service over `store`.
    pub fn new(store: Arc<dyn DocumentStore>, hasher: PasswordHasher) -> Self {
        Self {
            users: Repository::new(store.clone()),
            emails: EmailIndex::new(store),
            hasher,
        }
    }

    /// Creates an admin account.
    ///
    /// Input is validated like a registration; the email must be unused.
    pub async fn create_admin(&self, name: &str, email: &str, password: &str) -> Result<UserProfile> {
        let input = NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: None,
            department: None,
            student_id: None,
        }
        .normalize()?;

        let hash = self.hasher.hash(&input.password)?;
        let user = User::create(input, hash, Role::Admin);

        self.emails.claim(&user.email, user.id).await?;
        if let Err(err) = self.users.insert(&user).await {
            self.emails.release(&user.email).await?;
            return Err(err.into());
        }
        tracing::info!(user = %user.id, email = %user.email, "created admin account");
        Ok(user.profile())
    }

    /// Gives the account registered under `email` the admin role.
    pub async fn promote(&self, email: &str) -> Result<UserProfile> {
        let id = self
            .emails
            .lookup(email)
            .await?
            .ok_or_else(|| Error::UnknownAccount(email.trim().to_lowercase()))?;
        let mut user = self.users.require(id).await?;
        if user.role != Role::Admin {
            let previous = user.role;
            user.apply_update(&UserUpdate {
                role: Some(Role::Admin),
                ..UserUpdate::default()
            })?;
            self.users.save(&user).await?;
            tracing::info!(user = %user.id, from = %previous, "promoted account to admin");
        }
        Ok(user.profile())
    }
}
