//! Shared application state.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use hub_auth::{AuthConfig, AuthError, AuthenticatedUser};
use hub_auth_local::{LocalTokenIssuer, LocalTokenValidator, PasswordHasher};
use hub_core::{Project, Proposal, User};
use hub_media::{HttpMediaHost, MediaHost, MemoryMediaHost, UploadPolicy};
use hub_storage::{DocumentStore, EmailIndex, MemoryStore, RedbStore, Repository};

use crate::session::AccountValidator;
use crate::{ApiError, HubConfig, Result};

/// Everything a handler needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Raw store, for health reports.
    pub store: Arc<dyn DocumentStore>,
    /// User accounts.
    pub users: Repository<User>,
    /// Proposals.
    pub proposals: Repository<Proposal>,
    /// Projects.
    pub projects: Repository<Project>,
    /// Unique email index.
    pub emails: EmailIndex,
    /// Password hasher.
    pub hasher: PasswordHasher,
    /// Session token issuer.
    pub tokens: LocalTokenIssuer,
    /// Session validator used by the auth layer; resolves tokens to
    /// stored accounts.
    pub validator: Arc<AccountValidator>,
    /// Expected issuer and audience.
    pub auth_config: AuthConfig,
    /// Where uploads go.
    pub media: Arc<dyn MediaHost>,
    /// Upload limits.
    pub upload_policy: UploadPolicy,
    /// Root folder at the media host.
    pub media_folder: String,
    /// Upload request body limit.
    pub body_limit: usize,
    writes: Arc<Mutex<()>>,
}

impl AppState {
    /// Builds the state described by `config`: a redb or in-memory store
    /// and an HTTP or in-memory media host.
    pub fn from_config(config: &HubConfig) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn DocumentStore> = if config.storage.ephemeral {
            tracing::warn!("Running with ephemeral storage; data is lost on exit");
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(RedbStore::open(&config.storage.path)?)
        };

        let media: Arc<dyn MediaHost> = if config.uses_memory_media() {
            tracing::warn!("No media host configured; uploads are kept in memory");
            Arc::new(MemoryMediaHost::new())
        } else {
            Arc::new(HttpMediaHost::new(config.http_media_config())?)
        };

        Self::with_components(config, store, media, PasswordHasher::default())
    }

    /// Builds state around explicit components.
    ///
    /// An empty JWT secret in ephemeral mode is replaced by a random one.
    pub fn with_components(
        config: &HubConfig,
        store: Arc<dyn DocumentStore>,
        media: Arc<dyn MediaHost>,
        hasher: PasswordHasher,
    ) -> Result<Self> {
        let secret = if config.auth.jwt_secret.is_empty() && config.storage.ephemeral {
            tracing::warn!("Generated a throwaway JWT secret; sessions end on restart");
            format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
        } else {
            config.auth.jwt_secret.clone()
        };
        let auth_config = config.auth_config();
        let tokens = LocalTokenIssuer::new(secret.as_bytes(), auth_config.clone(), config.token_ttl())?;
        let users = Repository::new(store.clone());
        let validator = Arc::new(AccountValidator::new(
            LocalTokenValidator::new(secret.as_bytes())?,
            users.clone(),
        ));

        Ok(Self {
            users,
            proposals: Repository::new(store.clone()),
            projects: Repository::new(store.clone()),
            emails: EmailIndex::new(store.clone()),
            store,
            hasher,
            tokens,
            validator,
            auth_config,
            media,
            upload_policy: config.upload_policy(),
            media_folder: config.media.folder.clone(),
            body_limit: config.server.body_limit_bytes,
            writes: Arc::new(Mutex::new(())),
        })
    }

    /// Serialises read-modify-write cycles on stored documents.
    pub async fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    /// Loads the account behind a validated token.
    pub async fn current_user(&self, auth: &AuthenticatedUser) -> std::result::Result<User, ApiError> {
        self.users
            .get(auth.user_id)
            .await?
            .ok_or_else(|| AuthError::UnknownUser.into())
    }

    /// Hashes a password off the async runtime.
    pub async fn hash_password(&self, password: String) -> std::result::Result<String, ApiError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(ApiError::internal)?
            .map_err(ApiError::from)
    }

    /// Verifies a password off the async runtime.
    pub async fn verify_password(&self, password: String, hash: String) -> std::result::Result<bool, ApiError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(ApiError::internal)
    }
}

