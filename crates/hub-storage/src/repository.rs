//! Typed access to stored documents.

use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use hub_core::{Project, Proposal, User, UserId};

use crate::{DocumentStore, Error, Result};

/// A type stored as a JSON document in its own collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name.
    const COLLECTION: &'static str;

    /// Kind name used in not-found errors.
    const KIND: &'static str;

    /// The document's id within its collection.
    fn key(&self) -> String;
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const KIND: &'static str = "user";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl Document for Proposal {
    const COLLECTION: &'static str = "proposals";
    const KIND: &'static str = "proposal";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

impl Document for Project {
    const COLLECTION: &'static str = "projects";
    const KIND: &'static str = "project";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Typed view over one collection of a [`DocumentStore`].
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> Repository<T> {
    /// Creates a repository over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Fetches a document by id.
    pub async fn get(&self, id: impl Display) -> Result<Option<T>> {
        match self.store.get(T::COLLECTION, &id.to_string()).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Fetches a document by id, failing with [`Error::NotFound`] if absent.
    pub async fn require(&self, id: impl Display) -> Result<T> {
        let id = id.to_string();
        self.get(&id).await?.ok_or(Error::NotFound { kind: T::KIND, id })
    }

    /// Stores a new document, failing with [`Error::Conflict`] if its id
    /// is taken.
    pub async fn insert(&self, doc: &T) -> Result<()> {
        let bytes = serde_json::to_vec(doc)?;
        self.store.insert(T::COLLECTION, &doc.key(), bytes).await
    }

    /// Stores a document, replacing the previous version.
    pub async fn save(&self, doc: &T) -> Result<()> {
        let bytes = serde_json::to_vec(doc)?;
        self.store.put(T::COLLECTION, &doc.key(), bytes).await
    }

    /// Removes a document, returning whether it existed.
    pub async fn delete(&self, id: impl Display) -> Result<bool> {
        self.store.delete(T::COLLECTION, &id.to_string()).await
    }

    /// Every document in the collection.
    pub async fn list(&self) -> Result<Vec<T>> {
        self.store
            .list(T::COLLECTION)
            .await?
            .iter()
            .map(|bytes| serde_json::from_slice(bytes).map_err(Error::from))
            .collect()
    }

    /// Every document matching `predicate`.
    pub async fn find<F>(&self, predicate: F) -> Result<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        let mut docs = self.list().await?;
        docs.retain(|doc| predicate(doc));
        Ok(docs)
    }

    /// The first document matching `predicate`.
    pub async fn find_one<F>(&self, predicate: F) -> Result<Option<T>>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.list().await?.into_iter().find(|doc| predicate(doc)))
    }
}

/// Unique mapping from lowercase email to user id.
///
/// Kept in its own collection so claiming an address is a single atomic
/// insert.
#[derive(Clone)]
pub struct EmailIndex {
    store: Arc<dyn DocumentStore>,
}

impl EmailIndex {
    const COLLECTION: &'static str = "user_emails";

    /// Creates an index over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Claims `email` for `user`; fails with [`Error::EmailTaken`] if
    /// another account holds it.
    pub async fn claim(&self, email: &str, user: UserId) -> Result<()> {
        let email = Self::normalize(email);
        match self
            .store
            .insert(Self::COLLECTION, &email, user.to_string().into_bytes())
            .await
        {
            Err(Error::Conflict { .. }) => Err(Error::EmailTaken(email)),
            other => other,
        }
    }

    /// The user holding `email`, if any.
    pub async fn lookup(&self, email: &str) -> Result<Option<UserId>> {
        let Some(bytes) = self.store.get(Self::COLLECTION, &Self::normalize(email)).await? else {
            return Ok(None);
        };
        let raw = String::from_utf8(bytes).map_err(Error::backend)?;
        raw.parse().map(Some).map_err(Error::backend)
    }

    /// Releases `email`, returning whether it was claimed.
    pub async fn release(&self, email: &str) -> Result<bool> {
        self.store
            .delete(Self::COLLECTION, &Self::normalize(email))
            .await
    }
}
