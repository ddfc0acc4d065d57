//! # hub-storage
//!
//! Document store for Project-HUB.
//!
//! Documents are JSON values grouped into named collections and addressed
//! by string id. The crate provides:
//! - [`DocumentStore`]: the raw, object-safe store trait
//! - [`Repository`]: typed access for anything implementing [`Document`]
//! - [`EmailIndex`]: the unique email to user mapping
//! - [`MemoryStore`]: in-process store for tests and ephemeral runs
//! - [`RedbStore`]: embedded, file-backed store

#![forbid(unsafe_code)]

pub mod error;
pub mod memory;
pub mod redb_store;
pub mod repository;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use redb_store::RedbStore;
pub use repository::{Document, EmailIndex, Repository};

use async_trait::async_trait;

/// A store of raw documents grouped into collections.
///
/// Every call is atomic on its own; there are no multi-document
/// transactions.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Fetches a document.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Vec<u8>>>;

    /// Stores a new document. Fails with [`Error::Conflict`] if `id` exists.
    async fn insert(&self, collection: &str, id: &str, bytes: Vec<u8>) -> Result<()>;

    /// Stores a document, replacing any previous version.
    async fn put(&self, collection: &str, id: &str, bytes: Vec<u8>) -> Result<()>;

    /// Removes a document, returning whether it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;

    /// Every document in a collection, in key order. A collection that was
    /// never written is empty.
    async fn list(&self, collection: &str) -> Result<Vec<Vec<u8>>>;

    /// Short backend name for health reports.
    fn backend_name(&self) -> &'static str;
}
