//! Embedded, file-backed document store on top of redb.
//!
//! Each collection is a redb table keyed by document id. redb calls are
//! blocking, so every operation runs on tokio's blocking pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use redb::backends::InMemoryBackend;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, TableError};

use crate::{DocumentStore, Error, Result};

fn table(collection: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(collection)
}

/// A [`DocumentStore`] persisted in a single redb database file.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").field("path", &self.path).finish()
    }
}

impl RedbStore {
    /// Opens (or creates) the database at `path`, creating parent
    /// directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(Error::backend)?;
        log::info!("Opened document store at {}", path.display());
        Ok(Self {
            db: Arc::new(db),
            path: Some(path.to_path_buf()),
        })
    }

    /// Creates a database that lives only in memory.
    pub fn in_memory() -> Result<Self> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(Error::backend)?;
        Ok(Self {
            db: Arc::new(db),
            path: None,
        })
    }

    /// Database file path, if file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn blocking<F, R>(&self, op: F) -> Result<R>
    where
        F: FnOnce(&Database) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| Error::Backend(format!("storage task failed: {e}")))?
    }
}

#[async_trait]
impl DocumentStore for RedbStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Vec<u8>>> {
        let (collection, id) = (collection.to_string(), id.to_string());
        self.blocking(move |db| {
            let txn = db.begin_read().map_err(Error::backend)?;
            let docs = match txn.open_table(table(&collection)) {
                Ok(docs) => docs,
                Err(TableError::TableDoesNotExist(_)) => return Ok(None),
                Err(e) => return Err(Error::backend(e)),
            };
            let value = docs.get(id.as_str()).map_err(Error::backend)?;
            Ok(value.map(|guard| guard.value().to_vec()))
        })
        .await
    }

    async fn insert(&self, collection: &str, id: &str, bytes: Vec<u8>) -> Result<()> {
        let (collection, id) = (collection.to_string(), id.to_string());
        self.blocking(move |db| {
            let txn = db.begin_write().map_err(Error::backend)?;
            let exists = {
                let mut docs = txn.open_table(table(&collection)).map_err(Error::backend)?;
                let exists = docs.get(id.as_str()).map_err(Error::backend)?.is_some();
                if !exists {
                    docs.insert(id.as_str(), bytes.as_slice())
                        .map_err(Error::backend)?;
                }
                exists
            };
            if exists {
                txn.abort().map_err(Error::backend)?;
                return Err(Error::Conflict { collection, id });
            }
            txn.commit().map_err(Error::backend)
        })
        .await
    }

    async fn put(&self, collection: &str, id: &str, bytes: Vec<u8>) -> Result<()> {
        let (collection, id) = (collection.to_string(), id.to_string());
        self.blocking(move |db| {
            let txn = db.begin_write().map_err(Error::backend)?;
            {
                let mut docs = txn.open_table(table(&collection)).map_err(Error::backend)?;
                docs.insert(id.as_str(), bytes.as_slice())
                    .map_err(Error::backend)?;
            }
            txn.commit().map_err(Error::backend)
        })
        .await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let (collection, id) = (collection.to_string(), id.to_string());
        self.blocking(move |db| {
            let txn = db.begin_write().map_err(Error::backend)?;
            let removed = {
                let mut docs = txn.open_table(table(&collection)).map_err(Error::backend)?;
                docs.remove(id.as_str()).map_err(Error::backend)?.is_some()
            };
            txn.commit().map_err(Error::backend)?;
            Ok(removed)
        })
        .await
    }

    async fn list(&self, collection: &str) -> Result<Vec<Vec<u8>>> {
        let collection = collection.to_string();
        self.blocking(move |db| {
            let txn = db.begin_read().map_err(Error::backend)?;
            let docs = match txn.open_table(table(&collection)) {
                Ok(docs) => docs,
                Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
                Err(e) => return Err(Error::backend(e)),
            };
            let mut out = Vec::new();
            for entry in docs.iter().map_err(Error::backend)? {
                let (_id, value) = entry.map_err(Error::backend)?;
                out.push(value.value().to_vec());
            }
            Ok(out)
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "redb"
    }
}
