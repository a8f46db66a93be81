use std::sync::Arc;

use tracing::{error, info};

use super::{DatabaseError, Document, DocumentStore, MemoryStore, PostgresStore};
use crate::config::{DatabaseConfig, StorageBackend};
use crate::filter::{Filter, Update};

/// Storage handle shared by every request.
///
/// Created once at startup and closed explicitly on shutdown. Operations never
/// raise: failures are logged and reported as `None` or a zero count.
#[derive(Clone)]
pub struct DatabaseManager {
    store: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for DatabaseManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseManager")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let manager = match config.backend {
            StorageBackend::Postgres => Self::from_store(PostgresStore::connect(config).await?),
            StorageBackend::Memory => Self::in_memory(),
        };
        info!("Using {} storage backend", manager.backend_name());
        Ok(manager)
    }

    pub fn in_memory() -> Self {
        Self::from_store(MemoryStore::new())
    }

    pub fn from_store(store: impl DocumentStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Returns the inserted id
    pub async fn insert_one(&self, collection: &str, document: Document) -> Option<String> {
        self.store
            .insert_one(collection, document)
            .await
            .map_err(|e| error!("Error inserting document into {}: {}", collection, e))
            .ok()
    }

    /// Returns the inserted ids in input order
    pub async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Option<Vec<String>> {
        self.store
            .insert_many(collection, documents)
            .await
            .map_err(|e| error!("Error inserting documents into {}: {}", collection, e))
            .ok()
    }

    pub async fn find_one(&self, collection: &str, filter: &Filter) -> Option<Document> {
        self.store
            .find_one(collection, filter)
            .await
            .map_err(|e| error!("Error finding document in {}: {}", collection, e))
            .ok()
            .flatten()
    }

    /// `None` only on storage failure; no match is an empty list
    pub async fn find_all(&self, collection: &str, filter: &Filter) -> Option<Vec<Document>> {
        self.store
            .find_all(collection, filter)
            .await
            .map_err(|e| error!("Error finding documents in {}: {}", collection, e))
            .ok()
    }

    /// Returns the number of documents actually modified (0 or 1)
    pub async fn update_one(&self, collection: &str, filter: &Filter, update: &Update) -> u64 {
        self.store
            .update_one(collection, filter, update)
            .await
            .unwrap_or_else(|e| {
                error!("Error updating document in {}: {}", collection, e);
                0
            })
    }

    /// Returns the number of documents deleted (0 or 1)
    pub async fn delete_one(&self, collection: &str, filter: &Filter) -> u64 {
        self.store
            .delete_one(collection, filter)
            .await
            .unwrap_or_else(|e| {
                error!("Error deleting document in {}: {}", collection, e);
                0
            })
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.store.ping().await
    }

    pub async fn close(&self) {
        self.store.close().await;
    }
}
