pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::filter::{Filter, FilterError, Update};

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use repository::Repository;

/// A stored JSON object; its identifier lives under [`ID_FIELD`]
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "_id";

/// `(collection, field)` pairs whose values are unique within the collection
pub const UNIQUE_KEYS: &[(&str, &str)] = &[
    (models::USER_COLLECTION, "user"),
    (models::CART_COLLECTION, "user"),
];

pub fn unique_fields(collection: &str) -> impl Iterator<Item = &'static str> + '_ {
    UNIQUE_KEYS
        .iter()
        .filter(move |(c, _)| *c == collection)
        .map(|(_, field)| *field)
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(#[from] url::ParseError),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Duplicate document id: {0}")]
    DuplicateId(String),

    #[error("Duplicate unique key: {0}")]
    DuplicateKey(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Collection-oriented document storage.
///
/// Implementations must be safe to share across request tasks.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert and return the document id
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, DatabaseError>;

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, DatabaseError>;

    /// First matching document in insertion order
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError>;

    async fn find_all(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError>;

    /// Apply `update` to the first matching document; returns the modified count
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<u64, DatabaseError>;

    /// Returns the deleted count
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn close(&self);

    fn backend_name(&self) -> &'static str;
}

/// Ensure the document carries a string `_id`, generating a v4 UUID when absent.
pub fn assign_id(document: &mut Document) -> Result<String, DatabaseError> {
    match document.get(ID_FIELD) {
        Some(Value::String(id)) => Ok(id.clone()),
        None | Some(Value::Null) => {
            let id = Uuid::new_v4().to_string();
            document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            Ok(id)
        }
        Some(other) => Err(DatabaseError::InvalidDocument(format!(
            "{} must be a string, got {}",
            ID_FIELD, other
        ))),
    }
}
