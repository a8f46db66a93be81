use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use super::{DatabaseManager, Document};
use crate::filter::{Filter, Update};

/// Typed view over one collection.
///
/// Serialization problems are treated like storage failures: logged, then
/// reported through the same `None` / zero sentinels.
pub struct Repository<T> {
    collection: &'static str,
    db: DatabaseManager,
    _phantom: PhantomData<T>,
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(collection: &'static str, db: DatabaseManager) -> Self {
        Self {
            collection,
            db,
            _phantom: PhantomData,
        }
    }

    fn to_document(&self, record: &T) -> Option<Document> {
        match serde_json::to_value(record) {
            Ok(Value::Object(map)) => Some(map),
            Ok(other) => {
                error!("Record for {} is not an object: {}", self.collection, other);
                None
            }
            Err(e) => {
                error!("Failed to serialize record for {}: {}", self.collection, e);
                None
            }
        }
    }

    fn from_document(&self, document: Document) -> Option<T> {
        serde_json::from_value(Value::Object(document))
            .map_err(|e| error!("Malformed document in {}: {}", self.collection, e))
            .ok()
    }

    pub async fn insert_one(&self, record: &T) -> Option<String> {
        let document = self.to_document(record)?;
        self.db.insert_one(self.collection, document).await
    }

    pub async fn insert_many(&self, records: &[T]) -> Option<Vec<String>> {
        let documents = records
            .iter()
            .map(|r| self.to_document(r))
            .collect::<Option<Vec<_>>>()?;
        self.db.insert_many(self.collection, documents).await
    }

    pub async fn find_one(&self, filter: &Filter) -> Option<T> {
        let document = self.db.find_one(self.collection, filter).await?;
        self.from_document(document)
    }

    /// `None` on storage failure or if any stored document is malformed
    pub async fn find_all(&self, filter: &Filter) -> Option<Vec<T>> {
        self.db
            .find_all(self.collection, filter)
            .await?
            .into_iter()
            .map(|doc| self.from_document(doc))
            .collect()
    }

    pub async fn update_one(&self, filter: &Filter, update: &Update) -> u64 {
        self.db.update_one(self.collection, filter, update).await
    }

    pub async fn delete_one(&self, filter: &Filter) -> u64 {
        self.db.delete_one(self.collection, filter).await
    }
}
