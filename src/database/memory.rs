use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use super::{assign_id, unique_fields, DatabaseError, Document, DocumentStore, ID_FIELD};
use crate::filter::{Filter, Update};

/// Process-local store used in development and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be called under the write lock, after `assign_id`
    fn ensure_unique<'a>(
        collection: &str,
        document: &Document,
        existing: impl IntoIterator<Item = &'a Document>,
    ) -> Result<(), DatabaseError> {
        match existing.into_iter().find_map(|other| conflict(collection, document, other)) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn conflict(collection: &str, document: &Document, other: &Document) -> Option<DatabaseError> {
    if document.get(ID_FIELD) == other.get(ID_FIELD) {
        let id = document.get(ID_FIELD).and_then(Value::as_str).unwrap_or_default();
        return Some(DatabaseError::DuplicateId(id.to_string()));
    }
    unique_fields(collection).find_map(|field| match (document.get(field), other.get(field)) {
        (Some(value), Some(taken)) if value == taken && !value.is_null() => Some(DatabaseError::DuplicateKey(
            format!("{}.{} = {}", collection, field, value),
        )),
        _ => None,
    })
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<String, DatabaseError> {
        let id = assign_id(&mut document)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        Self::ensure_unique(collection, &document, docs.iter())?;
        docs.push(document);
        Ok(id)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, DatabaseError> {
        let mut prepared = Vec::with_capacity(documents.len());
        for mut document in documents {
            let id = assign_id(&mut document)?;
            prepared.push((id, document));
        }

        // All-or-nothing under a single write lock
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        for (i, (_, document)) in prepared.iter().enumerate() {
            let earlier = prepared[..i].iter().map(|(_, doc)| doc);
            Self::ensure_unique(collection, document, docs.iter().chain(earlier))?;
        }

        let mut ids = Vec::with_capacity(prepared.len());
        for (id, document) in prepared {
            docs.push(document);
            ids.push(id);
        }
        Ok(ids)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| filter.matches(doc)).cloned()))
    }

    async fn find_all(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<u64, DatabaseError> {
        update.validate()?;
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| filter.matches(doc)));

        match target {
            Some(doc) => Ok(u64::from(update.apply(doc))),
            None => Ok(0),
        }
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn close(&self) {
        let mut collections = self.collections.write().await;
        let count = collections.len();
        collections.clear();
        info!("Released in-memory store ({} collections)", count);
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
