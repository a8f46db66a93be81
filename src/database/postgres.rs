use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::{PgPool, Postgres, Row};
use tracing::info;

use super::{assign_id, DatabaseError, Document, DocumentStore, UNIQUE_KEYS};
use crate::config::DatabaseConfig;
use crate::filter::{Filter, SqlParam, Update};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS documents (
    seq BIGSERIAL,
    id TEXT PRIMARY KEY,
    collection TEXT NOT NULL,
    body JSONB NOT NULL
)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS documents_collection_seq_idx ON documents (collection, seq)";

fn unique_index_sql(collection: &str, field: &str) -> String {
    format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS documents_{collection}_{field}_key \
         ON documents ((body ->> '{field}')) WHERE collection = '{collection}'"
    )
}

type PgQuery<'q> = sqlx::query::Query<'q, Postgres, PgArguments>;

/// Documents stored as JSONB rows in a single `documents` table
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let connection_string = config.connection_url()?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&connection_string)
            .await?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        info!("Connected to database: {}", config.name);
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        for (collection, field) in UNIQUE_KEYS {
            sqlx::query(&unique_index_sql(collection, field))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    /// `WHERE` clause scoped to a collection; `$1` is the collection name
    fn scoped(filter: &Filter) -> (String, Vec<SqlParam>) {
        let sql = filter.to_sql(2);
        (format!("collection = $1 AND {}", sql.clause), sql.params)
    }
}

fn bind_param<'q>(q: PgQuery<'q>, param: &SqlParam) -> PgQuery<'q> {
    match param {
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Json(v) => q.bind(v.clone()),
    }
}

fn into_document(body: Value) -> Result<Document, DatabaseError> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::InvalidDocument(format!(
            "stored body is not an object: {}",
            other
        ))),
    }
}

fn map_insert_error(err: sqlx::Error, id: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => match db_err.constraint() {
            Some(constraint) if constraint != "documents_pkey" => {
                DatabaseError::DuplicateKey(constraint.to_string())
            }
            _ => DatabaseError::DuplicateId(id.to_string()),
        },
        _ => DatabaseError::Sqlx(err),
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<String, DatabaseError> {
        let id = assign_id(&mut document)?;
        sqlx::query("INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3)")
            .bind(id.clone())
            .bind(collection.to_string())
            .bind(Value::Object(document))
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, &id))?;
        Ok(id)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<Vec<String>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(documents.len());
        for mut document in documents {
            let id = assign_id(&mut document)?;
            sqlx::query("INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3)")
                .bind(id.clone())
                .bind(collection.to_string())
                .bind(Value::Object(document))
                .execute(&mut *tx)
                .await
                .map_err(|e| map_insert_error(e, &id))?;
            ids.push(id);
        }
        tx.commit().await?;
        Ok(ids)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, DatabaseError> {
        let (clause, params) = Self::scoped(filter);
        let sql = format!("SELECT body FROM documents WHERE {} ORDER BY seq LIMIT 1", clause);

        let mut q = sqlx::query(&sql).bind(collection.to_string());
        for p in &params {
            q = bind_param(q, p);
        }

        match q.fetch_optional(&self.pool).await? {
            Some(row) => Ok(Some(into_document(row.try_get("body")?)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, DatabaseError> {
        let (clause, params) = Self::scoped(filter);
        let sql = format!("SELECT body FROM documents WHERE {} ORDER BY seq", clause);

        let mut q = sqlx::query(&sql).bind(collection.to_string());
        for p in &params {
            q = bind_param(q, p);
        }

        q.fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| into_document(row.try_get("body")?))
            .collect()
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<u64, DatabaseError> {
        update.validate()?;
        let (clause, params) = Self::scoped(filter);
        let sql = format!(
            "SELECT id, body FROM documents WHERE {} ORDER BY seq LIMIT 1 FOR UPDATE",
            clause
        );

        let mut tx = self.pool.begin().await?;
        let mut q = sqlx::query(&sql).bind(collection.to_string());
        for p in &params {
            q = bind_param(q, p);
        }

        let Some(row) = q.fetch_optional(&mut *tx).await? else {
            return Ok(0);
        };
        let id: String = row.try_get("id")?;
        let mut document = into_document(row.try_get("body")?)?;

        if !update.apply(&mut document) {
            return Ok(0);
        }

        sqlx::query("UPDATE documents SET body = $1 WHERE id = $2")
            .bind(Value::Object(document))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, DatabaseError> {
        let (clause, params) = Self::scoped(filter);
        let sql = format!(
            "DELETE FROM documents WHERE id = (SELECT id FROM documents WHERE {} ORDER BY seq LIMIT 1)",
            clause
        );

        let mut q = sqlx::query(&sql).bind(collection.to_string());
        for p in &params {
            q = bind_param(q, p);
        }
        Ok(q.execute(&self.pool).await?.rows_affected())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
