use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{QueryBuilder, Row};
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::core::strong_types::{is_collection_name, is_field_name};
use crate::core::DocId;
use crate::error::{AppError, AppResult};
use crate::infrastructure::document_store::{
    DocQuery, DocumentStore, FieldValue, Filter, InsertOutcome, Mutation, Sort, StoredDocument,
};

const DOCUMENT_COLUMNS: &str = "id, collection, data, version, created_at, updated_at";

/// SQLite implementation of the document store; documents live as JSON text
/// and are queried through the JSON1 functions
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database named by the config
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| AppError::Internal(format!("Invalid DATABASE_URL: {}", e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(config.acquire_timeout_secs));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to connect to SQLite: {}", e)))?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// In-memory store for tests; a single pinned connection keeps the data alive
    pub async fn new_in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::Internal(format!("Invalid in-memory options: {}", e)))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::Upstream(format!("Failed to connect to in-memory SQLite: {}", e))
            })?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    pub async fn initialize(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id INTEGER NOT NULL,
                data TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to create documents table: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection_created ON documents(collection, created_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Upstream(format!("Failed to create documents index: {}", e)))?;

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn json_path(field: &str) -> AppResult<String> {
    if !is_field_name(field) {
        return Err(AppError::Internal(format!("Invalid field name '{}'", field)));
    }
    Ok(format!("$.{}", field))
}

fn push_extract(qb: &mut QueryBuilder<'_, Sqlite>, field: &str) -> AppResult<()> {
    let path = json_path(field)?;
    qb.push("json_extract(data, ");
    qb.push_bind(path);
    qb.push(")");
    Ok(())
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &FieldValue) {
    match value {
        FieldValue::Text(v) => qb.push_bind(v.clone()),
        FieldValue::Int(v) => qb.push_bind(*v),
        FieldValue::Float(v) => qb.push_bind(*v),
        FieldValue::Bool(v) => qb.push_bind(*v),
    };
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &Filter) -> AppResult<()> {
    match filter {
        Filter::Eq(field, value) => {
            push_extract(qb, field)?;
            qb.push(" = ");
            push_value(qb, value);
        }
        Filter::Gte(field, value) => {
            push_extract(qb, field)?;
            qb.push(" >= ");
            qb.push_bind(*value);
        }
        Filter::Lte(field, value) => {
            push_extract(qb, field)?;
            qb.push(" <= ");
            qb.push_bind(*value);
        }
        Filter::ContainsCi(field, needle) => {
            qb.push("instr(lower(");
            push_extract(qb, field)?;
            qb.push("), lower(");
            qb.push_bind(needle.clone());
            qb.push(")) > 0");
        }
        Filter::IdIn(ids) => {
            if ids.is_empty() {
                qb.push("0 = 1");
            } else {
                qb.push("id IN (");
                let mut separated = qb.separated(", ");
                for id in ids {
                    separated.push_bind(id.value());
                }
                separated.push_unseparated(")");
            }
        }
        Filter::UnderCapacity { count, capacity } => {
            qb.push("(COALESCE(");
            push_extract(qb, capacity)?;
            qb.push(", 0) <= 0 OR COALESCE(");
            push_extract(qb, count)?;
            qb.push(", 0) < ");
            push_extract(qb, capacity)?;
            qb.push(")");
        }
    }
    Ok(())
}

/// Renders mutations as nested JSON1 calls over the current `data` column:
/// `json_set(json_remove(data, ?), ?, json(?))` and so on
fn push_mutations(qb: &mut QueryBuilder<'_, Sqlite>, mutations: &[Mutation]) -> AppResult<()> {
    for mutation in mutations.iter().rev() {
        match mutation {
            Mutation::Set(..) | Mutation::Inc(..) => qb.push("json_set("),
            Mutation::Unset(_) => qb.push("json_remove("),
        };
    }
    qb.push("data");

    for mutation in mutations {
        match mutation {
            Mutation::Set(field, value) => {
                let path = json_path(field)?;
                let text = serde_json::to_string(value)?;
                qb.push(", ");
                qb.push_bind(path);
                qb.push(", json(");
                qb.push_bind(text);
                qb.push("))");
            }
            Mutation::Inc(field, delta) => {
                let path = json_path(field)?;
                qb.push(", ");
                qb.push_bind(path.clone());
                qb.push(", COALESCE(json_extract(data, ");
                qb.push_bind(path);
                qb.push("), 0) + ");
                qb.push_bind(*delta);
                qb.push(")");
            }
            Mutation::Unset(field) => {
                let path = json_path(field)?;
                qb.push(", ");
                qb.push_bind(path);
                qb.push(")");
            }
        }
    }
    Ok(())
}

fn millis_to_datetime(millis: i64) -> AppResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::Internal(format!("Invalid stored timestamp {}", millis)))
}

fn row_to_document(row: &SqliteRow) -> AppResult<StoredDocument> {
    let data: String = row.try_get("data")?;
    Ok(StoredDocument {
        id: DocId::new(row.try_get("id")?),
        collection: row.try_get("collection")?,
        data: serde_json::from_str(&data)?,
        version: row.try_get("version")?,
        created_at: millis_to_datetime(row.try_get("created_at")?)?,
        updated_at: millis_to_datetime(row.try_get("updated_at")?)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn ensure_unique_index(&self, collection: &str, field: &str) -> AppResult<()> {
        if !is_collection_name(collection) || !is_field_name(field) {
            return Err(AppError::Internal(format!(
                "Invalid unique index {}.{}",
                collection, field
            )));
        }

        // DDL cannot take bound parameters; both names were validated above
        let ddl = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS ux_{collection}_{field} \
             ON documents(json_extract(data, '$.{field}')) \
             WHERE collection = '{collection}' AND json_extract(data, '$.{field}') <> ''",
        );
        sqlx::query(&ddl).execute(&self.pool).await.map_err(|e| {
            AppError::Upstream(format!(
                "Failed to create unique index on {}.{}: {}",
                collection, field, e
            ))
        })?;
        Ok(())
    }

    async fn insert(&self, collection: &str, id: DocId, data: Value) -> AppResult<InsertOutcome> {
        let now = Utc::now().timestamp_millis();
        let text = serde_json::to_string(&data)?;

        let result = sqlx::query(
            "INSERT INTO documents (collection, id, data, version, created_at, updated_at) VALUES (?, ?, ?, 1, ?, ?)",
        )
        .bind(collection)
        .bind(id.value())
        .bind(text)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                let created_at = millis_to_datetime(now)?;
                Ok(InsertOutcome::Inserted(StoredDocument {
                    id,
                    collection: collection.to_string(),
                    data,
                    version: 1,
                    created_at,
                    updated_at: created_at,
                }))
            }
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(AppError::Upstream(format!(
                "Failed to insert into {}: {}",
                collection, e
            ))),
        }
    }

    async fn get(&self, collection: &str, id: DocId) -> AppResult<Option<StoredDocument>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE collection = ? AND id = ?",
            DOCUMENT_COLUMNS
        ))
        .bind(collection)
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn find(&self, collection: &str, query: &DocQuery) -> AppResult<Vec<StoredDocument>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM documents WHERE collection = ",
            DOCUMENT_COLUMNS
        ));
        qb.push_bind(collection.to_string());
        for filter in &query.filters {
            qb.push(" AND ");
            push_filter(&mut qb, filter)?;
        }

        match &query.sort {
            Sort::NewestFirst => {
                qb.push(" ORDER BY created_at DESC, id DESC");
            }
            Sort::Field { name, ascending } => {
                qb.push(" ORDER BY ");
                push_extract(&mut qb, name)?;
                qb.push(if *ascending { " ASC" } else { " DESC" });
                qb.push(", id ASC");
            }
        }

        match query.limit {
            Some(limit) => {
                qb.push(" LIMIT ");
                qb.push_bind(limit as i64);
                qb.push(" OFFSET ");
                qb.push_bind(query.skip as i64);
            }
            None if query.skip > 0 => {
                qb.push(" LIMIT -1 OFFSET ");
                qb.push_bind(query.skip as i64);
            }
            None => {}
        }

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_document).collect()
    }

    async fn count(&self, collection: &str, filters: &[Filter]) -> AppResult<u64> {
        let mut qb =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM documents WHERE collection = ");
        qb.push_bind(collection.to_string());
        for filter in filters {
            qb.push(" AND ");
            push_filter(&mut qb, filter)?;
        }

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn replace(
        &self,
        collection: &str,
        id: DocId,
        expected_version: i64,
        data: Value,
    ) -> AppResult<Option<StoredDocument>> {
        let now = Utc::now().timestamp_millis();
        let text = serde_json::to_string(&data)?;

        let result = sqlx::query(&format!(
            "UPDATE documents SET data = ?, version = version + 1, updated_at = ? \
             WHERE collection = ? AND id = ? AND version = ? RETURNING {}",
            DOCUMENT_COLUMNS
        ))
        .bind(text)
        .bind(now)
        .bind(collection)
        .bind(id.value())
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(row) => row.as_ref().map(row_to_document).transpose(),
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
                "Update of {} {} violates a unique constraint",
                collection, id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_where(
        &self,
        collection: &str,
        id: DocId,
        conditions: &[Filter],
        mutations: &[Mutation],
    ) -> AppResult<Option<StoredDocument>> {
        let now = Utc::now().timestamp_millis();

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE documents SET data = ");
        push_mutations(&mut qb, mutations)?;
        qb.push(", version = version + 1, updated_at = ");
        qb.push_bind(now);
        qb.push(" WHERE collection = ");
        qb.push_bind(collection.to_string());
        qb.push(" AND id = ");
        qb.push_bind(id.value());
        for condition in conditions {
            qb.push(" AND ");
            push_filter(&mut qb, condition)?;
        }
        qb.push(" RETURNING ");
        qb.push(DOCUMENT_COLUMNS);

        let row = qb.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_document).transpose()
    }

    async fn delete(&self, collection: &str, id: DocId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id.value())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Upstream(format!("Database health check failed: {}", e)))?;
        Ok(())
    }
}
