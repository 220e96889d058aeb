// Entity Trait - typed access to one document collection
// Entities are plain serde data; the store keeps id, version and timestamps beside them

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::core::DocId;
use crate::error::{AppError, AppResult};
use crate::infrastructure::document_store::{
    DocQuery, DocumentStore, Filter, InsertOutcome, Mutation, StoredDocument,
};

/// Attempts made by `gen_modify` before giving up with `Conflict`
pub const MAX_WRITE_ATTEMPTS: usize = 5;

/// An entity together with its store-managed metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: DocId,
    #[serde(skip)]
    pub version: i64,
    #[serde(flatten)]
    pub data: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Sized + 'static {
    /// Collection holding documents of this type
    const COLLECTION: &'static str;

    /// Human-readable name used in error messages
    const ENTITY_NAME: &'static str;

    fn from_document(doc: StoredDocument) -> AppResult<Record<Self>> {
        let data = serde_json::from_value(doc.data).map_err(|e| {
            AppError::Internal(format!(
                "Stored {} {} is malformed: {}",
                Self::ENTITY_NAME,
                doc.id,
                e
            ))
        })?;

        Ok(Record {
            id: doc.id,
            version: doc.version,
            data,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }

    fn to_document_value(&self) -> AppResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn not_found(id: DocId) -> AppError {
        AppError::NotFound(format!("{} {} not found", Self::ENTITY_NAME, id))
    }

    /// Load with a nullable id - `None` if absent
    async fn gen_nullable(
        store: &dyn DocumentStore,
        id: Option<DocId>,
    ) -> AppResult<Option<Record<Self>>> {
        match id {
            Some(id) => store
                .get(Self::COLLECTION, id)
                .await?
                .map(Self::from_document)
                .transpose(),
            None => Ok(None),
        }
    }

    /// Load or fail with `NotFound`
    async fn gen_enforce(store: &dyn DocumentStore, id: DocId) -> AppResult<Record<Self>> {
        Self::gen_nullable(store, Some(id))
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Batch load; ids with no document are simply absent from the map
    async fn load_many(
        store: &dyn DocumentStore,
        ids: &[DocId],
    ) -> AppResult<HashMap<DocId, Record<Self>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut unique: Vec<DocId> = ids.to_vec();
        unique.sort();
        unique.dedup();

        let docs = store
            .find(Self::COLLECTION, &DocQuery::filtered(vec![Filter::IdIn(unique)]))
            .await?;

        docs.into_iter()
            .map(|doc| Self::from_document(doc).map(|record| (record.id, record)))
            .collect()
    }

    async fn gen_where(store: &dyn DocumentStore, query: &DocQuery) -> AppResult<Vec<Record<Self>>> {
        store
            .find(Self::COLLECTION, query)
            .await?
            .into_iter()
            .map(Self::from_document)
            .collect()
    }

    async fn count_where(store: &dyn DocumentStore, filters: &[Filter]) -> AppResult<u64> {
        store.count(Self::COLLECTION, filters).await
    }

    /// Insert a new document; `None` when a unique index already holds one of its values
    async fn insert_new(
        store: &dyn DocumentStore,
        id: DocId,
        data: Self,
    ) -> AppResult<Option<Record<Self>>> {
        match store
            .insert(Self::COLLECTION, id, data.to_document_value()?)
            .await?
        {
            InsertOutcome::Inserted(doc) => Ok(Some(Record {
                id: doc.id,
                version: doc.version,
                data,
                created_at: doc.created_at,
                updated_at: doc.updated_at,
            })),
            InsertOutcome::Duplicate => Ok(None),
        }
    }

    /// Single-statement conditional update; `None` when the conditions did not hold
    async fn update_where(
        store: &dyn DocumentStore,
        id: DocId,
        conditions: &[Filter],
        mutations: &[Mutation],
    ) -> AppResult<Option<Record<Self>>> {
        store
            .update_where(Self::COLLECTION, id, conditions, mutations)
            .await?
            .map(Self::from_document)
            .transpose()
    }

    /// Read-modify-write guarded by the document version, retried on
    /// concurrent modification. Errors from `apply` abort without writing.
    async fn gen_modify<F>(
        store: &dyn DocumentStore,
        id: DocId,
        mut apply: F,
    ) -> AppResult<Record<Self>>
    where
        F: FnMut(&mut Self) -> AppResult<()> + Send,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut record = Self::gen_enforce(store, id).await?;
            apply(&mut record.data)?;

            let value = record.data.to_document_value()?;
            match store
                .replace(Self::COLLECTION, id, record.version, value)
                .await?
            {
                Some(doc) => return Self::from_document(doc),
                None => {
                    tracing::debug!(
                        collection = Self::COLLECTION,
                        id = %id,
                        attempt,
                        "concurrent modification, retrying"
                    );
                }
            }
        }

        Err(AppError::Conflict(format!(
            "{} {} is being modified concurrently, try again",
            Self::ENTITY_NAME,
            id
        )))
    }

    async fn delete(store: &dyn DocumentStore, id: DocId) -> AppResult<bool> {
        store.delete(Self::COLLECTION, id).await
    }
}
