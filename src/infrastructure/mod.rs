// Core infrastructure modules
pub mod cache;            // Bounded LRU cache
pub mod doc_locks;        // Per-document write serialization
pub mod document_store;   // Document store interface
pub mod id_generator;     // Snowflake document ids
pub mod identity;         // Session verification and profile lookup
pub mod image_host;       // Image CDN client
pub mod mailer;           // Transactional email
pub mod middleware;       // Viewer context middleware and extractor
pub mod sqlite_store;     // SQLite document store
pub mod viewer;           // Viewer context

pub use cache::Cache;
pub use doc_locks::DocLocks;
pub use document_store::{
    DocQuery, DocumentStore, FieldValue, Filter, InsertOutcome, Mutation, Sort, StoredDocument,
};
pub use id_generator::DocIdGenerator;
pub use identity::{HttpIdentityProvider, Identity, IdentityProvider, ProfileAttributes};
pub use image_host::{CloudinaryHost, ImageHost, UploadOptions, UploadedImage};
pub use mailer::{mailer_from_config, EmailMessage, Mailer};
pub use sqlite_store::SqliteStore;
pub use viewer::ViewerContext;
