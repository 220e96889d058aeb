// Campus Market - student marketplace backend

// HTTP API - router, handlers and extractors
pub mod api;

// Application state - injected store handle and services
pub mod app_state;

// Configuration loaded from the environment
pub mod config;

// Core types and primitives
pub mod core;

// Entities - plain data stored as documents
pub mod entities;

// Entity framework - typed collections over the document store
pub mod framework;

// Infrastructure - document store, identity, image host, mail, middleware
pub mod infrastructure;

// Request schemas validated at the boundary
pub mod schemas;

// Domain services
pub mod services;

// Common utilities
pub mod error;

// Re-exports for convenience
pub use app_state::AppState;
pub use error::{AppError, AppResult};
