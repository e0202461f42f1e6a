//! Storage layer
//!
//! Persists the catalog (JSON, source of truth) and the rendered Markdown
//! document. Both are overwritten wholesale with atomic writes.

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::{atomic_write, CatalogPersistence, DocumentFile};
