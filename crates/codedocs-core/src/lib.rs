//! codedocs Core Library
//!
//! This crate keeps a JSON catalog of documented functions and components and
//! a Markdown document generated from it. Hand edits to the document survive:
//! each new or changed entry is spliced into its section rather than
//! rewriting the file.
//!
//! # Architecture
//!
//! - **Catalog**: Source of truth, persisted as JSON
//! - **Document**: Derived Markdown, updated block by block
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open()?;
//!
//! let entry = Entry::function("add")
//!     .with_description("Adds two numbers.")
//!     .with_attribute("a", "first")
//!     .with_usage("add(1, 2)");
//! store.apply(entry)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: Entries and their kinds
//! - `catalog`: Keyed collection of entries
//! - `render`: Canonical Markdown for entries
//! - `markdown`: Line tokenizer and block merger
//! - `classify`: Client for the documentation generation service
//! - `storage`: Atomic file persistence
//! - `config`: Application configuration

pub mod catalog;
pub mod classify;
pub mod config;
pub mod markdown;
pub mod models;
pub mod render;
pub mod storage;
pub mod store;

pub use catalog::{Catalog, Upsert};
pub use classify::{ClassifierClient, ClassifyError, Language};
pub use config::{Config, Strategy};
pub use models::{Entry, EntryFields, Kind, ModelError};
pub use storage::StorageError;
pub use store::{ApplyOutcome, SharedStore, Store, StoreStats};
