//! Unified storage interface
//!
//! The `Store` owns the catalog and keeps the Markdown document in step with
//! it. Applying an entry is one sequence:
//!
//! 1. Validate and upsert into the in-memory catalog
//! 2. Persist the catalog
//! 3. Update the document (splice the entry or regenerate, per config)
//! 4. Persist the document
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open()?;
//!
//! let entry = Entry::function("add").with_usage("add(1, 2)");
//! store.apply(entry)?;
//!
//! let functions = store.entries(Kind::Function);
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use crate::catalog::{Catalog, Upsert};
use crate::config::{Config, Strategy};
use crate::markdown::merge;
use crate::models::{Entry, Kind};
use crate::render::{render, render_document};
use crate::storage::{CatalogPersistence, DocumentFile};

/// What `Store::apply` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub kind: Kind,
    pub name: String,
    /// The entry was new rather than a replacement
    pub created: bool,
    /// The document file was rewritten
    pub document_changed: bool,
}

/// File and content summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub catalog_exists: bool,
    pub document_exists: bool,
    pub functions: usize,
    pub components: usize,
}

/// Catalog plus the document derived from it
pub struct Store {
    catalog: Catalog,
    catalog_file: CatalogPersistence,
    document: DocumentFile,
    config: Config,
}

impl Store {
    /// Open the store using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the store with a specific configuration
    ///
    /// A missing catalog file is created empty; the document is only read
    /// when an entry is applied.
    pub fn open_with_config(config: Config) -> Result<Self> {
        let catalog_file = CatalogPersistence::new(config.catalog_path());
        let catalog = catalog_file
            .load_or_create()
            .context("Failed to load or create catalog")?;
        let document = DocumentFile::new(config.document_path());

        debug!(
            "Opened store: {} functions, {} components",
            catalog.count(Kind::Function),
            catalog.count(Kind::Component)
        );

        Ok(Self {
            catalog,
            catalog_file,
            document,
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_path(&self) -> &Path {
        self.catalog_file.path()
    }

    pub fn document_path(&self) -> &Path {
        self.document.path()
    }

    /// Entries of one kind, in catalog order
    pub fn entries(&self, kind: Kind) -> Vec<&Entry> {
        self.catalog.entries(kind)
    }

    /// Look up an entry
    pub fn get(&self, kind: Kind, name: &str) -> Option<&Entry> {
        self.catalog.get(kind, name)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            catalog_exists: self.catalog_file.exists(),
            document_exists: self.document.exists(),
            functions: self.catalog.count(Kind::Function),
            components: self.catalog.count(Kind::Component),
        }
    }

    /// Add or replace an entry and update the document
    ///
    /// A malformed entry is rejected before anything changes. If persisting
    /// the catalog fails, the in-memory catalog keeps the entry and the next
    /// successful save writes it out.
    pub fn apply(&mut self, entry: Entry) -> Result<ApplyOutcome> {
        entry.validate()?;

        let kind = entry.kind;
        let name = entry.name.clone();
        let block = render(&entry);

        let upsert = self.catalog.upsert(entry)?;
        self.catalog_file
            .save(&self.catalog)
            .context("Failed to save catalog")?;

        let document_changed = self.update_document(kind, &name, &block)?;

        info!(
            "{} {} '{}'",
            if upsert.is_created() { "Added" } else { "Updated" },
            kind,
            name
        );

        Ok(ApplyOutcome {
            kind,
            name,
            created: matches!(upsert, Upsert::Created),
            document_changed,
        })
    }

    /// Rewrite the whole document from the catalog
    ///
    /// Discards anything in the document that is not a catalog entry.
    pub fn regenerate_document(&self) -> Result<bool> {
        let rendered = render_document(&self.catalog);
        self.write_if_changed(&rendered)
    }

    fn update_document(&self, kind: Kind, name: &str, block: &str) -> Result<bool> {
        match self.config.strategy {
            Strategy::Splice => {
                let current = self
                    .document
                    .read()
                    .context("Failed to read document")?;
                let updated = merge(&current, kind, name, block);
                if updated == current {
                    debug!("Document already up to date for {} '{}'", kind, name);
                    return Ok(false);
                }
                self.document
                    .write(&updated)
                    .context("Failed to write document")?;
                Ok(true)
            }
            Strategy::Regenerate => self.regenerate_document(),
        }
    }

    fn write_if_changed(&self, content: &str) -> Result<bool> {
        // An unreadable document is simply replaced
        if self.document.read().is_ok_and(|current| current == content) {
            return Ok(false);
        }
        self.document
            .write(content)
            .context("Failed to write document")?;
        Ok(true)
    }
}

/// A `Store` shared between callers
///
/// Each `apply` holds the lock for the whole catalog-then-document sequence,
/// so concurrent entries are processed one at a time.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn apply(&self, entry: Entry) -> Result<ApplyOutcome> {
        let mut store = self
            .inner
            .lock()
            .map_err(|_| anyhow!("Store lock poisoned"))?;
        store.apply(entry)
    }

    /// Run a read-only closure against the store
    pub fn read<R>(&self, f: impl FnOnce(&Store) -> R) -> Result<R> {
        let store = self
            .inner
            .lock()
            .map_err(|_| anyhow!("Store lock poisoned"))?;
        Ok(f(&store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelError;
    use crate::storage::StorageError;
    use std::fs;
    use std::thread;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            root: temp_dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    fn add() -> Entry {
        Entry::function("add")
            .with_description("Adds two numbers.")
            .with_attribute("a", "first")
            .with_attribute("b", "second")
            .with_usage("add(1,2)")
    }

    #[test]
    fn test_open_creates_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let store = Store::open_with_config(config.clone()).unwrap();

        assert!(config.catalog_path().exists());
        assert!(!config.document_path().exists());
        assert!(store.catalog().is_empty());
    }

    #[test]
    fn test_apply_writes_catalog_and_document() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mut store = Store::open_with_config(config.clone()).unwrap();

        let outcome = store.apply(add()).unwrap();
        assert!(outcome.created);
        assert!(outcome.document_changed);

        let document = fs::read_to_string(config.document_path()).unwrap();
        assert_eq!(document, format!("# **Functions**\n\n{}", render(&add())));

        let catalog: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(config.catalog_path()).unwrap()).unwrap();
        assert_eq!(catalog["Function"]["add"]["params"]["b"], "second");
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mut store = Store::open_with_config(config.clone()).unwrap();

        store.apply(add()).unwrap();
        let first = fs::read_to_string(config.document_path()).unwrap();

        let outcome = store.apply(add()).unwrap();
        assert!(!outcome.created);
        assert!(!outcome.document_changed);
        assert_eq!(fs::read_to_string(config.document_path()).unwrap(), first);
    }

    #[test]
    fn test_apply_preserves_manual_edits() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        fs::write(config.document_path(), "# My App\n\nHand-written intro.\n").unwrap();

        let mut store = Store::open_with_config(config.clone()).unwrap();
        store.apply(add()).unwrap();
        store.apply(Entry::component("Button")).unwrap();

        let document = fs::read_to_string(config.document_path()).unwrap();
        assert!(document.starts_with("# My App\n\nHand-written intro.\n\n# **Functions**"));
        assert!(document.contains("# **Components**\n\n### **Button.jsx**"));
    }

    #[test]
    fn test_regenerate_strategy_rebuilds_from_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            strategy: Strategy::Regenerate,
            ..test_config(&temp_dir)
        };
        fs::write(config.document_path(), "stale hand-written text\n").unwrap();

        let mut store = Store::open_with_config(config.clone()).unwrap();
        store.apply(Entry::function("first")).unwrap();
        store.apply(Entry::function("second")).unwrap();

        let document = fs::read_to_string(config.document_path()).unwrap();
        assert_eq!(document, render_document(store.catalog()));
        assert!(!document.contains("stale"));
        // Catalog order, not most-recent-first
        assert!(document.find("first()").unwrap() < document.find("second()").unwrap());
    }

    #[test]
    fn test_malformed_entry_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mut store = Store::open_with_config(config.clone()).unwrap();
        store.apply(add()).unwrap();

        let catalog_before = fs::read_to_string(config.catalog_path()).unwrap();
        let document_before = fs::read_to_string(config.document_path()).unwrap();

        let err = store.apply(Entry::component("  ")).unwrap_err();
        assert!(err.downcast_ref::<ModelError>().is_some());

        assert_eq!(store.catalog().len(), 1);
        assert_eq!(fs::read_to_string(config.catalog_path()).unwrap(), catalog_before);
        assert_eq!(fs::read_to_string(config.document_path()).unwrap(), document_before);
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        {
            let mut store = Store::open_with_config(config.clone()).unwrap();
            store.apply(add()).unwrap();
            store.apply(Entry::component("Modal").with_usage("<Modal />")).unwrap();
        }

        let store = Store::open_with_config(config).unwrap();
        assert_eq!(store.get(Kind::Function, "add"), Some(&add()));
        assert_eq!(store.get(Kind::Component, "Modal").unwrap().usage, "<Modal />");
        assert_eq!(
            store.stats(),
            StoreStats {
                catalog_exists: true,
                document_exists: true,
                functions: 1,
                components: 1,
            }
        );
    }

    #[test]
    fn test_corrupt_catalog_refuses_to_open() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        fs::write(config.catalog_path(), "[1, 2").unwrap();

        let err = Store::open_with_config(config.clone()).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<StorageError>(),
            Some(StorageError::InvalidFormat { .. })
        ));
        assert_eq!(fs::read_to_string(config.catalog_path()).unwrap(), "[1, 2");
    }

    #[test]
    fn test_regenerate_document_recovers_lost_document() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mut store = Store::open_with_config(config.clone()).unwrap();
        store.apply(add()).unwrap();

        fs::remove_file(config.document_path()).unwrap();
        assert!(store.regenerate_document().unwrap());
        assert!(!store.regenerate_document().unwrap());

        let document = fs::read_to_string(config.document_path()).unwrap();
        assert!(document.contains("### **add()**"));
    }

    #[test]
    fn test_shared_store_serializes_concurrent_applies() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let shared = SharedStore::new(Store::open_with_config(config.clone()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    shared
                        .apply(Entry::function(format!("f{}", i)).with_usage(format!("f{}()", i)))
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let document = fs::read_to_string(config.document_path()).unwrap();
        for i in 0..8 {
            assert_eq!(document.matches(&format!("### **f{}()**", i)).count(), 1);
        }
        assert_eq!(shared.read(|s| s.catalog().len()).unwrap(), 8);

        let reopened = Store::open_with_config(config).unwrap();
        assert_eq!(reopened.catalog().len(), 8);
    }
}
