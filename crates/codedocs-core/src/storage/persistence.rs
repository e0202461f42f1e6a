//! Catalog and document persistence
//!
//! Every write is atomic (write to a sibling temp file, sync, then rename) so
//! a crash never leaves a half-written catalog or document behind.
//!
//! Files (relative to the configured root):
//! - `functions.json` - the catalog
//! - `README.md` - the rendered document

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::{StorageError, StorageResult};
use crate::catalog::Catalog;

/// Persistence for the JSON catalog
pub struct CatalogPersistence {
    path: PathBuf,
}

impl CatalogPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the catalog file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the catalog from disk
    ///
    /// Returns `None` if the file doesn't exist. A file holding only
    /// whitespace is an empty catalog. A file that can't be parsed is an
    /// error and is left as it is.
    pub fn load(&self) -> StorageResult<Option<Catalog>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::from_read_io(e, self.path.clone())),
        };

        if content.trim().is_empty() {
            return Ok(Some(Catalog::new()));
        }

        let catalog: Catalog =
            serde_json::from_str(&content).map_err(|e| StorageError::InvalidFormat {
                path: self.path.clone(),
                details: e.to_string(),
            })?;

        debug!("Loaded {} entries from {:?}", catalog.len(), self.path);
        Ok(Some(catalog))
    }

    /// Load the catalog, or create an empty one on disk if none exists
    pub fn load_or_create(&self) -> StorageResult<Catalog> {
        if let Some(catalog) = self.load()? {
            return Ok(catalog);
        }

        info!("No catalog at {:?}, creating an empty one", self.path);
        let catalog = Catalog::new();
        self.save(&catalog)?;
        Ok(catalog)
    }

    /// Overwrite the catalog file with `catalog`
    pub fn save(&self, catalog: &Catalog) -> StorageResult<()> {
        let mut bytes = serde_json::to_vec_pretty(catalog)?;
        bytes.push(b'\n');
        atomic_write(&self.path, &bytes)?;
        debug!("Saved {} entries to {:?}", catalog.len(), self.path);
        Ok(())
    }
}

/// The Markdown document on disk
pub struct DocumentFile {
    path: PathBuf,
}

impl DocumentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the document; a missing file is an empty document
    pub fn read(&self) -> StorageResult<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(StorageError::from_read_io(e, self.path.clone())),
        }
    }

    /// Replace the document with `content`
    pub fn write(&self, content: &str) -> StorageResult<()> {
        atomic_write(&self.path, content.as_bytes())?;
        info!("Updated {:?}", self.path);
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The target is either the old content or the new content, never a mix.
pub fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = temp_path_for(path);

    let result = write_synced(&temp_path, data).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
            from: temp_path.clone(),
            to: path.to_path_buf(),
            source,
        })
    });

    if result.is_err() {
        // Best effort; the target itself is untouched
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_synced(path: &Path, data: &[u8]) -> StorageResult<()> {
    let mut file = File::create(path).map_err(|e| StorageError::from_io(e, path.to_path_buf()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, path.to_path_buf()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, path.to_path_buf()))
}

/// `README.md` -> `README.md.tmp`, in the same directory
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
