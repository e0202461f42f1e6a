//! The canonical entry catalog
//!
//! Maps kind -> name -> entry. This is the source of truth; the Markdown
//! document is derived from it. Iteration follows insertion order, and
//! replacing an entry keeps its original position.
//!
//! Persisted layout:
//!
//! ```text
//! { "Function": { name: {name, description, params, usage} },
//!   "Component": { name: {name, description, props, usage} } }
//! ```

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::models::{Entry, EntryFields, Kind, ModelError};

/// Result of an upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    /// No entry existed for the key
    Created,
    /// An entry existed and was replaced; holds the old entry
    Replaced(Entry),
}

impl Upsert {
    pub fn is_created(&self) -> bool {
        matches!(self, Upsert::Created)
    }
}

/// All documented entries, keyed by kind and name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    functions: IndexMap<String, Entry>,
    components: IndexMap<String, Entry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn kind_map(&self, kind: Kind) -> &IndexMap<String, Entry> {
        match kind {
            Kind::Function => &self.functions,
            Kind::Component => &self.components,
        }
    }

    fn kind_map_mut(&mut self, kind: Kind) -> &mut IndexMap<String, Entry> {
        match kind {
            Kind::Function => &mut self.functions,
            Kind::Component => &mut self.components,
        }
    }

    /// Insert or fully replace the entry for `(entry.kind, entry.name)`
    ///
    /// A malformed entry is rejected and the catalog is left unchanged.
    pub fn upsert(&mut self, entry: Entry) -> Result<Upsert, ModelError> {
        entry.validate()?;
        let previous = self
            .kind_map_mut(entry.kind)
            .insert(entry.name.clone(), entry);
        Ok(match previous {
            Some(old) => Upsert::Replaced(old),
            None => Upsert::Created,
        })
    }

    /// Consuming variant of [`Catalog::upsert`]
    pub fn with(mut self, entry: Entry) -> Result<Self, ModelError> {
        self.upsert(entry)?;
        Ok(self)
    }

    /// Entries of one kind, in insertion order
    pub fn entries(&self, kind: Kind) -> Vec<&Entry> {
        self.kind_map(kind).values().collect()
    }

    /// Look up a single entry
    pub fn get(&self, kind: Kind, name: &str) -> Option<&Entry> {
        self.kind_map(kind).get(name)
    }

    /// All entries, functions first, each kind in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.functions.values().chain(self.components.values())
    }

    pub fn count(&self, kind: Kind) -> usize {
        self.kind_map(kind).len()
    }

    pub fn len(&self) -> usize {
        self.functions.len() + self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Kind::ALL.len()))?;
        for kind in Kind::ALL {
            map.serialize_entry(kind.as_str(), self.kind_map(kind))?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(rename = "Function", default)]
    functions: IndexMap<String, EntryFields>,
    #[serde(rename = "Component", default)]
    components: IndexMap<String, EntryFields>,
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let file = CatalogFile::deserialize(deserializer)?;
        Ok(Self {
            functions: keyed(Kind::Function, file.functions),
            components: keyed(Kind::Component, file.components),
        })
    }
}

/// The map key is the identity; the inner name follows it
///
/// Records whose key is not a valid name are skipped.
fn keyed(kind: Kind, records: IndexMap<String, EntryFields>) -> IndexMap<String, Entry> {
    records
        .into_iter()
        .filter_map(|(key, mut fields)| {
            if fields.name != key {
                if !fields.name.is_empty() {
                    warn!(
                        "{} record '{}' is stored under key '{}'; using the key",
                        kind, fields.name, key
                    );
                }
                fields.name = key.clone();
            }
            let entry = fields.into_entry(kind);
            match entry.validate() {
                Ok(()) => Some((key, entry)),
                Err(e) => {
                    warn!("Skipping stored record {:?}: {}", key, e);
                    None
                }
            }
        })
        .collect()
}
