//! Data models for codedocs
//!
//! Defines the documented item (`Entry`) and its discriminator (`Kind`).
//! Functions and components share one record shape; the kind selects the
//! rendering template, the target section and the persisted attribute key.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Ordered attribute name -> description mapping
pub type Attributes = IndexMap<String, String>;

/// Errors raised when an entry is not well formed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("{kind} entry is missing a name")]
    MissingName { kind: Kind },

    #[error("{kind} name '{name}' spans multiple lines")]
    MultilineName { kind: Kind, name: String },

    #[error("Unknown entry kind: '{0}' (expected 'function' or 'component')")]
    UnknownKind(String),
}

/// What kind of item an entry documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Function,
    Component,
}

impl Kind {
    /// All kinds, in document order
    pub const ALL: [Kind; 2] = [Kind::Function, Kind::Component];

    /// Title of the top-level document section for this kind
    pub fn section_title(self) -> &'static str {
        match self {
            Kind::Function => "Functions",
            Kind::Component => "Components",
        }
    }

    /// Suffix appended to the entry name in its heading
    pub fn heading_suffix(self) -> &'static str {
        match self {
            Kind::Function => "()",
            Kind::Component => ".jsx",
        }
    }

    /// Human label for the attribute list
    pub fn attributes_label(self) -> &'static str {
        match self {
            Kind::Function => "Parameters",
            Kind::Component => "Props",
        }
    }

    /// Key under which attributes are persisted and received
    pub fn attributes_key(self) -> &'static str {
        match self {
            Kind::Function => "params",
            Kind::Component => "props",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Function => "Function",
            Kind::Component => "Component",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "function" | "fn" => Ok(Kind::Function),
            "component" | "comp" => Ok(Kind::Component),
            _ => Err(ModelError::UnknownKind(s.to_string())),
        }
    }
}

/// One documented function or component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: Kind,
    /// Identity key, unique within the kind
    pub name: String,
    pub description: String,
    /// Parameters (functions) or props (components), in insertion order
    pub attributes: Attributes,
    /// Usage snippet, kept verbatim
    pub usage: String,
}

impl Entry {
    /// Create an entry with the given kind and name and empty fields
    pub fn new(kind: Kind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: String::new(),
            attributes: Attributes::new(),
            usage: String::new(),
        }
    }

    /// Create a function entry
    pub fn function(name: impl Into<String>) -> Self {
        Self::new(Kind::Function, name)
    }

    /// Create a component entry
    pub fn component(name: impl Into<String>) -> Self {
        Self::new(Kind::Component, name)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append an attribute (replaces the value if the key is already present)
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Check that the entry can be stored and rendered
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::MissingName { kind: self.kind });
        }
        if self.name.contains(['\n', '\r']) {
            return Err(ModelError::MultilineName {
                kind: self.kind,
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Persisted form: `{name, description, params|props, usage}`
///
/// The kind is not part of the record; it is the key of the enclosing map.
impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Entry", 4)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field(self.kind.attributes_key(), &self.attributes)?;
        state.serialize_field("usage", &self.usage)?;
        state.end()
    }
}

/// Entry fields as received from storage or the classification service
///
/// Accepts either `params` or `props` for the attribute list; every field is
/// optional so that sparse records still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "params", alias = "props")]
    pub attributes: Attributes,
    #[serde(default)]
    pub usage: String,
}

impl EntryFields {
    /// Attach a kind, producing an entry
    pub fn into_entry(self, kind: Kind) -> Entry {
        Entry {
            kind,
            name: self.name,
            description: self.description,
            attributes: self.attributes,
            usage: self.usage,
        }
    }
}
