//! Classification service client
//!
//! Sends a selection of source text to the documentation service and turns
//! its answer into an [`Entry`](crate::models::Entry).
//!
//! ## Protocol
//!
//! 1. Flatten the selection to one line and quote it
//! 2. POST a JSON-RPC `Server.generateDoc` request with the language tag
//! 3. Decode the classification in the RPC result
//!
//! ## Usage
//!
//! ```ignore
//! let client = ClassifierClient::from_config(&config)?;
//! let entry = client.classify(selection).await?;
//! store.apply(entry)?;
//! ```

mod client;
mod message;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::ClassifierClient;
pub use message::{flatten_selection, Classification, CodeType, ResponseStatus, RpcRequest, RpcResponse};

/// Errors from the classification step
///
/// None of these touch the catalog or the document.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("No text selected")]
    EmptySelection,

    #[error("Classification service URL is not configured. Set it with `codedocs config set classifier_url <url>`")]
    NotConfigured,

    #[error("Request to classification service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Classification service returned HTTP {0}")]
    Http(u16),

    #[error("Classification service error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Classification failed: {0}")]
    Rejected(String),

    #[error("Selection is neither a function nor a component")]
    Unclassified,

    #[error("Malformed classification response: {0}")]
    Malformed(String),
}

/// Language of the generated documentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Ro,
    #[default]
    En,
}

/// Unrecognised language tag
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown language '{0}' (expected 'en' or 'ro')")]
pub struct ParseLanguageError(String);

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Ro => f.write_str("Ro"),
            Language::En => f.write_str("En"),
        }
    }
}

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ro" => Ok(Language::Ro),
            _ => Err(ParseLanguageError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert_eq!("ro".parse::<Language>().unwrap(), Language::Ro);
        assert!("de".parse::<Language>().is_err());
        assert_eq!(Language::default().to_string(), "En");
    }
}
