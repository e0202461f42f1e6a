//! Classification protocol message types
//!
//! JSON-RPC 2.0 envelope around the `Server.generateDoc` method. The RPC
//! `result` carries a classification, itself usually JSON-encoded as a
//! string, whose `data` field holds the entry fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ClassifyError, Language};
use crate::models::{Entry, EntryFields, Kind};

/// JSON-RPC protocol version
pub const JSONRPC_VERSION: &str = "2.0";

/// Method that turns source text into documentation
pub const GENERATE_DOC: &str = "Server.generateDoc";

/// Request id; the service does not correlate ids
const REQUEST_ID: u32 = 3;

/// Request sent to the classification service
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    /// `[language, "\"<flattened text>\""]`
    pub params: (Language, String),
    pub id: u32,
}

impl RpcRequest {
    /// Build a `generateDoc` request for a selection of source text
    pub fn generate_doc(language: Language, selection: &str) -> Result<Self, ClassifyError> {
        let text = flatten_selection(selection);
        if text.is_empty() {
            return Err(ClassifyError::EmptySelection);
        }

        Ok(Self {
            jsonrpc: JSONRPC_VERSION,
            method: GENERATE_DOC,
            params: (language, format!("\"{}\"", text)),
            id: REQUEST_ID,
        })
    }
}

/// Collapse line breaks to spaces and trim
pub fn flatten_selection(selection: &str) -> String {
    selection
        .replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .trim()
        .to_string()
}

/// JSON-RPC response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// What the service decided the selection is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CodeType {
    Function,
    Component,
    None,
}

/// Outcome reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ResponseStatus {
    Success,
    Error,
}

/// The classification carried in the RPC result
#[derive(Debug, Clone, Deserialize)]
pub struct Classification {
    #[serde(rename = "type", default)]
    pub code_type: Option<CodeType>,
    pub status: ResponseStatus,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub info: Option<String>,
}

impl RpcResponse {
    /// Extract the classified entry
    pub fn into_entry(self) -> Result<Entry, ClassifyError> {
        if let Some(error) = self.error {
            return Err(ClassifyError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = self
            .result
            .ok_or_else(|| ClassifyError::Malformed("response has no result".to_string()))?;
        let classification: Classification = decode(result, "result")?;
        classification.into_entry()
    }
}

impl Classification {
    pub fn into_entry(self) -> Result<Entry, ClassifyError> {
        if self.status == ResponseStatus::Error {
            return Err(ClassifyError::Rejected(
                self.info.unwrap_or_else(|| "no details given".to_string()),
            ));
        }

        let kind = match self.code_type {
            Some(CodeType::Function) => Kind::Function,
            Some(CodeType::Component) => Kind::Component,
            Some(CodeType::None) | None => return Err(ClassifyError::Unclassified),
        };

        let data = self
            .data
            .ok_or_else(|| ClassifyError::Malformed("classification has no data".to_string()))?;
        let fields: EntryFields = decode(data, "data")?;
        Ok(fields.into_entry(kind))
    }
}

/// Decode a value that may itself be a JSON-encoded string
fn decode<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<T, ClassifyError> {
    let value = match value {
        Value::String(encoded) => serde_json::from_str(&encoded)
            .map_err(|e| ClassifyError::Malformed(format!("{} is not valid JSON: {}", what, e)))?,
        other => other,
    };
    serde_json::from_value(value)
        .map_err(|e| ClassifyError::Malformed(format!("unexpected {} shape: {}", what, e)))
}
