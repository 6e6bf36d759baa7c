//! Endpoint payload shapes.
//!
//! The serving layer reads and writes cached entries with these bodies.
//! Every field is optional on input: a POST that omits a field leaves the
//! matching cache entry untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of the options endpoint (`POST {options}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Body of the tokens endpoint (`POST {tokens}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokensPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Value>,
}

/// Body and response of the combined config endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPayload {
    #[serde(default)]
    pub tokens: Option<Value>,
    #[serde(default)]
    pub options: Option<Value>,
}
