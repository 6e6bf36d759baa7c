//! Live-reload event payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::UPDATE_EVENT;

/// Payload delivered to connected clients when the merged theme changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeUpdate {
    /// Merged theme options.
    pub options: Value,
    /// Merged design token tree.
    pub tokens: Value,
}

impl ThemeUpdate {
    /// Create an update from merged options and tokens.
    pub fn new(options: Value, tokens: Value) -> Self {
        Self { options, tokens }
    }

    /// Event name this payload is published under.
    pub fn event_name(&self) -> &'static str {
        UPDATE_EVENT
    }
}
