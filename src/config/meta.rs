//! Theme metadata

use serde::{Deserialize, Serialize};

/// Descriptive metadata one layer declares about its theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Print a startup message for this theme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motd: Option<bool>,
}

/// Startup lines for themes that ask for one, in layer order.
pub fn startup_messages(metas: &[ThemeMeta]) -> Vec<String> {
    metas
        .iter()
        .filter(|meta| meta.motd.unwrap_or(false))
        .map(|meta| {
            let name = meta.name.as_deref().unwrap_or("unnamed theme");
            match &meta.author {
                Some(author) => format!("Using theme {} by {}", name, author),
                None => format!("Using theme {}", name),
            }
        })
        .collect()
}
