//! Theme configuration resolution
//!
//! Resolves the `theme` block of every configuration layer and merges the
//! results:
//! 1. Layer source reader (inline object, conventional file, explicit path)
//! 2. Options: defaults merge (earlier layers win)
//! 3. Tokens: overlay merge (later layers win)
//!
//! Arrays are always replaced wholesale, never merged element-wise.

mod merge;
mod meta;
mod module;
mod source;

pub use merge::{deep_merge, defaults_merge, merge_layers, MergedTheme};
pub use meta::{startup_messages, ThemeMeta};
pub use module::{ModuleError, ModuleOptions};
pub use source::{
    locate, resolve_aspect, ConfigLoadError, FsLoader, ResolvedAspectConfig, SourceLoader,
    SUPPORTED_EXTENSIONS,
};

use serde_json::{Map, Value};
use std::path::PathBuf;

/// One unit of inheritable configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationLayer {
    /// Directory the layer lives in; relative paths resolve against it.
    pub cwd: PathBuf,
    /// Raw configuration object, possibly holding a `theme` block.
    pub config: Value,
}

impl ConfigurationLayer {
    /// Create a layer from its directory and raw config.
    pub fn new(cwd: impl Into<PathBuf>, config: Value) -> Self {
        Self {
            cwd: cwd.into(),
            config,
        }
    }

    /// The layer's `theme` block, if any.
    pub fn theme(&self) -> Option<&Map<String, Value>> {
        self.config.get("theme").and_then(Value::as_object)
    }
}

/// A configuration concern resolved independently per layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aspect {
    Options,
    Tokens,
}

impl Aspect {
    /// Key of the aspect inside the `theme` block.
    pub fn key(&self) -> &'static str {
        match self {
            Aspect::Options => "options",
            Aspect::Tokens => "tokens",
        }
    }

    /// File stem looked up when the aspect is set to `true`.
    pub fn conventional_stem(&self) -> &'static str {
        match self {
            Aspect::Options => "theme.config",
            Aspect::Tokens => "tokens.config",
        }
    }
}

impl std::fmt::Display for Aspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Declared value of an aspect for one layer.
#[derive(Debug, Clone, PartialEq)]
pub enum AspectValue {
    /// `false`: the layer does not contribute.
    Disabled,
    /// `true`: load the conventional file from the layer directory.
    Conventional,
    /// Load this path, relative to the layer directory.
    Path(String),
    /// Use this object directly.
    Inline(Map<String, Value>),
}

impl AspectValue {
    /// Interpret a declared value. `null` and unsupported types count as absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(true) => Some(AspectValue::Conventional),
            Value::Bool(false) => Some(AspectValue::Disabled),
            Value::String(path) => Some(AspectValue::Path(path.clone())),
            Value::Object(map) => Some(AspectValue::Inline(map.clone())),
            _ => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, AspectValue::Disabled)
    }
}

impl serde::Serialize for AspectValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AspectValue::Disabled => serializer.serialize_bool(false),
            AspectValue::Conventional => serializer.serialize_bool(true),
            AspectValue::Path(path) => serializer.serialize_str(path),
            AspectValue::Inline(map) => serde::Serialize::serialize(map, serializer),
        }
    }
}

impl<'de> serde::Deserialize<'de> for AspectValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Value as serde::Deserialize>::deserialize(deserializer)?;
        AspectValue::from_value(&value).ok_or_else(|| {
            serde::de::Error::custom("expected a boolean, a path string or an object")
        })
    }
}
