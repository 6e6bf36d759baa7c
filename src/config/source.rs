//! Layer source reader
//!
//! Locates and loads one layer's contribution for one aspect. Load failures
//! never propagate: the layer contributes an empty mapping and no file path.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use super::{Aspect, AspectValue, ConfigurationLayer};

/// Extensions tried, in order, when a config path has none of its own.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["json", "toml", "yaml", "yml"];

/// Key holding a hand-authored schema hint inside a config object.
const SCHEMA_KEY: &str = "schema";

/// Key holding theme metadata; never part of a merged payload.
const META_KEY: &str = "meta";

/// Errors from loading a layer config file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("config file '{0}' does not contain a mapping")]
    NotAMapping(PathBuf),

    #[error("unsupported config file format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Loads a config document from a path.
///
/// Implementations must not cache: every resolution pass reads fresh.
pub trait SourceLoader: Send + Sync {
    /// Load and parse the document at `path`.
    fn load(&self, path: &Path) -> Result<Value, ConfigLoadError>;

    /// Whether a loadable file exists at `path`.
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Reads config files from disk, parsing by extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> Result<Value, ConfigLoadError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigLoadError::NotFound(path.to_path_buf())
            } else {
                ConfigLoadError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let parse_error = |message: String| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents).map_err(|e| parse_error(e.to_string())),
            Some("toml") => toml::from_str::<toml::Value>(&contents)
                .map(toml_to_json)
                .map_err(|e| parse_error(e.to_string())),
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&contents).map_err(|e| parse_error(e.to_string()))
            }
            _ => Err(ConfigLoadError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Convert a TOML value to JSON, keeping table order.
pub(crate) fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// One layer's resolved contribution for one aspect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedAspectConfig {
    /// File the config came from; `None` for inline values and failed loads.
    pub file_path: Option<PathBuf>,
    /// Config object, `schema` and `meta` removed.
    pub config: Map<String, Value>,
    /// Hand-authored schema hint captured from the config.
    pub schema: Option<Value>,
}

impl ResolvedAspectConfig {
    fn from_parts(file_path: Option<PathBuf>, mut config: Map<String, Value>) -> Self {
        let schema = config.shift_remove(SCHEMA_KEY);
        config.shift_remove(META_KEY);
        Self {
            file_path,
            config,
            schema,
        }
    }
}

/// Resolve one aspect of one layer.
///
/// Returns `None` when the aspect is disabled for the layer, either by its
/// own `false` or by a disabled module default.
pub fn resolve_aspect(
    layer: &ConfigurationLayer,
    aspect: Aspect,
    module_default: &AspectValue,
    loader: &dyn SourceLoader,
) -> Option<ResolvedAspectConfig> {
    let declared = layer
        .theme()
        .and_then(|theme| theme.get(aspect.key()))
        .and_then(AspectValue::from_value);
    let value = declared.unwrap_or_else(|| module_default.clone());

    let (file_path, config) = match value {
        AspectValue::Disabled => return None,
        AspectValue::Inline(map) => (None, map),
        AspectValue::Conventional => {
            let base = layer.cwd.join(aspect.conventional_stem());
            load_layer_file(loader, &base, aspect)
        }
        AspectValue::Path(path) => {
            let base = layer.cwd.join(path);
            load_layer_file(loader, &base, aspect)
        }
    };

    Some(ResolvedAspectConfig::from_parts(file_path, config))
}

/// Find the file for `base`: the exact path when it exists, otherwise `base`
/// with each supported extension appended.
pub fn locate(loader: &dyn SourceLoader, base: &Path) -> Option<PathBuf> {
    if loader.exists(base) {
        return Some(base.to_path_buf());
    }

    let has_supported_extension = base
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e))
        .unwrap_or(false);
    if has_supported_extension {
        return None;
    }

    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| {
            let mut name = OsString::from(base.as_os_str());
            name.push(".");
            name.push(ext);
            PathBuf::from(name)
        })
        .find(|candidate| loader.exists(candidate))
}

fn load_layer_file(
    loader: &dyn SourceLoader,
    base: &Path,
    aspect: Aspect,
) -> (Option<PathBuf>, Map<String, Value>) {
    let result = locate(loader, base)
        .ok_or_else(|| ConfigLoadError::NotFound(base.to_path_buf()))
        .and_then(|path| {
            let value = loader.load(&path)?;
            match value {
                Value::Object(map) => Ok((path, map)),
                _ => Err(ConfigLoadError::NotAMapping(path)),
            }
        });

    match result {
        Ok((path, map)) => {
            tracing::debug!(aspect = %aspect, path = %path.display(), "loaded layer config");
            (Some(path), map)
        }
        Err(ConfigLoadError::NotFound(path)) => {
            tracing::debug!(aspect = %aspect, path = %path.display(), "no layer config file");
            (None, Map::new())
        }
        Err(e) => {
            tracing::warn!(aspect = %aspect, error = %e, "ignoring layer config");
            (None, Map::new())
        }
    }
}
