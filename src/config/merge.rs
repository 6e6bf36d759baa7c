//! Layer merge logic
//!
//! Two policies, one per aspect:
//! - Options: defaults merge. Keys already present win, later layers only
//!   fill gaps.
//! - Tokens: overlay merge. Later layers win key by key.
//!
//! Both recurse into mappings and replace arrays wholesale with the incoming
//! array.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use super::meta::ThemeMeta;
use super::module::ModuleOptions;
use super::source::{resolve_aspect, SourceLoader};
use super::{Aspect, ConfigurationLayer};

/// Overlay merge of two JSON values.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive), base key order kept
/// - Arrays: REPLACE (overlay wins entirely)
/// - Scalars: override (overlay wins)
/// - Null: override (null can override any value)
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => {
                        let base_value = std::mem::take(slot);
                        *slot = deep_merge(base_value, overlay_value);
                    }
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
            Value::Object(base_map)
        }

        // Arrays: REPLACE (no concatenation)
        (Value::Array(_), overlay @ Value::Array(_)) => overlay,

        (_, overlay) => overlay,
    }
}

/// Defaults merge of two JSON values.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive), existing keys win
/// - Arrays: REPLACE when both sides are arrays (incoming wins entirely)
/// - Null base: filled by the incoming value
/// - Anything else: base wins
pub fn defaults_merge(base: Value, incoming: Value) -> Value {
    match (base, incoming) {
        (Value::Object(mut base_map), Value::Object(incoming_map)) => {
            for (key, incoming_value) in incoming_map {
                match base_map.get_mut(&key) {
                    Some(slot) => {
                        let base_value = std::mem::take(slot);
                        *slot = defaults_merge(base_value, incoming_value);
                    }
                    None => {
                        base_map.insert(key, incoming_value);
                    }
                }
            }
            Value::Object(base_map)
        }

        (Value::Array(_), incoming @ Value::Array(_)) => incoming,

        (Value::Null, incoming) => incoming,

        (base, _) => base,
    }
}

/// Result of one resolution pass over every layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedTheme {
    /// Merged theme options.
    pub options: Map<String, Value>,
    /// Merged design token tree.
    pub tokens: Map<String, Value>,
    /// Metadata of every layer declaring `theme.meta`, in layer order.
    pub metas: Vec<ThemeMeta>,
    /// Option files that loaded successfully, in layer order.
    pub options_file_paths: Vec<PathBuf>,
    /// Token files that loaded successfully, in layer order.
    pub tokens_file_paths: Vec<PathBuf>,
    /// Merged hand-authored schema hint for the options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl MergedTheme {
    pub fn options_value(&self) -> Value {
        Value::Object(self.options.clone())
    }

    pub fn tokens_value(&self) -> Value {
        Value::Object(self.tokens.clone())
    }

    /// Whether `path` is one of the config files this theme was built from.
    pub fn is_source_file(&self, path: &Path) -> bool {
        self.options_file_paths
            .iter()
            .chain(self.tokens_file_paths.iter())
            .any(|p| p == path)
    }
}

/// Merge the theme configuration of every layer, in order.
pub fn merge_layers(
    layers: &[ConfigurationLayer],
    module: &ModuleOptions,
    loader: &dyn SourceLoader,
) -> MergedTheme {
    let mut merged = MergedTheme::default();
    let mut options = Value::Object(Map::new());
    let mut tokens = Value::Object(Map::new());
    let mut schema: Option<Value> = None;

    for layer in layers {
        if let Some(meta) = layer.theme().and_then(|theme| theme.get("meta")) {
            match serde_json::from_value::<ThemeMeta>(meta.clone()) {
                Ok(meta) => merged.metas.push(meta),
                Err(e) => tracing::warn!(
                    layer = %layer.cwd.display(),
                    error = %e,
                    "ignoring malformed theme meta"
                ),
            }
        }

        if let Some(resolved) = resolve_aspect(layer, Aspect::Options, &module.options, loader) {
            options = defaults_merge(options, Value::Object(resolved.config));
            if let Some(fragment) = resolved.schema {
                schema = Some(match schema.take() {
                    Some(existing) => defaults_merge(existing, fragment),
                    None => fragment,
                });
            }
            merged.options_file_paths.extend(resolved.file_path);
        }

        if let Some(resolved) = resolve_aspect(layer, Aspect::Tokens, &module.tokens, loader) {
            tokens = deep_merge(tokens, Value::Object(resolved.config));
            if resolved.schema.is_some() {
                tracing::debug!(layer = %layer.cwd.display(), "schema hints apply to options only");
            }
            merged.tokens_file_paths.extend(resolved.file_path);
        }
    }

    merged.options = into_map(options);
    merged.tokens = into_map(tokens);
    merged.schema = schema;

    tracing::debug!(
        layers = layers.len(),
        metas = merged.metas.len(),
        option_files = merged.options_file_paths.len(),
        token_files = merged.tokens_file_paths.len(),
        "merged theme layers"
    );

    merged
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
