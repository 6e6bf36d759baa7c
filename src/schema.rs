//! Structural schema of theme options
//!
//! A schema is inferred from the merged options and can be refined by a
//! hand-authored hint. Hints use a small notation:
//!
//! ```json
//! {
//!   "title": "string",
//!   "header": {
//!     "$description": "Site header",
//!     "logo": { "$type": "boolean", "$default": false }
//!   },
//!   "links": { "$type": "array", "$items": "string" }
//! }
//! ```
//!
//! A string names a kind. In a mapping, `$`-prefixed keys are metadata and
//! every other key is a child field.

use serde_json::Value;
use thiserror::Error;

/// Maximum nesting accepted when building a schema.
pub const MAX_SCHEMA_DEPTH: usize = 64;

/// Errors from schema construction.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("theme options must be a mapping, found {0}")]
    NotAMapping(&'static str),

    #[error("unknown schema type '{kind}' at '{path}'")]
    UnknownKind { path: String, kind: String },

    #[error("malformed schema hint at '{path}': {message}")]
    MalformedHint { path: String, message: String },

    #[error("schema nested deeper than {limit} levels at '{path}'")]
    TooDeep { path: String, limit: usize },
}

/// Leaf kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Number,
    Boolean,
    Any,
}

/// Shape of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Scalar(ScalarKind),
    Mapping(Vec<(String, Schema)>),
    Sequence(Box<Schema>),
}

/// A schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub shape: Shape,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl Schema {
    fn new(shape: Shape) -> Self {
        Self {
            shape,
            default: None,
            description: None,
        }
    }

    fn any() -> Self {
        Self::new(Shape::Scalar(ScalarKind::Any))
    }

    /// Infer the schema of merged options.
    pub fn infer_options(options: &Value) -> Result<Self, SchemaError> {
        if !options.is_object() {
            return Err(SchemaError::NotAMapping(kind_name(options)));
        }
        infer(options, &mut Vec::new())
    }

    /// Parse a hand-authored hint.
    pub fn from_hint(hint: &Value) -> Result<Self, SchemaError> {
        parse_hint(hint, &mut Vec::new())
    }

    /// Lay `explicit` over `inferred`. Explicit wins; mapping fields merge
    /// one by one; inferred defaults and descriptions survive where the hint
    /// leaves them out.
    pub fn overlay(inferred: Schema, explicit: Schema) -> Schema {
        let default = explicit.default.or(inferred.default);
        let description = explicit.description.or(inferred.description);

        let shape = match (inferred.shape, explicit.shape) {
            (Shape::Mapping(mut fields), Shape::Mapping(hinted)) => {
                for (key, hint) in hinted {
                    match fields.iter().position(|(k, _)| *k == key) {
                        Some(i) => {
                            let (_, base) = fields.remove(i);
                            fields.insert(i, (key, Schema::overlay(base, hint)));
                        }
                        None => fields.push((key, hint)),
                    }
                }
                Shape::Mapping(fields)
            }
            (Shape::Sequence(items), Shape::Sequence(hinted)) => {
                Shape::Sequence(Box::new(Schema::overlay(*items, *hinted)))
            }
            (_, explicit) => explicit,
        };

        Schema {
            shape,
            default,
            description,
        }
    }
}

fn infer(value: &Value, path: &mut Vec<String>) -> Result<Schema, SchemaError> {
    check_depth(path)?;

    let schema = match value {
        Value::Object(map) => {
            let mut fields = Vec::with_capacity(map.len());
            for (key, child) in map {
                path.push(key.clone());
                let field = infer(child, path)?;
                path.pop();
                fields.push((key.clone(), field));
            }
            Schema::new(Shape::Mapping(fields))
        }
        Value::Array(items) => {
            let mut item = None::<Schema>;
            for element in items {
                let inferred = infer(element, path)?;
                item = Some(match item {
                    None => inferred,
                    Some(prev) if same_structure(&prev.shape, &inferred.shape) => prev,
                    Some(_) => Schema::any(),
                });
            }
            let mut item = item.unwrap_or_else(Schema::any);
            strip_defaults(&mut item);
            Schema {
                shape: Shape::Sequence(Box::new(item)),
                default: Some(value.clone()),
                description: None,
            }
        }
        Value::String(_) => scalar_with_default(ScalarKind::String, value),
        Value::Number(_) => scalar_with_default(ScalarKind::Number, value),
        Value::Bool(_) => scalar_with_default(ScalarKind::Boolean, value),
        Value::Null => scalar_with_default(ScalarKind::Any, value),
    };

    Ok(schema)
}

/// Whether two shapes have the same kinds and field names, ignoring
/// defaults and descriptions.
fn same_structure(a: &Shape, b: &Shape) -> bool {
    match (a, b) {
        (Shape::Scalar(x), Shape::Scalar(y)) => x == y,
        (Shape::Sequence(x), Shape::Sequence(y)) => same_structure(&x.shape, &y.shape),
        (Shape::Mapping(x), Shape::Mapping(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y)
                    .all(|((ka, va), (kb, vb))| ka == kb && same_structure(&va.shape, &vb.shape))
        }
        _ => false,
    }
}

fn strip_defaults(schema: &mut Schema) {
    schema.default = None;
    match &mut schema.shape {
        Shape::Mapping(fields) => fields.iter_mut().for_each(|(_, f)| strip_defaults(f)),
        Shape::Sequence(item) => strip_defaults(item),
        Shape::Scalar(_) => {}
    }
}

fn scalar_with_default(kind: ScalarKind, value: &Value) -> Schema {
    Schema {
        shape: Shape::Scalar(kind),
        default: Some(value.clone()),
        description: None,
    }
}

fn parse_hint(hint: &Value, path: &mut Vec<String>) -> Result<Schema, SchemaError> {
    check_depth(path)?;

    match hint {
        Value::String(kind) => shape_for_kind(kind, path).map(Schema::new),
        Value::Object(map) => {
            let mut schema = match map.get("$type") {
                Some(Value::String(kind)) => Schema::new(shape_for_kind(kind, path)?),
                Some(other) => {
                    return Err(malformed(path, format!("$type must be a string, found {}", kind_name(other))))
                }
                None => Schema::new(Shape::Mapping(Vec::new())),
            };

            schema.default = map.get("$default").cloned();
            schema.description = match map.get("$description") {
                Some(Value::String(text)) => Some(text.clone()),
                Some(other) => {
                    return Err(malformed(path, format!("$description must be a string, found {}", kind_name(other))))
                }
                None => None,
            };

            if let Some(items) = map.get("$items") {
                let Shape::Sequence(_) = schema.shape else {
                    return Err(malformed(path, "$items is only valid on arrays".to_string()));
                };
                path.push("[]".to_string());
                let item = parse_hint(items, path)?;
                path.pop();
                schema.shape = Shape::Sequence(Box::new(item));
            }

            let children: Vec<(&String, &Value)> =
                map.iter().filter(|(k, _)| !k.starts_with('$')).collect();
            if !children.is_empty() {
                let Shape::Mapping(fields) = &mut schema.shape else {
                    return Err(malformed(path, "only objects can declare fields".to_string()));
                };
                for (key, child) in children {
                    path.push(key.clone());
                    let field = parse_hint(child, path)?;
                    path.pop();
                    fields.push((key.clone(), field));
                }
            }

            Ok(schema)
        }
        other => Err(malformed(
            path,
            format!("expected a type name or a mapping, found {}", kind_name(other)),
        )),
    }
}

fn shape_for_kind(kind: &str, path: &[String]) -> Result<Shape, SchemaError> {
    match kind {
        "string" => Ok(Shape::Scalar(ScalarKind::String)),
        "number" => Ok(Shape::Scalar(ScalarKind::Number)),
        "boolean" => Ok(Shape::Scalar(ScalarKind::Boolean)),
        "any" => Ok(Shape::Scalar(ScalarKind::Any)),
        "array" => Ok(Shape::Sequence(Box::new(Schema::any()))),
        "object" => Ok(Shape::Mapping(Vec::new())),
        other => Err(SchemaError::UnknownKind {
            path: display_path(path),
            kind: other.to_string(),
        }),
    }
}

fn check_depth(path: &[String]) -> Result<(), SchemaError> {
    if path.len() > MAX_SCHEMA_DEPTH {
        return Err(SchemaError::TooDeep {
            path: display_path(path),
            limit: MAX_SCHEMA_DEPTH,
        });
    }
    Ok(())
}

fn malformed(path: &[String], message: String) -> SchemaError {
    SchemaError::MalformedHint {
        path: display_path(path),
        message,
    }
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field<'a>(schema: &'a Schema, key: &str) -> &'a Schema {
        match &schema.shape {
            Shape::Mapping(fields) => &fields.iter().find(|(k, _)| k == key).unwrap().1,
            other => panic!("not a mapping: {other:?}"),
        }
    }

    #[test]
    fn test_infer_keeps_defaults() {
        let schema = Schema::infer_options(&json!({"title": "Docs", "level": 2, "debug": false})).unwrap();

        assert_eq!(field(&schema, "title").shape, Shape::Scalar(ScalarKind::String));
        assert_eq!(field(&schema, "title").default, Some(json!("Docs")));
        assert_eq!(field(&schema, "level").shape, Shape::Scalar(ScalarKind::Number));
        assert_eq!(field(&schema, "debug").shape, Shape::Scalar(ScalarKind::Boolean));
    }

    #[test]
    fn test_infer_array_items() {
        let schema = Schema::infer_options(&json!({"tags": ["a", "b"], "mixed": [1, "x"], "none": []})).unwrap();

        let Shape::Sequence(item) = &field(&schema, "tags").shape else { panic!() };
        assert_eq!(item.shape, Shape::Scalar(ScalarKind::String));
        assert_eq!(field(&schema, "tags").default, Some(json!(["a", "b"])));

        let Shape::Sequence(item) = &field(&schema, "mixed").shape else { panic!() };
        assert_eq!(item.shape, Shape::Scalar(ScalarKind::Any));

        let Shape::Sequence(item) = &field(&schema, "none").shape else { panic!() };
        assert_eq!(item.shape, Shape::Scalar(ScalarKind::Any));
    }

    #[test]
    fn test_infer_rejects_non_mapping() {
        let err = Schema::infer_options(&json!([1])).unwrap_err();
        assert_eq!(err, SchemaError::NotAMapping("array"));
    }

    #[test]
    fn test_hint_notation() {
        let hint = Schema::from_hint(&json!({
            "title": "string",
            "header": {
                "$description": "Site header",
                "logo": {"$type": "boolean", "$default": false}
            },
            "links": {"$type": "array", "$items": "string"}
        }))
        .unwrap();

        assert_eq!(field(&hint, "header").description.as_deref(), Some("Site header"));
        assert_eq!(field(field(&hint, "header"), "logo").default, Some(json!(false)));
        let Shape::Sequence(item) = &field(&hint, "links").shape else { panic!() };
        assert_eq!(item.shape, Shape::Scalar(ScalarKind::String));
    }

    #[test]
    fn test_hint_errors() {
        assert!(matches!(
            Schema::from_hint(&json!({"a": "date"})),
            Err(SchemaError::UnknownKind { ref path, .. }) if path == "a"
        ));
        assert!(matches!(
            Schema::from_hint(&json!({"a": 3})),
            Err(SchemaError::MalformedHint { .. })
        ));
        assert!(matches!(
            Schema::from_hint(&json!({"a": {"$type": "string", "b": "number"}})),
            Err(SchemaError::MalformedHint { .. })
        ));
        assert!(matches!(
            Schema::from_hint(&json!({"a": {"$type": "string", "$items": "number"}})),
            Err(SchemaError::MalformedHint { .. })
        ));
    }

    #[test]
    fn test_overlay_explicit_wins_and_defaults_survive() {
        let inferred = Schema::infer_options(&json!({"accent": "red", "size": 3})).unwrap();
        let explicit = Schema::from_hint(&json!({
            "accent": {"$type": "any", "$description": "Accent color"},
            "extra": "boolean"
        }))
        .unwrap();

        let merged = Schema::overlay(inferred, explicit);
        let accent = field(&merged, "accent");
        assert_eq!(accent.shape, Shape::Scalar(ScalarKind::Any));
        assert_eq!(accent.default, Some(json!("red")));
        assert_eq!(accent.description.as_deref(), Some("Accent color"));
        assert_eq!(field(&merged, "size").shape, Shape::Scalar(ScalarKind::Number));
        assert_eq!(field(&merged, "extra").shape, Shape::Scalar(ScalarKind::Boolean));

        let Shape::Mapping(fields) = &merged.shape else { panic!() };
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["accent", "size", "extra"]);
    }
}
