//! Token flattening and reference resolution.
//!
//! A token is any mapping carrying a `value` key. Every other mapping is a
//! group. Non-mapping values inside a group are ignored.
//!
//! String values may reference other tokens with `{group.token}`. A value
//! that is exactly one reference takes the referenced value as-is (numbers
//! stay numbers); references embedded in a longer string are substituted as
//! text.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde_json::{Map, Value};

use crate::error::{TransformError, TransformResult};
use crate::naming::NameCase;

/// Maximum group nesting accepted in a token tree.
pub const MAX_TOKEN_DEPTH: usize = 64;

/// One flattened design token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Path segments from the tree root.
    pub path: Vec<String>,
    /// Variable name produced by the naming transform.
    pub name: String,
    /// Value with references resolved.
    pub value: Value,
    /// The mapping as authored.
    pub original: Map<String, Value>,
}

impl Token {
    /// Dot-joined path (`color.red.900`).
    pub fn dot_path(&self) -> String {
        self.path.join(".")
    }

    /// CSS variable reference (`var(--color-red-900)`).
    pub fn variable(&self) -> String {
        format!("var(--{})", self.name)
    }

    /// Resolved value as CSS/SCSS text.
    pub fn value_text(&self) -> String {
        value_to_text(&self.value)
    }

    /// Leaf object embedded in accessor modules.
    ///
    /// Authored keys keep their order, `value` is replaced by the resolved
    /// value, then `name` and `variable` are appended.
    pub fn to_leaf(&self) -> Value {
        let mut leaf = self.original.clone();
        leaf.insert("value".to_string(), self.value.clone());
        leaf.insert("name".to_string(), Value::String(self.name.clone()));
        leaf.insert("variable".to_string(), Value::String(self.variable()));
        Value::Object(leaf)
    }
}

/// Token tree shape, with leaves indexing into [`Dictionary::tokens`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenTree {
    Group(Vec<(String, TokenTree)>),
    Leaf(usize),
}

/// Flattened tokens plus the tree they came from.
#[derive(Debug, Clone)]
pub struct Dictionary {
    pub tokens: Vec<Token>,
    pub tree: TokenTree,
}

impl Dictionary {
    /// Flatten a token tree, name every token and resolve references.
    pub fn build(tokens: &Value, case: NameCase) -> TransformResult<Self> {
        let root = tokens
            .as_object()
            .ok_or_else(|| TransformError::NotAMapping(kind_name(tokens)))?;

        let mut raw = Vec::new();
        let tree = collect(root, &mut Vec::new(), &mut raw, 0)?;
        let values = resolve_all(&raw)?;

        let mut seen: HashMap<String, String> = HashMap::new();
        let mut flat = Vec::with_capacity(raw.len());
        for ((path, original), value) in raw.into_iter().zip(values) {
            let name = case.apply(&path);
            let dot = path.join(".");
            if let Some(first) = seen.insert(name.clone(), dot.clone()) {
                return Err(TransformError::DuplicateName {
                    name,
                    first,
                    second: dot,
                });
            }
            flat.push(Token {
                path,
                name,
                value,
                original,
            });
        }

        Ok(Self { tokens: flat, tree })
    }

    /// Rebuild the nested tree with each token rendered by `leaf`.
    pub fn nested<F>(&self, leaf: F) -> Value
    where
        F: Fn(&Token) -> Value,
    {
        fn walk<F: Fn(&Token) -> Value>(tree: &TokenTree, tokens: &[Token], leaf: &F) -> Value {
            match tree {
                TokenTree::Leaf(i) => leaf(&tokens[*i]),
                TokenTree::Group(children) => {
                    let mut map = Map::new();
                    for (key, child) in children {
                        map.insert(key.clone(), walk(child, tokens, leaf));
                    }
                    Value::Object(map)
                }
            }
        }
        walk(&self.tree, &self.tokens, &leaf)
    }
}

type RawToken = (Vec<String>, Map<String, Value>);

fn collect(
    map: &Map<String, Value>,
    path: &mut Vec<String>,
    out: &mut Vec<RawToken>,
    depth: usize,
) -> TransformResult<TokenTree> {
    if depth > MAX_TOKEN_DEPTH {
        return Err(TransformError::TooDeep(MAX_TOKEN_DEPTH));
    }

    let mut children = Vec::new();
    for (key, value) in map {
        let Value::Object(child) = value else {
            continue;
        };

        path.push(key.clone());
        if child.contains_key("value") {
            out.push((path.clone(), child.clone()));
            children.push((key.clone(), TokenTree::Leaf(out.len() - 1)));
        } else {
            let sub = collect(child, path, out, depth + 1)?;
            children.push((key.clone(), sub));
        }
        path.pop();
    }

    Ok(TokenTree::Group(children))
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("reference pattern is valid"))
}

fn resolve_all(raw: &[RawToken]) -> TransformResult<Vec<Value>> {
    let index: HashMap<String, usize> = raw
        .iter()
        .enumerate()
        .map(|(i, (path, _))| (path.join("."), i))
        .collect();

    let mut resolved: Vec<Option<Value>> = vec![None; raw.len()];
    for i in 0..raw.len() {
        resolve_one(i, raw, &index, &mut resolved, &mut Vec::new())?;
    }

    Ok(resolved
        .into_iter()
        .map(|v| v.unwrap_or(Value::Null))
        .collect())
}

fn resolve_one(
    i: usize,
    raw: &[RawToken],
    index: &HashMap<String, usize>,
    resolved: &mut Vec<Option<Value>>,
    stack: &mut Vec<usize>,
) -> TransformResult<Value> {
    if let Some(value) = &resolved[i] {
        return Ok(value.clone());
    }

    if let Some(pos) = stack.iter().position(|&s| s == i) {
        let chain: Vec<String> = stack[pos..]
            .iter()
            .chain(std::iter::once(&i))
            .map(|&s| raw[s].0.join("."))
            .collect();
        return Err(TransformError::CircularReference(chain.join(" -> ")));
    }

    let authored = raw[i].1.get("value").cloned().unwrap_or(Value::Null);
    let Value::String(text) = &authored else {
        resolved[i] = Some(authored.clone());
        return Ok(authored);
    };

    let pattern = reference_pattern();
    if !pattern.is_match(text) {
        resolved[i] = Some(authored.clone());
        return Ok(authored);
    }

    stack.push(i);
    let mut lookup = |reference: &str| -> TransformResult<Value> {
        let target = index
            .get(reference.trim())
            .copied()
            .ok_or_else(|| TransformError::UnknownReference {
                token: raw[i].0.join("."),
                reference: reference.trim().to_string(),
            })?;
        resolve_one(target, raw, index, resolved, stack)
    };

    let whole = pattern
        .captures(text)
        .filter(|caps| caps.get(0).map(|m| m.as_str().len()) == Some(text.len()));

    let value = if let Some(caps) = whole {
        lookup(&caps[1])?
    } else {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in pattern.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            out.push_str(&text[last..m.start()]);
            out.push_str(&value_to_text(&lookup(&caps[1])?));
            last = m.end();
        }
        out.push_str(&text[last..]);
        Value::String(out)
    };
    stack.pop();

    resolved[i] = Some(value.clone());
    Ok(value)
}

/// Render a token value as stylesheet text.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn kind_name(value: &Value) -> &'static str {
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

    fn build(tokens: Value) -> TransformResult<Dictionary> {
        Dictionary::build(&tokens, NameCase::Kebab)
    }

    #[test]
    fn test_flatten_order_and_names() {
        let dict = build(json!({
            "color": {
                "gray": {"light": {"value": "#ccc"}},
                "green": {"value": "#0f0"}
            },
            "space": {"sm": {"value": 4}}
        }))
        .unwrap();

        let paths: Vec<String> = dict.tokens.iter().map(Token::dot_path).collect();
        assert_eq!(paths, vec!["color.gray.light", "color.green", "space.sm"]);
        assert_eq!(dict.tokens[0].name, "color-gray-light");
        assert_eq!(dict.tokens[0].variable(), "var(--color-gray-light)");
    }

    #[test]
    fn test_whole_reference_keeps_type() {
        let dict = build(json!({
            "base": {"value": 8},
            "gap": {"value": "{base}"}
        }))
        .unwrap();

        assert_eq!(dict.tokens[1].value, json!(8));
    }

    #[test]
    fn test_embedded_reference_substitutes_text() {
        let dict = build(json!({
            "color": {"red": {"900": {"value": "#2E0C16"}}},
            "borders": {"base": {"value": "2px solid {color.red.900}"}}
        }))
        .unwrap();

        assert_eq!(dict.tokens[1].value, json!("2px solid #2E0C16"));
    }

    #[test]
    fn test_chained_reference_declared_before_target() {
        let dict = build(json!({
            "a": {"value": "{b}"},
            "b": {"value": "{c}"},
            "c": {"value": "blue"}
        }))
        .unwrap();

        assert_eq!(dict.tokens[0].value, json!("blue"));
        assert_eq!(dict.tokens[1].value, json!("blue"));
    }

    #[test]
    fn test_unknown_reference() {
        let err = build(json!({"a": {"value": "{missing.token}"}})).unwrap_err();
        assert!(matches!(err, TransformError::UnknownReference { .. }));
        assert!(err.to_string().contains("missing.token"));
    }

    #[test]
    fn test_circular_reference() {
        let err = build(json!({
            "a": {"value": "{b}"},
            "b": {"value": "{a}"}
        }))
        .unwrap_err();

        match err {
            TransformError::CircularReference(chain) => assert_eq!(chain, "a -> b -> a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = build(json!({
            "fontSize": {"value": 1},
            "font": {"size": {"value": 2}}
        }))
        .unwrap_err();

        assert!(matches!(err, TransformError::DuplicateName { .. }));
    }

    #[test]
    fn test_non_mapping_root() {
        let err = build(json!([1, 2])).unwrap_err();
        assert!(matches!(err, TransformError::NotAMapping("array")));
    }

    #[test]
    fn test_nested_leaf_rendering() {
        let dict = build(json!({
            "color": {"green": {"value": "#0f0", "comment": "go"}}
        }))
        .unwrap();

        let tree = dict.nested(Token::to_leaf);
        assert_eq!(tree["color"]["green"]["value"], "#0f0");
        assert_eq!(tree["color"]["green"]["comment"], "go");
        assert_eq!(tree["color"]["green"]["variable"], "var(--color-green)");
    }
}
