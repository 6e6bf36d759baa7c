//! Options typing generator
//!
//! Renders the merged options as a type declaration (`ThemeOptions`,
//! `OptionsPaths`) and an accessor module. Rendering is deterministic:
//! identical input yields byte-identical text.

use serde_json::Value;
use theme_protocol::files;
use theme_tokens::ts;

use crate::artifact::GeneratedArtifact;
use crate::paths::enumerate_paths;
use crate::schema::{ScalarKind, Schema, SchemaError, Shape};

/// Interface name of the rendered options type.
pub const OPTIONS_INTERFACE: &str = "ThemeOptions";

/// Name of the options path union.
pub const OPTIONS_PATHS_TYPE: &str = "OptionsPaths";

/// Rendered options artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsTyping {
    /// `options-types.d.ts` contents.
    pub declaration: String,
    /// `options.ts` contents.
    pub module: String,
}

impl OptionsTyping {
    pub fn artifacts(&self) -> Vec<GeneratedArtifact> {
        vec![
            GeneratedArtifact::new(files::OPTIONS_TYPES, self.declaration.clone()),
            GeneratedArtifact::new(files::OPTIONS_MODULE, self.module.clone()),
        ]
    }
}

/// Generate the options declaration and accessor module.
pub fn generate_options_typing(
    options: &Value,
    explicit_schema: Option<&Value>,
) -> Result<OptionsTyping, SchemaError> {
    let inferred = Schema::infer_options(options)?;
    let schema = match explicit_schema {
        Some(hint) => Schema::overlay(inferred, Schema::from_hint(hint)?),
        None => inferred,
    };

    let paths = enumerate_paths(options);

    let mut declaration = String::new();
    declaration.push_str(&format!("export interface {} ", OPTIONS_INTERFACE));
    render_type(&schema, 0, &mut declaration);
    declaration.push_str("\n\n");
    declaration.push_str(&format!(
        "export type {} = {}\n",
        OPTIONS_PATHS_TYPE,
        ts::literal_union(&paths)
    ));

    let embedded = format!("{:#}", options);

    let module = format!(
        "import type {{ {iface}, {paths} }} from './options-types'

export * from './options-types'

export const themeOptions: {iface} = {embedded}

const get = (obj: any, path: string): any =>
  path.split('.').reduce((acc, key) => (acc == null ? undefined : acc[key]), obj)

export const $options = (path: {paths}) => get(themeOptions, path)

export const $o = $options
",
        iface = OPTIONS_INTERFACE,
        paths = OPTIONS_PATHS_TYPE,
    );

    Ok(OptionsTyping {
        declaration,
        module,
    })
}

fn render_type(schema: &Schema, depth: usize, out: &mut String) {
    match &schema.shape {
        Shape::Scalar(kind) => out.push_str(scalar_name(*kind)),
        Shape::Sequence(item) => {
            out.push_str("Array<");
            render_type(item, depth, out);
            out.push('>');
        }
        Shape::Mapping(fields) if fields.is_empty() => {
            out.push_str("{ [key: string]: any }");
        }
        Shape::Mapping(fields) => {
            out.push_str("{\n");
            for (key, field) in fields {
                let indent = "  ".repeat(depth + 1);
                render_doc(field, &indent, out);
                out.push_str(&indent);
                out.push_str(&ts::property_key(key));
                out.push_str(": ");
                render_type(field, depth + 1, out);
                out.push_str(",\n");
            }
            out.push_str(&"  ".repeat(depth));
            out.push('}');
        }
    }
}

fn render_doc(schema: &Schema, indent: &str, out: &mut String) {
    let default = match (&schema.shape, &schema.default) {
        (Shape::Mapping(_), _) | (_, None) => None,
        (_, Some(value)) => Some(value.to_string()),
    };
    if schema.description.is_none() && default.is_none() {
        return;
    }

    out.push_str(indent);
    out.push_str("/**\n");
    if let Some(description) = &schema.description {
        for line in description.lines() {
            out.push_str(&format!("{} * {}\n", indent, line.replace("*/", "*\\/")));
        }
    }
    if let Some(default) = default {
        out.push_str(&format!("{} * @default {}\n", indent, default.replace("*/", "*\\/")));
    }
    out.push_str(indent);
    out.push_str(" */\n");
}

fn scalar_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::String => "string",
        ScalarKind::Number => "number",
        ScalarKind::Boolean => "boolean",
        ScalarKind::Any => "any",
    }
}
