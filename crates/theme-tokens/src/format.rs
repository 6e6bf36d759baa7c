//! Output formats.
//!
//! Each format renders a whole [`Dictionary`] into the text of one file.

use serde_json::{Map, Value};

use crate::error::TransformResult;
use crate::token::{Dictionary, Token, TokenTree};
use crate::ts;

/// Declaration shared by the typed outputs.
const DESIGN_TOKEN_TYPE: &str = "export interface DesignToken {
  value: any;
  name?: string;
  comment?: string;
  themeable?: boolean;
  variable?: string;
  attributes?: {
    category?: string;
    type?: string;
    item?: string;
    subitem?: string;
    state?: string;
    [key: string]: any;
  };
  [key: string]: any;
}";

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `$name: value;` lines.
    ScssVariables,
    /// `{ "name": value }` object.
    JsonFlat,
    /// `:root { --name: value; }` block.
    CssVariables,
    /// `ThemeTokens` interface and `TokenPaths` union.
    TypescriptDeclaration,
    /// Typed accessor module.
    TypescriptModule,
    /// Untyped accessor module.
    JavascriptModule,
}

impl Format {
    /// Render the dictionary in this format.
    pub fn render(&self, dict: &Dictionary) -> TransformResult<String> {
        match self {
            Format::ScssVariables => Ok(scss_variables(dict)),
            Format::JsonFlat => json_flat(dict),
            Format::CssVariables => Ok(css_variables(dict)),
            Format::TypescriptDeclaration => Ok(typescript_declaration(dict)),
            Format::TypescriptModule => typescript_module(dict),
            Format::JavascriptModule => javascript_module(dict),
        }
    }
}

fn scss_variables(dict: &Dictionary) -> String {
    let mut out = String::new();
    for token in &dict.tokens {
        out.push_str(&format!("${}: {};\n", token.name, token.value_text()));
    }
    out
}

fn json_flat(dict: &Dictionary) -> TransformResult<String> {
    let mut map = Map::new();
    for token in &dict.tokens {
        map.insert(token.name.clone(), token.value.clone());
    }
    let mut text = serde_json::to_string_pretty(&Value::Object(map))?;
    text.push('\n');
    Ok(text)
}

fn css_variables(dict: &Dictionary) -> String {
    let mut out = String::from(":root {\n");
    for token in &dict.tokens {
        out.push_str(&format!("  --{}: {};\n", token.name, token.value_text()));
    }
    out.push_str("}\n");
    out
}

fn typescript_declaration(dict: &Dictionary) -> String {
    let paths: Vec<String> = dict.tokens.iter().map(Token::dot_path).collect();

    let mut out = String::new();
    out.push_str(DESIGN_TOKEN_TYPE);
    out.push_str("\n\n");
    out.push_str("export interface ThemeTokens ");
    render_interface(&dict.tree, 0, &mut out);
    out.push_str("\n\n");
    out.push_str(&format!("export type TokenPaths = {}\n", ts::literal_union(&paths)));
    out
}

fn render_interface(tree: &TokenTree, depth: usize, out: &mut String) {
    match tree {
        TokenTree::Leaf(_) => out.push_str("DesignToken"),
        TokenTree::Group(children) => {
            if children.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{\n");
            for (key, child) in children {
                out.push_str(&"  ".repeat(depth + 1));
                out.push_str(&ts::property_key(key));
                out.push_str(": ");
                render_interface(child, depth + 1, out);
                out.push('\n');
            }
            out.push_str(&"  ".repeat(depth));
            out.push('}');
        }
    }
}

fn typescript_module(dict: &Dictionary) -> TransformResult<String> {
    let tree = serde_json::to_string_pretty(&dict.nested(Token::to_leaf))?;

    Ok(format!(
        "import type {{ DesignToken, ThemeTokens, TokenPaths }} from './tokens-types'

export * from './tokens-types'

export const themeTokens: ThemeTokens = {tree}

const get = (obj: any, path: string): any =>
  path.split('.').reduce((acc, key) => (acc == null ? undefined : acc[key]), obj)

export const $tokens = (path: TokenPaths): DesignToken => get(themeTokens, path)

export const $t = $tokens

export const $variable = (path: TokenPaths): string => $tokens(path)?.variable
"
    ))
}

fn javascript_module(dict: &Dictionary) -> TransformResult<String> {
    let tree = serde_json::to_string_pretty(&dict.nested(Token::to_leaf))?;

    Ok(format!(
        "export const themeTokens = {tree}

const get = (obj, path) =>
  path.split('.').reduce((acc, key) => (acc == null ? undefined : acc[key]), obj)

/**
 * Get a theme token by its path
 * @param {{string}} path
 */
export const $tokens = (path) => get(themeTokens, path)

export const $t = $tokens

/**
 * Get the CSS variable of a theme token by its path
 * @param {{string}} path
 */
export const $variable = (path) => {{
  const token = $tokens(path)
  return token ? token.variable : undefined
}}

export default {{ $t, $tokens, $variable, themeTokens }}
"
    ))
}
