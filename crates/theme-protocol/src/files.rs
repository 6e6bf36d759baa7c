//! Generated file names.
//!
//! Downstream imports resolve these names directly, so they must stay stable
//! across regenerations.

/// Options type declaration (`ThemeOptions`, `OptionsPaths`).
pub const OPTIONS_TYPES: &str = "options-types.d.ts";

/// Options accessor module.
pub const OPTIONS_MODULE: &str = "options.ts";

/// Token type declaration (`ThemeTokens`, `TokenPaths`).
pub const TOKENS_TYPES: &str = "tokens-types.d.ts";

/// Typed token accessor module.
pub const TOKENS_MODULE: &str = "tokens.ts";

/// Untyped token accessor module.
pub const TOKENS_SCRIPT: &str = "tokens.js";

/// CSS custom properties stylesheet.
pub const CSS_VARIABLES: &str = "variables.css";

/// SCSS variables partial.
pub const SCSS_VARIABLES: &str = "_variables.scss";

/// Flat token name to value map.
pub const TOKENS_JSON: &str = "tokens.json";

/// Every file produced by the design token platforms.
pub const TOKEN_OUTPUTS: &[&str] = &[
    TOKENS_TYPES,
    TOKENS_MODULE,
    TOKENS_SCRIPT,
    CSS_VARIABLES,
    SCSS_VARIABLES,
    TOKENS_JSON,
];

/// Every file produced by the options typing generator.
pub const OPTIONS_OUTPUTS: &[&str] = &[OPTIONS_TYPES, OPTIONS_MODULE];
