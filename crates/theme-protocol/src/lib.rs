//! Theme Protocol Types
//!
//! The contract surface shared between the theme engine and whatever serves
//! it: cache keys, generated file names, the live-reload event and the
//! endpoint payload shapes.

pub mod event;
pub mod files;
pub mod payload;

pub use event::ThemeUpdate;
pub use payload::{ConfigPayload, OptionsPayload, TokensPayload};

/// Cache key holding the merged theme options.
pub const OPTIONS_CACHE_KEY: &str = "cache:theme:options.json";

/// Cache key holding the merged design tokens.
pub const TOKENS_CACHE_KEY: &str = "cache:theme:tokens.json";

/// Live-reload event name published after every successful refresh.
pub const UPDATE_EVENT: &str = "theme:options:update";

/// Current package version string.
pub const KIT_VERSION: &str = env!("CARGO_PKG_VERSION");
