//! Theme Kit - layered theme options and design tokens
//!
//! Collects theme configuration declared across an ordered list of
//! configuration layers, merges it with deterministic precedence and
//! generates typed accessor artifacts for the result:
//! - `config`: per-layer source resolution and the merge engine
//! - `paths` / `schema` / `typing`: path enumeration and options typing
//! - `tokens`: design token outputs through a [`theme_tokens::TokenTransformer`]
//! - `refresh`: single-flight orchestration of full passes
//! - `store` / `publish` / `server`: the cache, live-reload and endpoint seams

pub mod artifact;
pub mod config;
pub mod layers;
pub mod paths;
pub mod publish;
pub mod refresh;
pub mod schema;
pub mod server;
pub mod store;
pub mod tokens;
pub mod typing;
pub mod watch;

pub use artifact::{ArtifactError, ArtifactSet, CommitReport, GeneratedArtifact};
pub use config::{
    merge_layers, ConfigurationLayer, MergedTheme, ModuleOptions, ThemeMeta,
};
pub use layers::{LayerDirs, LayerError, LayerSource};
pub use paths::{enumerate_paths, lookup_path};
pub use publish::{ChannelPublisher, NullPublisher, UpdatePublisher};
pub use refresh::{PassReport, RefreshError, RefreshOutcome, RefreshPhase, Refresher, Trigger};
pub use schema::{Schema, SchemaError};
pub use server::{Method, ThemeEndpoints};
pub use store::{CacheStore, FileStore, MemoryStore, StoreError};
pub use tokens::{generate_token_artifacts, render_token_artifacts, TokenArtifactError, TokenBuildOptions};
pub use typing::{generate_options_typing, OptionsTyping};
