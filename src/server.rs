//! Endpoint handlers
//!
//! Transport-free handlers for the options, config and tokens endpoints.
//! The hosting server maps its requests onto [`Method`] plus the raw body
//! and serializes the returned value as the response.
//!
//! POST bodies that fail to parse are ignored: the handler answers with
//! the current cached value.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use theme_protocol::{ConfigPayload, OptionsPayload, TokensPayload, OPTIONS_CACHE_KEY, TOKENS_CACHE_KEY};
use theme_tokens::NameCase;

use crate::store::{CacheStore, StoreError};
use crate::tokens::{generate_token_artifacts, TokenBuildOptions};

/// Request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Handlers sharing one store and build directory.
#[derive(Clone)]
pub struct ThemeEndpoints {
    store: Arc<dyn CacheStore>,
    build_dir: PathBuf,
    name_case: NameCase,
}

impl ThemeEndpoints {
    pub fn new(store: Arc<dyn CacheStore>, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            build_dir: build_dir.into(),
            name_case: NameCase::Kebab,
        }
    }

    pub fn with_name_case(mut self, name_case: NameCase) -> Self {
        self.name_case = name_case;
        self
    }

    /// `GET` returns the cached options; `POST {options}` overwrites them.
    pub fn options(&self, method: Method, body: Option<&str>) -> Result<Value, StoreError> {
        if method == Method::Post {
            if let Some(OptionsPayload { options: Some(options) }) = parse_body(body) {
                self.store.set(OPTIONS_CACHE_KEY, &options)?;
            }
        }
        self.cached(OPTIONS_CACHE_KEY)
    }

    /// `GET` returns `{tokens, options}`; `POST` overwrites either.
    pub fn config(&self, method: Method, body: Option<&str>) -> Result<Value, StoreError> {
        if method == Method::Post {
            if let Some(payload) = parse_body::<ConfigPayload>(body) {
                if let Some(tokens) = payload.tokens {
                    self.store.set(TOKENS_CACHE_KEY, &tokens)?;
                }
                if let Some(options) = payload.options {
                    self.store.set(OPTIONS_CACHE_KEY, &options)?;
                }
            }
        }

        let response = ConfigPayload {
            tokens: self.store.get(TOKENS_CACHE_KEY)?,
            options: self.store.get(OPTIONS_CACHE_KEY)?,
        };
        Ok(serde_json::to_value(response)?)
    }

    /// `GET` returns the cached tokens; `POST {tokens}` stores them and
    /// regenerates the token artifacts in place.
    pub fn tokens(&self, method: Method, body: Option<&str>) -> Result<Value, StoreError> {
        if method == Method::Post {
            if let Some(TokensPayload { tokens: Some(tokens) }) = parse_body(body) {
                self.store.set(TOKENS_CACHE_KEY, &tokens)?;
                let options = TokenBuildOptions {
                    silent: true,
                    force: false,
                    name_case: self.name_case,
                };
                generate_token_artifacts(&tokens, &self.build_dir, options);
            }
        }
        self.cached(TOKENS_CACHE_KEY)
    }

    /// Rebuild the token artifacts from the cached tokens.
    pub fn generate_tokens(&self) -> Result<bool, StoreError> {
        let Some(tokens) = self.store.get(TOKENS_CACHE_KEY)? else {
            tracing::debug!("no cached tokens to generate from");
            return Ok(false);
        };
        let options = TokenBuildOptions {
            name_case: self.name_case,
            ..Default::default()
        };
        Ok(generate_token_artifacts(&tokens, &self.build_dir, options))
    }

    fn cached(&self, key: &str) -> Result<Value, StoreError> {
        Ok(self.store.get(key)?.unwrap_or(Value::Null))
    }
}

fn parse_body<T: DeserializeOwned>(body: Option<&str>) -> Option<T> {
    let body = body?;
    match serde_json::from_str(body) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring malformed request body");
            None
        }
    }
}

impl std::fmt::Debug for ThemeEndpoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEndpoints")
            .field("build_dir", &self.build_dir)
            .field("name_case", &self.name_case)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;
    use theme_protocol::files;

    fn endpoints(dir: &TempDir) -> ThemeEndpoints {
        ThemeEndpoints::new(Arc::new(MemoryStore::new()), dir.path())
    }

    #[test]
    fn test_options_get_and_post() {
        let dir = TempDir::new().unwrap();
        let api = endpoints(&dir);

        assert_eq!(api.options(Method::Get, None).unwrap(), Value::Null);

        let posted = api
            .options(Method::Post, Some(r#"{"options": {"title": "Docs"}}"#))
            .unwrap();
        assert_eq!(posted, json!({"title": "Docs"}));
        assert_eq!(api.options(Method::Get, None).unwrap(), json!({"title": "Docs"}));
    }

    #[test]
    fn test_malformed_body_returns_current_value() {
        let dir = TempDir::new().unwrap();
        let api = endpoints(&dir);
        api.options(Method::Post, Some(r#"{"options": {"a": 1}}"#)).unwrap();

        assert_eq!(api.options(Method::Post, Some("{ nope")).unwrap(), json!({"a": 1}));
        assert_eq!(api.options(Method::Post, Some(r#"{"other": 1}"#)).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_config_endpoint() {
        let dir = TempDir::new().unwrap();
        let api = endpoints(&dir);

        assert_eq!(
            api.config(Method::Get, None).unwrap(),
            json!({"tokens": null, "options": null})
        );

        let response = api
            .config(Method::Post, Some(r#"{"tokens": {"c": {"value": 1}}}"#))
            .unwrap();
        assert_eq!(response, json!({"tokens": {"c": {"value": 1}}, "options": null}));
    }

    #[test]
    fn test_tokens_post_regenerates_without_force() {
        let dir = TempDir::new().unwrap();
        let api = endpoints(&dir);
        fs::write(dir.path().join(files::OPTIONS_MODULE), "keep").unwrap();

        let body = r##"{"tokens": {"color": {"primary": {"value": "#00dc82"}}}}"##;
        let response = api.tokens(Method::Post, Some(body)).unwrap();

        assert_eq!(response["color"]["primary"]["value"], "#00dc82");
        let css = fs::read_to_string(dir.path().join(files::CSS_VARIABLES)).unwrap();
        assert!(css.contains("--color-primary: #00dc82;"));
        assert_eq!(fs::read_to_string(dir.path().join(files::OPTIONS_MODULE)).unwrap(), "keep");
    }

    #[test]
    fn test_generate_from_cache() {
        let dir = TempDir::new().unwrap();
        let api = endpoints(&dir);
        assert!(!api.generate_tokens().unwrap());

        api.config(Method::Post, Some(r#"{"tokens": {"space": {"sm": {"value": "4px"}}}}"#))
            .unwrap();
        assert!(api.generate_tokens().unwrap());
        assert!(dir.path().join(files::SCSS_VARIABLES).exists());
    }
}
