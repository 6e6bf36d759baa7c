//! Design Token Transform
//!
//! Turns a nested design token tree into platform files: flat JSON, CSS
//! custom properties, SCSS variables and typed/untyped accessor modules.
//!
//! The engine drives this crate through [`TokenTransformer`]. It hands over
//! the merged token tree and gets back the rendered files; writing them is
//! the caller's job.

pub mod error;
pub mod format;
pub mod naming;
pub mod token;
pub mod ts;

pub use error::{TransformError, TransformResult};
pub use format::Format;
pub use naming::NameCase;
pub use token::{Dictionary, Token, TokenTree};

use serde_json::Value;

/// Options for one transform invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    /// Naming transform for generated variable names.
    pub name_case: NameCase,
    /// Suppress the per-file build log.
    pub quiet: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            name_case: NameCase::Kebab,
            quiet: true,
        }
    }
}

/// Target platform of an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Scss,
    Json,
    Ts,
    Js,
    Css,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Scss => write!(f, "scss"),
            Platform::Json => write!(f, "json"),
            Platform::Ts => write!(f, "ts"),
            Platform::Js => write!(f, "js"),
            Platform::Css => write!(f, "css"),
        }
    }
}

/// One file a platform produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub destination: String,
    pub format: Format,
}

/// A platform and the files it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    pub platform: Platform,
    pub files: Vec<FileConfig>,
}

/// A rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub platform: Platform,
    pub destination: String,
    pub contents: String,
}

/// A token transform tool.
pub trait TokenTransformer {
    /// Render every configured platform for `tokens`.
    fn transform(
        &self,
        tokens: &Value,
        options: &TransformOptions,
    ) -> TransformResult<Vec<OutputFile>>;

    /// Every destination this transformer can produce.
    fn destinations(&self) -> Vec<String>;
}

/// Built-in transformer configured with a list of platforms.
#[derive(Debug, Clone)]
pub struct StyleBuilder {
    platforms: Vec<PlatformConfig>,
}

impl StyleBuilder {
    /// Create a builder with explicit platforms.
    pub fn new(platforms: Vec<PlatformConfig>) -> Self {
        Self { platforms }
    }
}

impl Default for StyleBuilder {
    /// The standard theme platform set.
    fn default() -> Self {
        let file = |destination: &str, format| FileConfig {
            destination: destination.to_string(),
            format,
        };

        Self::new(vec![
            PlatformConfig {
                platform: Platform::Scss,
                files: vec![file("_variables.scss", Format::ScssVariables)],
            },
            PlatformConfig {
                platform: Platform::Json,
                files: vec![file("tokens.json", Format::JsonFlat)],
            },
            PlatformConfig {
                platform: Platform::Ts,
                files: vec![
                    file("tokens.ts", Format::TypescriptModule),
                    file("tokens-types.d.ts", Format::TypescriptDeclaration),
                ],
            },
            PlatformConfig {
                platform: Platform::Js,
                files: vec![file("tokens.js", Format::JavascriptModule)],
            },
            PlatformConfig {
                platform: Platform::Css,
                files: vec![file("variables.css", Format::CssVariables)],
            },
        ])
    }
}

impl TokenTransformer for StyleBuilder {
    fn transform(
        &self,
        tokens: &Value,
        options: &TransformOptions,
    ) -> TransformResult<Vec<OutputFile>> {
        let dict = Dictionary::build(tokens, options.name_case)?;

        let mut outputs = Vec::new();
        for platform in &self.platforms {
            for file in &platform.files {
                let contents = file.format.render(&dict)?;
                if !options.quiet {
                    tracing::info!(
                        platform = %platform.platform,
                        file = %file.destination,
                        tokens = dict.tokens.len(),
                        "built token output"
                    );
                }
                outputs.push(OutputFile {
                    platform: platform.platform,
                    destination: file.destination.clone(),
                    contents,
                });
            }
        }

        Ok(outputs)
    }

    fn destinations(&self) -> Vec<String> {
        self.platforms
            .iter()
            .flat_map(|p| p.files.iter().map(|f| f.destination.clone()))
            .collect()
    }
}
