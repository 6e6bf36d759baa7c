//! Token artifact generation
//!
//! Bridges the merged token tree and the transform tool. Rendering is pure;
//! [`generate_token_artifacts`] adds the commit and never lets an error
//! escape.

use serde_json::Value;
use std::path::Path;
use theme_tokens::{NameCase, StyleBuilder, TokenTransformer, TransformError, TransformOptions};
use thiserror::Error;

use crate::artifact::{self, ArtifactError, ArtifactSet, GeneratedArtifact};

/// Token artifact errors
#[derive(Debug, Error)]
pub enum TokenArtifactError {
    #[error("token transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("failed to write token artifacts: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Options for a standalone token build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBuildOptions {
    /// Suppress the transform tool's per-file log.
    pub silent: bool,
    /// Remove previously generated token outputs before the swap.
    pub force: bool,
    pub name_case: NameCase,
}

impl Default for TokenBuildOptions {
    fn default() -> Self {
        Self {
            silent: true,
            force: true,
            name_case: NameCase::Kebab,
        }
    }
}

impl TokenBuildOptions {
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            name_case: self.name_case,
            quiet: self.silent,
        }
    }
}

/// Render the token outputs of `tokens` without touching the filesystem.
pub fn render_token_artifacts(
    tokens: &Value,
    transformer: &dyn TokenTransformer,
    options: &TransformOptions,
) -> Result<ArtifactSet, TokenArtifactError> {
    let outputs = transformer.transform(tokens, options)?;

    let mut set = ArtifactSet::new();
    set.extend(
        outputs
            .into_iter()
            .map(|output| GeneratedArtifact::new(output.destination, output.contents)),
    );
    Ok(set)
}

/// Render and write the token outputs into `output_dir`.
///
/// Returns whether the build succeeded. On failure the error is logged and
/// files from previous builds are left as they were.
pub fn generate_token_artifacts(
    tokens: &Value,
    output_dir: &Path,
    options: TokenBuildOptions,
) -> bool {
    generate_with(&StyleBuilder::default(), tokens, output_dir, options)
}

/// [`generate_token_artifacts`] with an explicit transformer.
pub fn generate_with(
    transformer: &dyn TokenTransformer,
    tokens: &Value,
    output_dir: &Path,
    options: TokenBuildOptions,
) -> bool {
    match build(transformer, tokens, output_dir, options) {
        Ok(report) => {
            tracing::debug!(
                output_dir = %output_dir.display(),
                written = report.written.len(),
                unchanged = report.unchanged.len(),
                "generated token artifacts"
            );
            true
        }
        Err(e) => {
            tracing::error!(output_dir = %output_dir.display(), error = %e, "token generation failed");
            false
        }
    }
}

fn build(
    transformer: &dyn TokenTransformer,
    tokens: &Value,
    output_dir: &Path,
    options: TokenBuildOptions,
) -> Result<artifact::CommitReport, TokenArtifactError> {
    let set = render_token_artifacts(tokens, transformer, &options.transform_options())?;

    let destinations = transformer.destinations();
    let remove_first: Vec<&str> = if options.force {
        destinations.iter().map(String::as_str).collect()
    } else {
        Vec::new()
    };

    Ok(artifact::commit(&set, output_dir, &remove_first)?)
}
