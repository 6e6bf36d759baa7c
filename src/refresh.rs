//! Refresh orchestrator
//!
//! Phases: IDLE → RESOLVING → GENERATING → IDLE, with a transient FAILED
//! that logs and falls back to IDLE without persisting or publishing.
//!
//! One pass: read layers, merge, render options typing and token outputs,
//! commit the combined artifact set, store options and tokens, publish the
//! update. Passes never overlap. A trigger arriving mid-pass marks the
//! orchestrator dirty and the running caller performs one more pass.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use theme_protocol::{ThemeUpdate, KIT_VERSION, OPTIONS_CACHE_KEY, TOKENS_CACHE_KEY};
use theme_tokens::{StyleBuilder, TokenTransformer};
use thiserror::Error;

use crate::artifact::{self, ArtifactError, ArtifactSet};
use crate::config::{merge_layers, startup_messages, FsLoader, MergedTheme, ModuleOptions, SourceLoader, ThemeMeta};
use crate::layers::{LayerError, LayerSource};
use crate::publish::{NullPublisher, UpdatePublisher};
use crate::store::{CacheStore, MemoryStore, StoreError};
use crate::tokens::render_token_artifacts;
use crate::typing::generate_options_typing;

/// Errors that fail a pass.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Layers(#[from] LayerError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("failed to store merged theme: {0}")]
    Store(#[from] StoreError),
}

/// Orchestrator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshPhase {
    Idle,
    Resolving,
    Generating,
    /// Pass failed; nothing was published. Falls back to `Idle`.
    Failed,
}

impl RefreshPhase {
    /// Whether a pass is running.
    pub fn is_busy(&self) -> bool {
        matches!(self, RefreshPhase::Resolving | RefreshPhase::Generating)
    }
}

/// What asked for a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Boot,
    FileChanged(PathBuf),
}

/// Summary of a refresh run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassReport {
    /// Passes performed, including coalesced re-runs.
    pub passes: usize,
    /// Degraded steps of the final pass.
    pub warnings: Vec<String>,
    pub metas: Vec<ThemeMeta>,
    pub written: Vec<String>,
    pub unchanged: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Result of [`Refresher::trigger`].
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Completed(PassReport),
    /// A pass was running; it will run once more.
    Coalesced,
    /// The changed file is not a source of the current theme.
    Ignored,
    /// The final pass failed.
    Failed(String),
}

#[derive(Debug)]
struct RefreshState {
    phase: RefreshPhase,
    dirty: bool,
    theme: Option<MergedTheme>,
    definition_files: Vec<PathBuf>,
    booted: bool,
}

struct PassOutput {
    theme: MergedTheme,
    definition_files: Vec<PathBuf>,
    warnings: Vec<String>,
    written: Vec<String>,
    unchanged: Vec<String>,
}

/// Drives resolution passes for one build directory.
pub struct Refresher {
    module: ModuleOptions,
    layers: Box<dyn LayerSource>,
    loader: Box<dyn SourceLoader>,
    transformer: Box<dyn TokenTransformer + Send + Sync>,
    store: Arc<dyn CacheStore>,
    publisher: Arc<dyn UpdatePublisher>,
    force: bool,
    state: Mutex<RefreshState>,
}

impl Refresher {
    /// Create an orchestrator with the filesystem loader, the built-in
    /// token transformer, an in-memory store and no publisher.
    pub fn new(module: ModuleOptions, layers: impl LayerSource + 'static) -> Self {
        Self {
            module,
            layers: Box::new(layers),
            loader: Box::new(FsLoader),
            transformer: Box::new(StyleBuilder::default()),
            store: Arc::new(MemoryStore::new()),
            publisher: Arc::new(NullPublisher),
            force: false,
            state: Mutex::new(RefreshState {
                phase: RefreshPhase::Idle,
                dirty: false,
                theme: None,
                definition_files: Vec::new(),
                booted: false,
            }),
        }
    }

    pub fn with_loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_transformer(mut self, transformer: impl TokenTransformer + Send + Sync + 'static) -> Self {
        self.transformer = Box::new(transformer);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn UpdatePublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// Remove previously generated token outputs before every commit.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn module(&self) -> &ModuleOptions {
        &self.module
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn phase(&self) -> RefreshPhase {
        self.state.lock().phase
    }

    /// Theme produced by the last successful pass.
    pub fn theme(&self) -> Option<MergedTheme> {
        self.state.lock().theme.clone()
    }

    /// Every file whose change triggers a refresh.
    pub fn watched_files(&self) -> Vec<PathBuf> {
        let state = self.state.lock();
        let mut files = state.definition_files.clone();
        if let Some(theme) = &state.theme {
            files.extend(theme.options_file_paths.iter().cloned());
            files.extend(theme.tokens_file_paths.iter().cloned());
        }
        files.sort();
        files.dedup();
        files
    }

    fn is_watched(&self, path: &Path) -> bool {
        let state = self.state.lock();
        state.definition_files.iter().any(|p| p == path)
            || state.theme.as_ref().is_some_and(|t| t.is_source_file(path))
    }

    fn set_phase(&self, phase: RefreshPhase) {
        self.state.lock().phase = phase;
    }

    /// Request a refresh.
    pub fn trigger(&self, trigger: Trigger) -> RefreshOutcome {
        if let Trigger::FileChanged(path) = &trigger {
            if !self.is_watched(path) {
                tracing::debug!(path = %path.display(), "ignoring change to unrelated file");
                return RefreshOutcome::Ignored;
            }
            tracing::info!(path = %path.display(), "theme source changed");
        }

        {
            let mut state = self.state.lock();
            if state.phase.is_busy() {
                state.dirty = true;
                tracing::debug!("refresh already running, coalescing");
                return RefreshOutcome::Coalesced;
            }
            state.phase = RefreshPhase::Resolving;
        }

        let mut passes = 0;
        loop {
            passes += 1;
            let result = self.run_pass();

            let mut state = self.state.lock();
            let outcome = match result {
                Ok(output) => {
                    state.phase = RefreshPhase::Idle;
                    let report = PassReport {
                        passes,
                        warnings: output.warnings,
                        metas: output.theme.metas.clone(),
                        written: output.written,
                        unchanged: output.unchanged,
                        completed_at: Utc::now(),
                    };
                    state.theme = Some(output.theme);
                    state.definition_files = output.definition_files;
                    RefreshOutcome::Completed(report)
                }
                Err(e) => {
                    state.phase = RefreshPhase::Failed;
                    RefreshOutcome::Failed(e.to_string())
                }
            };

            if state.dirty {
                state.dirty = false;
                state.phase = RefreshPhase::Resolving;
                continue;
            }

            let announce = trigger == Trigger::Boot && !state.booted;
            if announce && matches!(outcome, RefreshOutcome::Completed(_)) {
                state.booted = true;
            }
            drop(state);

            if let RefreshOutcome::Failed(message) = &outcome {
                tracing::error!(passes, error = %message, "theme refresh failed");
                let mut state = self.state.lock();
                if state.phase == RefreshPhase::Failed {
                    state.phase = RefreshPhase::Idle;
                }
            }

            if let RefreshOutcome::Completed(report) = &outcome {
                if announce {
                    for message in startup_messages(&report.metas) {
                        tracing::info!("{}", message);
                    }
                    tracing::info!("Using theme-kit v{}", KIT_VERSION);
                }
                tracing::info!(
                    passes = report.passes,
                    warnings = report.warnings.len(),
                    written = report.written.len(),
                    "theme refreshed"
                );
            }
            return outcome;
        }
    }

    fn run_pass(&self) -> Result<PassOutput, RefreshError> {
        let layers = self.layers.layers()?;
        let theme = merge_layers(&layers, &self.module, self.loader.as_ref());
        self.set_phase(RefreshPhase::Generating);

        let options = theme.options_value();
        let tokens = theme.tokens_value();
        let mut warnings = Vec::new();
        let mut set = ArtifactSet::new();

        match generate_options_typing(&options, theme.schema.as_ref()) {
            Ok(typing) => set.extend(typing.artifacts()),
            Err(e) => {
                tracing::warn!(error = %e, "keeping previous options typing");
                warnings.push(format!("options typing: {}", e));
            }
        }

        let mut remove_first = Vec::new();
        match render_token_artifacts(&tokens, self.transformer.as_ref(), &self.module.transform_options()) {
            Ok(token_set) => {
                if self.force {
                    remove_first = self.transformer.destinations();
                }
                set.extend(token_set.iter().cloned());
            }
            Err(e) => {
                tracing::warn!(error = %e, "keeping previous token artifacts");
                warnings.push(format!("token artifacts: {}", e));
            }
        }

        let remove_first: Vec<&str> = remove_first.iter().map(String::as_str).collect();
        let commit = artifact::commit(&set, &self.module.build_dir, &remove_first)?;

        self.store.set(OPTIONS_CACHE_KEY, &options)?;
        self.store.set(TOKENS_CACHE_KEY, &tokens)?;
        self.publisher.publish(&ThemeUpdate::new(options, tokens));

        Ok(PassOutput {
            theme,
            definition_files: self.layers.definition_files(),
            warnings,
            written: commit.written,
            unchanged: commit.unchanged,
        })
    }
}

impl std::fmt::Debug for Refresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Refresher")
            .field("module", &self.module)
            .field("force", &self.force)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}
