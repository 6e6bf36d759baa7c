//! Configuration layer sources
//!
//! The orchestrator re-reads its layers at the start of every pass. A fixed
//! list works for embedding; [`LayerDirs`] builds layers from directories,
//! reading `<dir>/layer.config.{json,toml,yaml,yml}` as the raw config.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{locate, ConfigLoadError, ConfigurationLayer, FsLoader, SourceLoader};

/// File stem of a layer directory's raw config.
pub const LAYER_CONFIG_STEM: &str = "layer.config";

/// Errors from reading layer definitions.
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("layer directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("failed to load layer config: {0}")]
    Load(#[from] ConfigLoadError),
}

/// Produces the ordered layer list for a resolution pass.
pub trait LayerSource: Send + Sync {
    fn layers(&self) -> Result<Vec<ConfigurationLayer>, LayerError>;

    /// Files defining the layers themselves. A change to one of them is
    /// treated like a change to a recorded config file.
    fn definition_files(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}

impl LayerSource for Vec<ConfigurationLayer> {
    fn layers(&self) -> Result<Vec<ConfigurationLayer>, LayerError> {
        Ok(self.clone())
    }
}

/// Layers read from an ordered list of directories, highest priority first.
#[derive(Debug, Clone)]
pub struct LayerDirs<L = FsLoader> {
    dirs: Vec<PathBuf>,
    loader: L,
}

impl LayerDirs<FsLoader> {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self::with_loader(dirs, FsLoader)
    }
}

impl<L: SourceLoader> LayerDirs<L> {
    pub fn with_loader(dirs: Vec<PathBuf>, loader: L) -> Self {
        Self { dirs, loader }
    }

    fn read_layer(&self, dir: &Path) -> Result<ConfigurationLayer, LayerError> {
        if !dir.is_dir() {
            return Err(LayerError::MissingDirectory(dir.to_path_buf()));
        }

        let config = match locate(&self.loader, &dir.join(LAYER_CONFIG_STEM)) {
            Some(path) => match self.loader.load(&path)? {
                Value::Object(map) => Value::Object(map),
                _ => return Err(ConfigLoadError::NotAMapping(path).into()),
            },
            None => Value::Object(Map::new()),
        };

        Ok(ConfigurationLayer::new(dir, config))
    }
}

impl<L: SourceLoader> LayerSource for LayerDirs<L> {
    fn layers(&self) -> Result<Vec<ConfigurationLayer>, LayerError> {
        let layers = self
            .dirs
            .iter()
            .map(|dir| self.read_layer(dir))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(layers = layers.len(), "read layer directories");
        Ok(layers)
    }

    fn definition_files(&self) -> Vec<PathBuf> {
        self.dirs
            .iter()
            .filter_map(|dir| locate(&self.loader, &dir.join(LAYER_CONFIG_STEM)))
            .collect()
    }
}
