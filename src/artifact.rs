//! Generated artifact sets and their commit into the build directory
//!
//! A pass renders every file in memory first. Committing writes the set to a
//! staging directory inside the build directory and renames each file into
//! place, so readers never observe a half-written file. Files whose content
//! hash matches what is already on disk are left untouched.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of the per-commit staging directory.
pub const STAGING_PREFIX: &str = ".staging-";

/// Artifact commit errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("artifact '{0}' appears more than once")]
    DuplicateFile(String),

    #[error("invalid artifact file name '{0}'")]
    InvalidName(String),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> ArtifactError + '_ {
    move |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One rendered file, relative to the build directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub file_name: String,
    #[serde(skip)]
    pub contents: String,
}

impl GeneratedArtifact {
    pub fn new(file_name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }

    /// SHA-256 of the contents, hex encoded.
    pub fn sha256(&self) -> String {
        content_sha256(self.contents.as_bytes())
    }
}

/// Ordered set of rendered files committed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    files: Vec<GeneratedArtifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, artifact: GeneratedArtifact) {
        self.files.push(artifact);
    }

    pub fn extend(&mut self, artifacts: impl IntoIterator<Item = GeneratedArtifact>) {
        self.files.extend(artifacts);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.files.iter()
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.file_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        let mut seen = std::collections::HashSet::new();
        for file in &self.files {
            let name = file.file_name.as_str();
            let plain = !name.is_empty()
                && name != "."
                && name != ".."
                && !name.contains(['/', '\\'])
                && !name.starts_with(STAGING_PREFIX);
            if !plain {
                return Err(ArtifactError::InvalidName(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(ArtifactError::DuplicateFile(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Outcome of a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    /// Files written or rewritten.
    pub written: Vec<String>,
    /// Files skipped because identical content was already in place.
    pub unchanged: Vec<String>,
    /// Stale files removed after the swap.
    pub removed: Vec<String>,
}

/// Removes the staging directory however the commit ends.
struct StagingDir {
    path: PathBuf,
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove staging directory");
            }
        }
    }
}

/// Commit `set` into `build_dir`.
///
/// Any artifact named in `remove_first` is always rewritten. The remaining
/// names are deleted from the build directory once every rename has
/// succeeded, so a failed commit never loses previous outputs.
pub fn commit(
    set: &ArtifactSet,
    build_dir: &Path,
    remove_first: &[&str],
) -> Result<CommitReport, ArtifactError> {
    set.validate()?;
    fs::create_dir_all(build_dir).map_err(io_err(build_dir))?;

    let staging = StagingDir {
        path: build_dir.join(format!(
            "{}{}",
            STAGING_PREFIX,
            ulid::Ulid::new().to_string().to_lowercase()
        )),
    };
    fs::create_dir(&staging.path).map_err(io_err(&staging.path))?;

    let mut report = CommitReport::default();
    let mut staged = Vec::new();

    for file in set.iter() {
        let target = build_dir.join(&file.file_name);
        let forced = remove_first.contains(&file.file_name.as_str());
        if !forced && matches_on_disk(&target, &file.sha256()) {
            report.unchanged.push(file.file_name.clone());
            continue;
        }

        let staged_path = staging.path.join(&file.file_name);
        fs::write(&staged_path, &file.contents).map_err(io_err(&staged_path))?;
        staged.push((staged_path, target, file.file_name.clone()));
    }

    for (staged_path, target, name) in staged {
        fs::rename(&staged_path, &target).map_err(io_err(&target))?;
        report.written.push(name);
    }

    let current = set.file_names();
    for name in remove_first.iter().filter(|name| !current.contains(name)) {
        let path = build_dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => report.removed.push(name.to_string()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(&path)(e)),
        }
    }

    tracing::debug!(
        build_dir = %build_dir.display(),
        written = report.written.len(),
        unchanged = report.unchanged.len(),
        removed = report.removed.len(),
        "committed artifacts"
    );

    Ok(report)
}

fn matches_on_disk(path: &Path, sha256: &str) -> bool {
    match fs::read(path) {
        Ok(existing) => content_sha256(&existing) == sha256,
        Err(_) => false,
    }
}

/// Compute SHA-256 hash of data
pub fn content_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
