//! Configuration module
//!
//! Run settings assembled from the command line and environment.

use anyhow::{Result, bail};
use pipesync_yaml::normalize_path;
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Added or changed files, as reported by the CI job
    pub files_changed: Vec<PathBuf>,
    /// Deleted files, as reported by the CI job
    pub files_deleted: Vec<PathBuf>,
    /// Repository root that relative paths are resolved against
    pub root_dir: PathBuf,
    /// Directory holding pipeline definitions
    pub pipelines_dir: PathBuf,
    pub access_token: Option<String>,
    /// Base URL of the remote service
    pub api_url: String,
    /// File receiving `key=value` outputs
    pub output_file: Option<PathBuf>,
    pub dry_run: bool,
}

impl Config {
    /// Check the settings before any work is done
    pub fn validate(&self) -> Result<()> {
        if !self.dry_run && self.access_token.as_deref().is_none_or(|t| t.trim().is_empty()) {
            bail!("a personal access token is required unless --dry-run is set");
        }

        if self.api_url.trim().is_empty() {
            bail!("the API URL must not be empty");
        }

        Ok(())
    }

    /// Resolve a path against the repository root and normalize it
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&self.root_dir.join(path))
        }
    }

    pub fn pipelines_path(&self) -> PathBuf {
        self.resolve(&self.pipelines_dir)
    }

    pub fn changed_paths(&self) -> Vec<PathBuf> {
        self.files_changed.iter().map(|p| self.resolve(p)).collect()
    }

    pub fn deleted_paths(&self) -> Vec<PathBuf> {
        self.files_deleted.iter().map(|p| self.resolve(p)).collect()
    }
}
