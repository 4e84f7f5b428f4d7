//! Change classification
//!
//! Maps the files touched by a commit to the pipelines that must be created,
//! updated or deleted, and to the spaces that must be created first.

use anyhow::{Context, Result};
use pipesync_core::domain::{ChangeSet, PipelineChange, SpaceRequest};
use pipesync_yaml::{
    build_dependency_index, is_auxiliary_file, is_definition_file, load_definition,
    normalize_path,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Classify changed and deleted files into a [`ChangeSet`]
///
/// A changed auxiliary file marks every definition that depends on it as
/// changed. Deleted definition files are removed from disk unless `dry_run`
/// is set, even when they no longer parse. Deleted auxiliary files are
/// ignored.
///
/// # Errors
///
/// Fails if a changed definition file cannot be loaded or is invalid, or if
/// a deleted definition file exists but cannot be removed.
pub fn classify(
    changed: &[PathBuf],
    deleted: &[PathBuf],
    pipelines_dir: &Path,
    dry_run: bool,
) -> Result<ChangeSet> {
    let index = build_dependency_index(pipelines_dir)
        .with_context(|| format!("Failed to index {}", pipelines_dir.display()))?;

    let mut pipelines_changed = BTreeSet::new();
    for file in changed.iter().map(|f| normalize_path(f)) {
        if is_definition_file(&file) {
            pipelines_changed.insert(file);
        } else if is_auxiliary_file(&file) {
            let owners = index.owners_of(&file);
            if owners.is_empty() {
                tracing::debug!("{} is not used by any pipeline", file.display());
            }
            pipelines_changed.extend(owners.into_iter().map(Path::to_path_buf));
        } else {
            tracing::debug!("Ignoring changed file {}", file.display());
        }
    }

    let mut changes = ChangeSet::default();
    for file in pipelines_changed {
        let pipeline = load_definition(&file)
            .with_context(|| format!("Failed to load changed pipeline {}", file.display()))?;

        if pipeline.space_id.is_none() {
            if let Some(name) = &pipeline.space_name {
                changes.spaces_to_create.push(SpaceRequest {
                    file: file.clone(),
                    name: name.clone(),
                });
            }
        }

        let change = PipelineChange { file, pipeline };
        if change.pipeline.pipeline_id.is_some() {
            changes.to_update.push(change);
        } else {
            changes.to_create.push(change);
        }
    }

    for file in deleted.iter().map(|f| normalize_path(f)) {
        if !is_definition_file(&file) {
            tracing::debug!("Ignoring deleted file {}", file.display());
            continue;
        }

        match load_definition(&file) {
            Ok(pipeline) if pipeline.pipeline_id.is_some() => {
                changes.to_delete.push(PipelineChange {
                    file: file.clone(),
                    pipeline,
                });
            }
            Ok(_) => {
                tracing::info!("{} was never pushed, nothing to delete remotely", file.display());
            }
            Err(e) => {
                tracing::error!("Could not read deleted pipeline {}: {}", file.display(), e);
            }
        }

        if !dry_run {
            remove_definition(&file)?;
        }
    }

    Ok(changes)
}

fn remove_definition(file: &Path) -> Result<()> {
    match std::fs::remove_file(file) {
        Ok(()) => {
            tracing::debug!("Removed {}", file.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("{} is already gone", file.display());
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", file.display())),
    }
}
