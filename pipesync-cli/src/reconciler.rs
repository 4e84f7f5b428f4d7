//! Reconciler
//!
//! Applies a [`ChangeSet`] against the remote service in a fixed order:
//! spaces, creates, updates, deletes. Remote identifiers are written back to
//! the definition files right after the call that produced them, so a run
//! that fails halfway leaves a consistent checkpoint for the next one.

use anyhow::{Context, Result, anyhow};
use pipesync_core::domain::ChangeSet;
use pipesync_yaml::{update_pipeline_id, update_space_id};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::artifact::resolve_pipeline;
use crate::repository::PipelineRepository;

/// What a run actually did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub dry_run: bool,
    /// IDs of spaces created, in creation order
    pub space_ids: Vec<String>,
    /// IDs of pipelines created, in creation order
    pub created_ids: Vec<String>,
    pub updated_ids: Vec<String>,
    pub deleted_ids: Vec<String>,
}

/// Apply `changes` through `repo`
///
/// With `dry_run` nothing is called and no file is touched. Any failure
/// aborts the remaining steps; identifiers persisted before it stay on disk.
pub async fn apply(
    changes: ChangeSet,
    repo: &dyn PipelineRepository,
    dry_run: bool,
) -> Result<ApplySummary> {
    let mut summary = ApplySummary {
        dry_run,
        ..Default::default()
    };

    if dry_run {
        tracing::info!("This is a dry run. No changes will be applied.");
        return Ok(summary);
    }

    let ChangeSet {
        mut to_create,
        to_update,
        to_delete,
        spaces_to_create,
    } = changes;

    // Spaces
    let mut new_spaces: BTreeMap<PathBuf, String> = BTreeMap::new();
    for request in spaces_to_create {
        let space = repo.create_space(&request.name).await?;
        update_space_id(&space.id, &request.file, None)
            .with_context(|| format!("Failed to persist space ID into {}", request.file.display()))?;

        tracing::info!("Created space {} ({})", request.name, space.id);
        summary.space_ids.push(space.id.clone());
        new_spaces.insert(request.file, space.id);
    }

    for change in &mut to_create {
        if let Some(space_id) = new_spaces.get(&change.file) {
            change.pipeline.space_id = Some(space_id.clone());
        }
    }

    // Creates
    for change in to_create {
        let spec = resolve_pipeline(&change.file, &change.pipeline)?;
        let space_id = spec
            .space_id
            .clone()
            .ok_or_else(|| anyhow!("{} has no space to create the pipeline in", change.file.display()))?;

        let pipeline = repo.create_pipeline(&space_id, &spec).await?;
        update_pipeline_id(&pipeline.id, &change.file, None).with_context(|| {
            format!("Failed to persist pipeline ID into {}", change.file.display())
        })?;

        tracing::info!("Created pipeline {}", pipeline.id);
        summary.created_ids.push(pipeline.id);
    }

    // Updates
    for change in to_update {
        let Some(pipeline_id) = change.pipeline.pipeline_id.as_deref() else {
            continue;
        };
        let spec = resolve_pipeline(&change.file, &change.pipeline)?;

        let existing = repo.get_pipeline(pipeline_id).await?;
        repo.update_pipeline(&existing.id, &spec).await?;

        tracing::info!("Updated pipeline {}", existing.id);
        summary.updated_ids.push(existing.id);
    }

    // Deletes
    for change in to_delete {
        let Some(pipeline_id) = change.pipeline.pipeline_id.as_deref() else {
            continue;
        };

        let existing = repo.get_pipeline(pipeline_id).await?;
        repo.delete_pipeline(&existing.id).await?;

        tracing::info!("Deleted pipeline {}", existing.id);
        summary.deleted_ids.push(existing.id);
    }

    Ok(summary)
}
