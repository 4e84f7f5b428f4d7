//! Change set for a single sync run

use std::path::PathBuf;

use super::definition::PipelineDefinition;

/// A definition file together with its parsed content
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineChange {
    pub file: PathBuf,
    pub pipeline: PipelineDefinition,
}

/// A space that must be created before the pipeline in `file` can be
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceRequest {
    pub file: PathBuf,
    pub name: String,
}

/// Pipelines to create, update or delete, and spaces to create
///
/// Computed fresh on every run and applied in a fixed order: spaces,
/// creates, updates, deletes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub to_create: Vec<PipelineChange>,
    pub to_update: Vec<PipelineChange>,
    pub to_delete: Vec<PipelineChange>,
    pub spaces_to_create: Vec<SpaceRequest>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty()
            && self.to_update.is_empty()
            && self.to_delete.is_empty()
            && self.spaces_to_create.is_empty()
    }

    /// Remote IDs of the pipelines that will be updated
    pub fn update_ids(&self) -> Vec<&str> {
        pipeline_ids(&self.to_update)
    }

    /// Remote IDs of the pipelines that will be deleted
    pub fn delete_ids(&self) -> Vec<&str> {
        pipeline_ids(&self.to_delete)
    }

    pub fn space_names(&self) -> Vec<&str> {
        self.spaces_to_create
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }
}

fn pipeline_ids(changes: &[PipelineChange]) -> Vec<&str> {
    changes
        .iter()
        .filter_map(|c| c.pipeline.pipeline_id.as_deref())
        .collect()
}
