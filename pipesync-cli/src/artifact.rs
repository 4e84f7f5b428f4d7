//! Transformer artifact resolution
//!
//! Turns a validated definition into everything the remote service needs to
//! create or update the pipeline. Inline transformation code is written to
//! `handler.py` next to the definition so the upload is always file based.

use anyhow::{Context, Result, anyhow};
use pipesync_core::domain::{Content, PipelineDefinition};
use pipesync_core::dto::pipeline::{Connector, EnvVar};
use std::path::{Path, PathBuf};

/// File an inline transformation is materialized into
pub const INLINE_HANDLER_FILE: &str = "handler.py";

/// A pipeline ready to be sent to the remote service
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSpec {
    pub name: String,
    pub space_id: Option<String>,
    /// Transformation source file, read at upload time
    pub transformation_file: PathBuf,
    pub requirements: Option<String>,
    pub source: Option<Connector>,
    pub sink: Option<Connector>,
    pub env_vars: Vec<EnvVar>,
    pub metadata: serde_json::Value,
}

/// Resolve the definition loaded from `file` into a [`PipelineSpec`]
///
/// Paths in the definition are relative to the directory of `file`.
pub fn resolve_pipeline(file: &Path, definition: &PipelineDefinition) -> Result<PipelineSpec> {
    let graph = definition
        .graph()
        .ok_or_else(|| anyhow!("{} does not describe a source -> transformer -> sink chain", file.display()))?;
    let base_dir = file.parent().unwrap_or_else(|| Path::new(""));
    let transformer = graph.transformer;

    let transformation_file = match transformer.transformation.content() {
        Some(Content::File(path)) => base_dir.join(path),
        Some(Content::Inline(code)) => {
            let path = base_dir.join(INLINE_HANDLER_FILE);
            std::fs::write(&path, code)
                .with_context(|| format!("Failed to write inline transformation to {}", path.display()))?;
            tracing::debug!("Materialized inline transformation at {}", path.display());
            path
        }
        None => return Err(anyhow!("{} has no usable transformation", file.display())),
    };

    let requirements = transformer
        .requirements
        .as_ref()
        .map(|source| {
            source
                .content()
                .ok_or_else(|| anyhow!("{} has unusable requirements", file.display()))?
                .resolve(base_dir)
                .with_context(|| format!("Failed to read requirements for {}", file.display()))
        })
        .transpose()?;

    let env_vars = transformer
        .env_vars
        .iter()
        .flatten()
        .map(EnvVar::from)
        .collect();

    Ok(PipelineSpec {
        name: definition.name.clone(),
        space_id: definition.space_id.clone(),
        transformation_file,
        requirements,
        source: Connector::from_parts(
            graph.source.kind.as_deref(),
            graph.source.config.as_ref(),
            graph.source.config_secret_ref.as_deref(),
        ),
        sink: Connector::from_parts(
            graph.sink.kind.as_deref(),
            graph.sink.config.as_ref(),
            graph.sink.config_secret_ref.as_deref(),
        ),
        env_vars,
        metadata: serde_json::json!({ "view_only": true }),
    })
}
