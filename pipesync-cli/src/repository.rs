//! Repository layer
//!
//! The reconciler talks to the remote service through [`PipelineRepository`]
//! so it can be exercised without a network. [`HttpPipelineRepository`] is
//! the implementation used at runtime.

use anyhow::{Context, Result};
use async_trait::async_trait;
use pipesync_client::{ClientError, OrchestratorClient};
use pipesync_core::dto::pipeline::{CreatePipeline, Pipeline, PipelineFields};
use pipesync_core::dto::space::{CreateSpace, Space};

use crate::artifact::PipelineSpec;

/// Remote operations needed to apply a change set
#[async_trait]
pub trait PipelineRepository: Send + Sync {
    async fn create_space(&self, name: &str) -> Result<Space>;

    /// Create a pipeline in `space_id`
    async fn create_pipeline(&self, space_id: &str, spec: &PipelineSpec) -> Result<Pipeline>;

    async fn get_pipeline(&self, pipeline_id: &str) -> Result<Pipeline>;

    /// Replace every mutable field of an existing pipeline
    async fn update_pipeline(&self, pipeline_id: &str, spec: &PipelineSpec) -> Result<Pipeline>;

    async fn delete_pipeline(&self, pipeline_id: &str) -> Result<()>;
}

/// HTTP implementation of PipelineRepository
pub struct HttpPipelineRepository {
    client: OrchestratorClient,
}

impl HttpPipelineRepository {
    pub fn new(client: OrchestratorClient) -> Self {
        Self { client }
    }
}

/// Wrap a client error with the failed action and a hint for common statuses
fn remote_error(err: ClientError, action: String) -> anyhow::Error {
    let context = if err.is_unauthorized() {
        format!("{} (check the personal access token)", action)
    } else if err.is_not_found() {
        format!("{} (not found on the remote service)", action)
    } else {
        action
    };
    anyhow::Error::new(err).context(context)
}

/// Build the request fields, reading the transformation source from disk
fn pipeline_fields(spec: &PipelineSpec) -> Result<PipelineFields> {
    let transformation_function = std::fs::read_to_string(&spec.transformation_file)
        .with_context(|| {
            format!(
                "Failed to read transformation file {}",
                spec.transformation_file.display()
            )
        })?;

    Ok(PipelineFields {
        name: spec.name.clone(),
        transformation_function,
        requirements_txt: spec.requirements.clone(),
        source_connector: spec.source.clone(),
        sink_connector: spec.sink.clone(),
        environments: spec.env_vars.clone(),
        metadata: spec.metadata.clone(),
    })
}

#[async_trait]
impl PipelineRepository for HttpPipelineRepository {
    async fn create_space(&self, name: &str) -> Result<Space> {
        self.client
            .create_space(CreateSpace {
                name: name.to_string(),
            })
            .await
            .map_err(|e| remote_error(e, format!("Failed to create space '{}'", name)))
    }

    async fn create_pipeline(&self, space_id: &str, spec: &PipelineSpec) -> Result<Pipeline> {
        let req = CreatePipeline {
            space_id: space_id.to_string(),
            fields: pipeline_fields(spec)?,
        };

        self.client
            .create_pipeline(req)
            .await
            .map_err(|e| remote_error(e, format!("Failed to create pipeline '{}'", spec.name)))
    }

    async fn get_pipeline(&self, pipeline_id: &str) -> Result<Pipeline> {
        self.client
            .get_pipeline(pipeline_id)
            .await
            .map_err(|e| remote_error(e, format!("Failed to fetch pipeline {}", pipeline_id)))
    }

    async fn update_pipeline(&self, pipeline_id: &str, spec: &PipelineSpec) -> Result<Pipeline> {
        let req = pipeline_fields(spec)?;

        self.client
            .update_pipeline(pipeline_id, req)
            .await
            .map_err(|e| remote_error(e, format!("Failed to update pipeline {}", pipeline_id)))
    }

    async fn delete_pipeline(&self, pipeline_id: &str) -> Result<()> {
        self.client
            .delete_pipeline(pipeline_id)
            .await
            .map_err(|e| remote_error(e, format!("Failed to delete pipeline {}", pipeline_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn spec(transformation_file: PathBuf) -> PipelineSpec {
        PipelineSpec {
            name: "orders".to_string(),
            space_id: Some("space-1".to_string()),
            transformation_file,
            requirements: None,
            source: None,
            sink: None,
            env_vars: Vec::new(),
            metadata: serde_json::json!({ "view_only": true }),
        }
    }

    #[test]
    fn test_fields_carry_transformation_source() {
        let dir = tempfile::tempdir().unwrap();
        let handler = dir.path().join("handler.py");
        std::fs::write(&handler, "def handler(data, log):\n    return data\n").unwrap();

        let fields = pipeline_fields(&spec(handler)).unwrap();
        assert_eq!(fields.name, "orders");
        assert!(fields.transformation_function.starts_with("def handler"));
        assert_eq!(fields.metadata["view_only"], true);
    }

    #[test]
    fn test_remote_error_hints() {
        let err = remote_error(
            ClientError::api_error(401, "invalid token"),
            "Failed to create space 'analytics'".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "Failed to create space 'analytics' (check the personal access token)"
        );
        assert!(format!("{:#}", err).contains("invalid token"));

        let err = remote_error(
            ClientError::api_error(404, "no such pipeline"),
            "Failed to delete pipeline p-1".to_string(),
        );
        assert_eq!(err.to_string(), "Failed to delete pipeline p-1 (not found on the remote service)");

        let err = remote_error(
            ClientError::api_error(500, "boom"),
            "Failed to update pipeline p-1".to_string(),
        );
        assert_eq!(err.to_string(), "Failed to update pipeline p-1");
    }

    #[test]
    fn test_unreadable_transformation_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.py");

        let err = pipeline_fields(&spec(missing)).unwrap_err();
        assert!(err.to_string().contains("missing.py"));
    }
}
