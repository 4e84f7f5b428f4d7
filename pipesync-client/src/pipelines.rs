//! Pipeline-related API endpoints

use crate::OrchestratorClient;
use crate::error::Result;
use pipesync_core::dto::pipeline::{CreatePipeline, Pipeline, UpdatePipeline};
use reqwest::Method;

impl OrchestratorClient {
    // =============================================================================
    // Pipeline Management
    // =============================================================================

    /// Create a new pipeline
    ///
    /// # Example
    /// ```no_run
    /// # use pipesync_client::OrchestratorClient;
    /// # use pipesync_core::dto::pipeline::{CreatePipeline, PipelineFields};
    /// # async fn example() -> pipesync_client::Result<()> {
    /// let client = OrchestratorClient::new("https://api.glassflow.dev/v1", "my-token");
    /// let pipeline = client.create_pipeline(CreatePipeline {
    ///     space_id: "space-id".to_string(),
    ///     fields: PipelineFields {
    ///         name: "my-pipeline".to_string(),
    ///         transformation_function: "def handler(data, log):\n    return data\n".to_string(),
    ///         requirements_txt: None,
    ///         source_connector: None,
    ///         sink_connector: None,
    ///         environments: Vec::new(),
    ///         metadata: serde_json::json!({ "view_only": true }),
    ///     },
    /// }).await?;
    /// println!("{}", pipeline.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_pipeline(&self, req: CreatePipeline) -> Result<Pipeline> {
        let response = self
            .request(Method::POST, "/pipelines")
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a pipeline by ID
    pub async fn get_pipeline(&self, pipeline_id: &str) -> Result<Pipeline> {
        let response = self
            .request(Method::GET, &format!("/pipelines/{}", pipeline_id))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Replace the mutable fields of an existing pipeline
    pub async fn update_pipeline(&self, pipeline_id: &str, req: UpdatePipeline) -> Result<Pipeline> {
        let response = self
            .request(Method::PATCH, &format!("/pipelines/{}", pipeline_id))
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Delete a pipeline
    pub async fn delete_pipeline(&self, pipeline_id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("/pipelines/{}", pipeline_id))
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
