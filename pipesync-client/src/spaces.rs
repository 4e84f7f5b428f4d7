//! Space-related API endpoints

use crate::OrchestratorClient;
use crate::error::Result;
use pipesync_core::dto::space::{CreateSpace, Space};
use reqwest::Method;

impl OrchestratorClient {
    /// Create a new space
    pub async fn create_space(&self, req: CreateSpace) -> Result<Space> {
        let response = self
            .request(Method::POST, "/spaces")
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }
}
