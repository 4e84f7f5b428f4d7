//! Pipeline DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::definition::{ConnectorConfig, EnvironmentVariable};

/// Source or sink connector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConnectorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_secret_ref: Option<String>,
}

impl Connector {
    /// Build connector settings; a connector without a `kind` is not sent
    pub fn from_parts(
        kind: Option<&str>,
        config: Option<&ConnectorConfig>,
        config_secret_ref: Option<&str>,
    ) -> Option<Self> {
        kind.map(|kind| Connector {
            kind: kind.to_string(),
            config: config.cloned(),
            config_secret_ref: config_secret_ref.map(str::to_string),
        })
    }
}

/// Environment variable as sent to the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_secret_ref: Option<String>,
}

impl From<&EnvironmentVariable> for EnvVar {
    fn from(var: &EnvironmentVariable) -> Self {
        Self {
            name: var.name.clone(),
            value: var.value.clone(),
            value_secret_ref: var.value_secret_ref.clone(),
        }
    }
}

/// Mutable fields of a remote pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineFields {
    pub name: String,
    /// Source code of the transformation handler
    pub transformation_function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements_txt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_connector: Option<Connector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_connector: Option<Connector>,
    #[serde(default)]
    pub environments: Vec<EnvVar>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Request to create a new pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePipeline {
    pub space_id: String,
    #[serde(flatten)]
    pub fields: PipelineFields,
}

/// Request to update an existing pipeline
pub type UpdatePipeline = PipelineFields;

/// Pipeline as returned by the remote service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub space_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
