//! Pipeline definition types
//!
//! A definition file describes one pipeline as a fixed three-node chain:
//! source -> transformer -> sink. The types below mirror the YAML document
//! field for field and accept anything of the right shape; every rule,
//! including the "exactly one of" pairs, lives in [`super::validation`] so
//! errors can name the component and field they concern.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Pipeline definition as written in a definition file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub name: String,
    /// Remote pipeline ID; present once the pipeline has been created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    /// Name of a space to create when `space_id` is not known yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_name: Option<String>,
    pub components: Vec<Component>,
}

impl PipelineDefinition {
    /// First source component, if any
    pub fn source(&self) -> Option<&SourceComponent> {
        self.components.iter().find_map(|c| match c {
            Component::Source(source) => Some(source),
            _ => None,
        })
    }

    /// First transformer component, if any
    pub fn transformer(&self) -> Option<&TransformerComponent> {
        self.components.iter().find_map(|c| match c {
            Component::Transformer(transformer) => Some(transformer),
            _ => None,
        })
    }

    /// First sink component, if any
    pub fn sink(&self) -> Option<&SinkComponent> {
        self.components.iter().find_map(|c| match c {
            Component::Sink(sink) => Some(sink),
            _ => None,
        })
    }

    /// Borrow the three components as a chain
    ///
    /// Returns `None` when any of the three kinds is missing. A validated
    /// definition always yields a graph.
    pub fn graph(&self) -> Option<PipelineGraph<'_>> {
        Some(PipelineGraph {
            source: self.source()?,
            transformer: self.transformer()?,
            sink: self.sink()?,
        })
    }
}

/// Borrowed view of a definition's source -> transformer -> sink chain
#[derive(Debug, Clone, Copy)]
pub struct PipelineGraph<'a> {
    pub source: &'a SourceComponent,
    pub transformer: &'a TransformerComponent,
    pub sink: &'a SinkComponent,
}

/// A pipeline component, discriminated by its `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Component {
    Source(SourceComponent),
    Transformer(TransformerComponent),
    Sink(SinkComponent),
}

impl Component {
    pub fn id(&self) -> &str {
        match self {
            Component::Source(c) => &c.id,
            Component::Transformer(c) => &c.id,
            Component::Sink(c) => &c.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Component::Source(c) => c.name.as_deref(),
            Component::Transformer(c) => c.name.as_deref(),
            Component::Sink(c) => c.name.as_deref(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Source(_) => ComponentKind::Source,
            Component::Transformer(_) => ComponentKind::Transformer,
            Component::Sink(_) => ComponentKind::Sink,
        }
    }
}

/// Variant tag of a [`Component`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Source,
    Transformer,
    Sink,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 3] = [
        ComponentKind::Source,
        ComponentKind::Transformer,
        ComponentKind::Sink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Source => "source",
            ComponentKind::Transformer => "transformer",
            ComponentKind::Sink => "sink",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source connector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceComponent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Connector type, e.g. `google_pubsub`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConnectorConfig>,
    /// Name of a secret holding the whole connector config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_secret_ref: Option<String>,
}

/// Sink connector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkComponent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConnectorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_secret_ref: Option<String>,
    pub inputs: Vec<String>,
}

/// Python transformation step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerComponent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub transformation: ContentSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<ContentSource>,
    pub inputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_vars: Option<Vec<EnvironmentVariable>>,
}

// =============================================================================
// Inline-or-file content
// =============================================================================

/// Text given either inline in the definition or by a path relative to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Inline(String),
    File(PathBuf),
}

impl Content {
    /// Read the content, resolving file references against `base_dir`
    pub fn resolve(&self, base_dir: &Path) -> std::io::Result<String> {
        match self {
            Content::Inline(value) => Ok(value.clone()),
            Content::File(path) => std::fs::read_to_string(base_dir.join(path)),
        }
    }
}

/// A `{path | value}` block as written in the definition
///
/// Exactly one of the two must be set. The validator checks this so the
/// error can name the component and field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ContentSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            value: None,
        }
    }

    pub fn inline(value: impl Into<String>) -> Self {
        Self {
            path: None,
            value: Some(value.into()),
        }
    }

    /// The content, when exactly one of `path` or `value` is set
    pub fn content(&self) -> Option<Content> {
        match (&self.path, &self.value) {
            (Some(path), None) => Some(Content::File(path.clone())),
            (None, Some(value)) => Some(Content::Inline(value.clone())),
            _ => None,
        }
    }
}

// =============================================================================
// Environment variables
// =============================================================================

/// Environment variable passed to the transformation
///
/// Exactly one of `value` or `value_secret_ref` must be set; checked by the
/// validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Name of a secret holding the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_secret_ref: Option<String>,
}

// =============================================================================
// Connector configuration
// =============================================================================

/// Named connector parameters
pub type ConnectorConfig = BTreeMap<String, ConfigEntry>;

/// A connector parameter: a single value, or a list of header parameters
///
/// Anything else lands in `Unrecognized` and is rejected by the validator,
/// which can name the offending key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigEntry {
    Headers(Vec<HeaderParameter>),
    Parameter(ConfigParameter),
    Unrecognized(serde_json::Value),
}

/// Single connector parameter
///
/// Exactly one of `value` or `secret_ref` must be set; checked by the validator
/// so the error can name the parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigParameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<String>,
}

/// HTTP header parameter (webhook-style connectors)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}
