//! Core domain types
//!
//! This module contains the structures shared by the definition loader, the
//! change classifier and the reconciler. Definition files on disk are the only
//! persistent state; everything here is rebuilt on each run.

pub mod change;
pub mod definition;
pub mod validation;

pub use change::{ChangeSet, PipelineChange, SpaceRequest};
pub use definition::{
    Component, ComponentKind, ConfigEntry, ConfigParameter, ConnectorConfig, Content, ContentSource,
    EnvironmentVariable, HeaderParameter, PipelineDefinition, PipelineGraph, SinkComponent,
    SourceComponent, TransformerComponent,
};
pub use validation::{ValidationError, validate_definition};
