//! Pipesync YAML Infrastructure
//!
//! This crate handles pipeline definition files on disk. It includes:
//! - Loading and validating definition files
//! - Round-trip-preserving writes of remote identifiers
//! - Full field-level write-back of a definition
//! - The dependency index mapping definitions to their auxiliary files

pub mod document;
pub mod error;
pub mod index;
pub mod parser;

pub use document::{update_pipeline_id, update_space_id, write_definition};
pub use error::{DocumentError, Result};
pub use index::{
    DependencyIndex, build_dependency_index, is_auxiliary_file, is_definition_file,
    normalize_path,
};
pub use parser::{load_definition, parse_definition};
