//! Definition file parser
//!
//! Reads a pipeline definition file, rejects empty documents, deserializes it
//! into a [`PipelineDefinition`] and runs the structural validator. A
//! definition returned from here is guaranteed to satisfy every schema rule.

use pipesync_core::domain::{PipelineDefinition, validate_definition};
use serde_yaml::Value;
use std::path::Path;

use crate::error::{DocumentError, Result};

/// Load and validate a pipeline definition file
///
/// # Errors
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The file is empty
/// - The YAML is invalid or does not match the schema
/// - A structural rule is violated
///
/// # Example
/// ```no_run
/// use pipesync_yaml::load_definition;
/// use std::path::Path;
///
/// let definition = load_definition(Path::new("pipelines/orders/pipeline.yaml"))?;
/// println!("{} -> {:?}", definition.name, definition.pipeline_id);
/// # Ok::<(), pipesync_yaml::DocumentError>(())
/// ```
pub fn load_definition(path: &Path) -> Result<PipelineDefinition> {
    let source = read_document(path)?;
    parse_definition(path, &source)
}

/// Parse and validate a definition from source text
///
/// `path` is only used to label errors.
pub fn parse_definition(path: &Path, source: &str) -> Result<PipelineDefinition> {
    ensure_not_empty(path, source)?;

    let definition: PipelineDefinition =
        serde_yaml::from_str(source).map_err(|e| DocumentError::parse(path, e))?;

    validate_definition(&definition).map_err(|source| DocumentError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(definition)
}

/// Read a definition file's raw text, rejecting missing and empty files
pub(crate) fn read_document(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(DocumentError::NotFound(path.to_path_buf()));
    }

    let source = std::fs::read_to_string(path).map_err(|e| DocumentError::io(path, e))?;
    ensure_not_empty(path, &source)?;

    Ok(source)
}

fn ensure_not_empty(path: &Path, source: &str) -> Result<()> {
    let value: Value = serde_yaml::from_str(source).map_err(|e| DocumentError::parse(path, e))?;

    if value.is_null() {
        return Err(DocumentError::Empty(path.to_path_buf()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipesync_core::domain::ContentSource;
    use std::path::PathBuf;

    const PIPELINE: &str = r#"# Orders pipeline
name: Pipeline with shared code 1
space_id: my-space-id
components:
  - id: orders
    type: source
    kind: google_pubsub
    config:
      project_id:
        value: my-project
  - id: enrich
    type: transformer
    inputs:
      - orders
    transformation:
      path: handler.py
    requirements:
      path: requirements.txt
  - id: out
    type: sink
    inputs:
      - enrich
"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_definition() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "pipeline.yaml", PIPELINE);

        let definition = load_definition(&path).unwrap();
        assert_eq!(definition.name, "Pipeline with shared code 1");
        assert_eq!(definition.pipeline_id, None);
        assert_eq!(definition.space_id.as_deref(), Some("my-space-id"));
        assert_eq!(
            definition.transformer().unwrap().requirements,
            Some(ContentSource::file("requirements.txt"))
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_definition(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("was not found"));
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "empty.yaml", "# nothing here\n");

        let err = load_definition(&path).unwrap_err();
        assert!(matches!(err, DocumentError::Empty(_)));
        assert!(err.to_string().contains("seems empty"));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "broken.yaml", "name: [unclosed\n");

        let err = load_definition(&path).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_required_field() {
        let source = PIPELINE.replace("name: Pipeline with shared code 1\n", "");
        let err = parse_definition(Path::new("p.yaml"), &source).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_validation_errors_name_the_file() {
        let source = PIPELINE.replace("      - orders\n", "      - elsewhere\n");
        let err = parse_definition(Path::new("pipelines/p.yaml"), &source).unwrap_err();

        match &err {
            DocumentError::Invalid { path, source } => {
                assert_eq!(path, Path::new("pipelines/p.yaml"));
                assert_eq!(source.errors.len(), 1);
                assert!(source.errors[0].contains("components[1].inputs"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(err.to_string().starts_with("pipelines/p.yaml: invalid pipeline definition"));
    }

    #[test]
    fn test_requirements_with_path_and_value_names_the_field() {
        let source = PIPELINE.replace(
            "      path: requirements.txt\n",
            "      path: requirements.txt\n      value: pandas\n",
        );
        let err = parse_definition(Path::new("p.yaml"), &source).unwrap_err();

        match &err {
            DocumentError::Invalid { source, .. } => assert_eq!(
                source.errors,
                vec!["components[1].requirements: only one of `path` or `value` can be set"]
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_pipeline_id_without_space_id_fails() {
        let source = PIPELINE.replace("space_id: my-space-id", "pipeline_id: abc\nspace_name: s");
        let err = parse_definition(Path::new("p.yaml"), &source).unwrap_err();
        assert!(matches!(err, DocumentError::Invalid { .. }));
    }

    #[test]
    fn test_reparse_after_serialization_is_stable() {
        let definition = parse_definition(Path::new("p.yaml"), PIPELINE).unwrap();
        let yaml = serde_yaml::to_string(&definition).unwrap();
        let reparsed = parse_definition(Path::new("p.yaml"), &yaml).unwrap();
        assert_eq!(reparsed, definition);
    }
}
