//! Structural validation for pipeline definitions
//!
//! Checks the component chain, space ownership, transformer content and
//! connector configuration. All violations are collected so a single run
//! reports everything wrong with a file.

use std::collections::HashSet;
use thiserror::Error;

use super::definition::{
    Component, ComponentKind, ConfigEntry, ConnectorConfig, ContentSource, PipelineDefinition,
    TransformerComponent,
};

/// One or more rule violations in a pipeline definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pipeline definition: {}", .errors.join("; "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

/// Validate a deserialized pipeline definition
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every violated rule, each message
/// prefixed with the field it concerns.
pub fn validate_definition(definition: &PipelineDefinition) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    validate_space(definition, &mut errors);
    validate_components(definition, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}

fn validate_space(definition: &PipelineDefinition, errors: &mut Vec<String>) {
    if definition.space_id.is_none() && definition.space_name.is_none() {
        errors.push("space_id: `space_id` or `space_name` must be set".to_string());
    }
    if definition.pipeline_id.is_some() && definition.space_id.is_none() {
        errors.push("space_id: required when `pipeline_id` is set".to_string());
    }
}

fn validate_components(definition: &PipelineDefinition, errors: &mut Vec<String>) {
    let components = &definition.components;

    if components.len() != 3 {
        errors.push(format!(
            "components: expected exactly 3 components (source, transformer, sink), found {}",
            components.len()
        ));
    }

    for kind in ComponentKind::ALL {
        let count = components.iter().filter(|c| c.kind() == kind).count();
        if count != 1 {
            errors.push(format!(
                "components: expected exactly one `{}` component, found {}",
                kind, count
            ));
        }
    }

    let mut seen = HashSet::new();
    for (idx, component) in components.iter().enumerate() {
        if !seen.insert(component.id()) {
            errors.push(format!(
                "components[{}].id: duplicate component id '{}'",
                idx,
                component.id()
            ));
        }

        match component {
            Component::Source(source) => validate_connector(
                idx,
                source.kind.as_deref(),
                source.config.as_ref(),
                source.config_secret_ref.as_deref(),
                errors,
            ),
            Component::Sink(sink) => validate_connector(
                idx,
                sink.kind.as_deref(),
                sink.config.as_ref(),
                sink.config_secret_ref.as_deref(),
                errors,
            ),
            Component::Transformer(transformer) => validate_transformer(idx, transformer, errors),
        }
    }

    validate_wiring(definition, errors);
}

/// Check the source -> transformer -> sink edges
fn validate_wiring(definition: &PipelineDefinition, errors: &mut Vec<String>) {
    // Cardinality errors are already reported; wiring is only meaningful on a full chain
    let Some(graph) = definition.graph() else {
        return;
    };

    let position = |kind: ComponentKind| {
        definition
            .components
            .iter()
            .position(|c| c.kind() == kind)
            .unwrap_or_default()
    };

    check_input(
        position(ComponentKind::Transformer),
        ComponentKind::Transformer,
        &graph.transformer.inputs,
        ComponentKind::Source,
        &graph.source.id,
        errors,
    );
    check_input(
        position(ComponentKind::Sink),
        ComponentKind::Sink,
        &graph.sink.inputs,
        ComponentKind::Transformer,
        &graph.transformer.id,
        errors,
    );
}

fn check_input(
    idx: usize,
    kind: ComponentKind,
    inputs: &[String],
    upstream: ComponentKind,
    upstream_id: &str,
    errors: &mut Vec<String>,
) {
    match inputs {
        [input] if input == upstream_id => {}
        [input] => errors.push(format!(
            "components[{}].inputs: {} input '{}' does not match {} id '{}'",
            idx, kind, input, upstream, upstream_id
        )),
        _ => errors.push(format!(
            "components[{}].inputs: {} must declare exactly one input, found {}",
            idx,
            kind,
            inputs.len()
        )),
    }
}

fn validate_connector(
    idx: usize,
    kind: Option<&str>,
    config: Option<&ConnectorConfig>,
    config_secret_ref: Option<&str>,
    errors: &mut Vec<String>,
) {
    if kind.is_some() && config.is_none() && config_secret_ref.is_none() {
        errors.push(format!(
            "components[{}].config: `config` or `config_secret_ref` must be provided when `kind` is set",
            idx
        ));
    }

    let Some(config) = config else {
        return;
    };

    for (key, entry) in config {
        let field = format!("components[{}].config.{}", idx, key);
        match entry {
            ConfigEntry::Parameter(param) => check_exactly_one(
                &field,
                ("value", param.value.is_some()),
                ("secret_ref", param.secret_ref.is_some()),
                errors,
            ),
            ConfigEntry::Headers(_) => {}
            ConfigEntry::Unrecognized(_) => errors.push(format!(
                "{}: expected a mapping with `value` or `secret_ref`, or a list of headers",
                field
            )),
        }
    }
}

fn validate_transformer(idx: usize, transformer: &TransformerComponent, errors: &mut Vec<String>) {
    check_content(
        &format!("components[{}].transformation", idx),
        &transformer.transformation,
        errors,
    );
    if let Some(requirements) = &transformer.requirements {
        check_content(&format!("components[{}].requirements", idx), requirements, errors);
    }

    for (i, var) in transformer.env_vars.iter().flatten().enumerate() {
        check_exactly_one(
            &format!("components[{}].env_vars[{}] ({})", idx, i, var.name),
            ("value", var.value.is_some()),
            ("value_secret_ref", var.value_secret_ref.is_some()),
            errors,
        );
    }
}

fn check_content(field: &str, source: &ContentSource, errors: &mut Vec<String>) {
    check_exactly_one(
        field,
        ("path", source.path.is_some()),
        ("value", source.value.is_some()),
        errors,
    );
}

fn check_exactly_one(
    field: &str,
    (a, has_a): (&str, bool),
    (b, has_b): (&str, bool),
    errors: &mut Vec<String>,
) {
    match (has_a, has_b) {
        (true, false) | (false, true) => {}
        (true, true) => errors.push(format!(
            "{}: only one of `{}` or `{}` can be set",
            field, a, b
        )),
        (false, false) => errors.push(format!(
            "{}: one of `{}` or `{}` must be set",
            field, a, b
        )),
    }
}
