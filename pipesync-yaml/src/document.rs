//! Writing definition files
//!
//! Remote identifiers are written with a text-level edit of a single top-level
//! key so comments and formatting written by humans survive. A full
//! field-level merge is available for callers that need to persist a whole
//! definition.

use pipesync_core::domain::PipelineDefinition;
use serde_yaml::{Mapping, Value};
use std::path::Path;

use crate::error::{DocumentError, Result};
use crate::parser::read_document;

const PIPELINE_ID_KEY: &str = "pipeline_id";
const SPACE_ID_KEY: &str = "space_id";

/// Persist a remote pipeline ID into a definition file
///
/// Writes to `output` when given, otherwise rewrites `input` in place.
pub fn update_pipeline_id(pipeline_id: &str, input: &Path, output: Option<&Path>) -> Result<()> {
    update_top_level_key(PIPELINE_ID_KEY, pipeline_id, input, output)
}

/// Persist a remote space ID into a definition file
///
/// Writes to `output` when given, otherwise rewrites `input` in place.
pub fn update_space_id(space_id: &str, input: &Path, output: Option<&Path>) -> Result<()> {
    update_top_level_key(SPACE_ID_KEY, space_id, input, output)
}

fn update_top_level_key(key: &str, value: &str, input: &Path, output: Option<&Path>) -> Result<()> {
    let source = read_document(input)?;
    let edited = set_top_level_key(&source, key, value).ok_or_else(|| DocumentError::Edit {
        path: input.to_path_buf(),
        key: key.to_string(),
    })?;

    let target = output.unwrap_or(input);
    std::fs::write(target, edited).map_err(|e| DocumentError::io(target, e))?;

    tracing::debug!("Set {} = {} in {}", key, value, target.display());

    Ok(())
}

/// Set a top-level scalar key in YAML source text
///
/// Replaces the key's line (and any indented continuation lines) when the key
/// exists, keeping a trailing comment on a single-line value, otherwise inserts it at the top of the document after any directive
/// or `---` marker. Returns `None` if the result would not parse back with the
/// expected value.
pub(crate) fn set_top_level_key(source: &str, key: &str, value: &str) -> Option<String> {
    if top_level_string(source, key).as_deref() == Some(value) {
        return Some(source.to_string());
    }

    let rendered = serde_yaml::to_string(value).ok()?;
    let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };
    let entry = format!("{}: {}", key, rendered.trim_end());

    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let prefix = format!("{}:", key);

    let mut out = String::with_capacity(source.len() + entry.len() + 2);
    match lines.iter().position(|line| line.starts_with(&prefix)) {
        Some(start) => {
            let end = lines[start + 1..]
                .iter()
                .position(|line| !is_continuation(line))
                .map_or(lines.len(), |offset| start + 1 + offset);

            let ending = line_ending(lines[end - 1]);
            lines[..start].iter().for_each(|l| out.push_str(l));
            out.push_str(&entry);
            if end == start + 1 {
                if let Some(comment) = trailing_comment(lines[start], prefix.len()) {
                    out.push(' ');
                    out.push_str(comment);
                }
            }
            out.push_str(ending);
            lines[end..].iter().for_each(|l| out.push_str(l));
        }
        None => {
            let insert_at = preamble_end(&lines);
            lines[..insert_at].iter().for_each(|l| out.push_str(l));
            out.push_str(&entry);
            out.push_str(newline);
            lines[insert_at..].iter().for_each(|l| out.push_str(l));
        }
    }

    (top_level_string(&out, key).as_deref() == Some(value)).then_some(out)
}

fn top_level_string(source: &str, key: &str) -> Option<String> {
    let document: Value = serde_yaml::from_str(source).ok()?;
    document.get(key)?.as_str().map(str::to_string)
}

/// Comment after the value on `key: value  # comment`
///
/// `prefix_len` is the length of the `key:` prefix. Block scalars have no
/// trailing comment to keep.
fn trailing_comment(line: &str, prefix_len: usize) -> Option<&str> {
    let rest = line[prefix_len..].trim_end_matches(['\r', '\n']);
    let value = rest.trim_start();

    let scan_from = match value.chars().next() {
        Some('|' | '>') => return None,
        Some(quote @ ('"' | '\'')) => {
            let offset = rest.len() - value.len() + 1;
            offset + closing_quote(&value[1..], quote)? + 1
        }
        _ => 0,
    };

    let tail = &rest[scan_from..];
    let (hash, _) = tail
        .char_indices()
        .find(|&(idx, c)| c == '#' && tail[..idx].ends_with([' ', '\t']))?;
    Some(tail[hash..].trim_end())
}

/// Byte offset of the quote closing a scalar whose opening quote was stripped
fn closing_quote(value: &str, quote: char) -> Option<usize> {
    let mut chars = value.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c == '\\' && quote == '"' {
            chars.next();
        } else if c == quote {
            // '' is an escaped quote inside a single-quoted scalar
            if quote == '\'' && chars.peek().is_some_and(|&(_, next)| next == '\'') {
                chars.next();
            } else {
                return Some(idx);
            }
        }
    }
    None
}

/// Indented, non-blank line belonging to the previous key
fn is_continuation(line: &str) -> bool {
    line.starts_with([' ', '\t']) && !line.trim().is_empty()
}

fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Index just past the last directive or `---` marker before the first content line
fn preamble_end(lines: &[&str]) -> usize {
    let mut end = 0;
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with('%') || trimmed.starts_with("---") {
            end = idx + 1;
        } else if !(trimmed.is_empty() || trimmed.starts_with('#')) {
            break;
        }
    }
    end
}

/// Merge a definition's fields into an existing definition file
///
/// Sets `name`, `pipeline_id`, `space_id` and `space_name` (removing them when unset)
/// and merges each component's fields over the component at the same index.
/// Keys the schema does not know about are kept; comments are not.
pub fn write_definition(
    definition: &PipelineDefinition,
    input: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let source = read_document(input)?;
    let mut document: Value =
        serde_yaml::from_str(&source).map_err(|e| DocumentError::parse(input, e))?;
    let rendered = serde_yaml::to_value(definition).map_err(|e| DocumentError::parse(input, e))?;

    let root = document
        .as_mapping_mut()
        .ok_or_else(|| DocumentError::NotAMapping(input.to_path_buf()))?;

    root.insert("name".into(), definition.name.clone().into());
    set_or_remove(root, PIPELINE_ID_KEY, definition.pipeline_id.as_deref());
    set_or_remove(root, SPACE_ID_KEY, definition.space_id.as_deref());
    set_or_remove(root, "space_name", definition.space_name.as_deref());

    let components = rendered
        .get("components")
        .and_then(Value::as_sequence)
        .cloned()
        .unwrap_or_default();
    merge_components(root, components);

    let yaml = serde_yaml::to_string(&document).map_err(|e| DocumentError::parse(input, e))?;
    let target = output.unwrap_or(input);
    std::fs::write(target, yaml).map_err(|e| DocumentError::io(target, e))?;

    Ok(())
}

fn set_or_remove(root: &mut Mapping, key: &str, value: Option<&str>) {
    match value {
        Some(value) => {
            root.insert(key.into(), value.into());
        }
        None => {
            root.remove(key);
        }
    }
}

fn merge_components(root: &mut Mapping, components: Vec<Value>) {
    let existing = root
        .entry("components".into())
        .or_insert_with(|| Value::Sequence(Vec::new()));

    if !existing.is_sequence() {
        *existing = Value::Sequence(Vec::new());
    }
    let Some(existing) = existing.as_sequence_mut() else {
        return;
    };

    for (idx, component) in components.into_iter().enumerate() {
        if idx >= existing.len() {
            existing.push(component);
            continue;
        }

        match (&mut existing[idx], component) {
            (Value::Mapping(target), Value::Mapping(fields)) => {
                for (k, v) in fields {
                    target.insert(k, v);
                }
            }
            (slot, component) => *slot = component,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::load_definition;

    const PIPELINE: &str = r#"# Orders pipeline, owned by the data team
name: Orders
space_id: my-space-id
components:
  - id: orders
    type: source
    # pulled from pubsub
    kind: google_pubsub
    config:
      project_id:
        value: my-project
  - id: enrich
    type: transformer
    inputs: [orders]
    transformation:
      path: handler.py
    owner: data-team
  - id: out
    type: sink
    inputs: [enrich]
"#;

    fn fixture() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(&path, PIPELINE).unwrap();
        (dir, path)
    }

    #[test]
    fn test_update_pipeline_id_inserts_key_and_keeps_everything_else() {
        let (_dir, path) = fixture();

        update_pipeline_id("abc123", &path, None).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, format!("pipeline_id: abc123\n{}", PIPELINE));
        assert_eq!(
            load_definition(&path).unwrap().pipeline_id.as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn test_update_space_id_replaces_existing_line() {
        let (_dir, path) = fixture();

        update_space_id("new-space-id", &path, None).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            PIPELINE.replace("space_id: my-space-id", "space_id: new-space-id")
        );
    }

    #[test]
    fn test_update_to_output_file_leaves_input_untouched() {
        let (dir, path) = fixture();
        let output = dir.path().join("pipeline_new.yaml");

        update_pipeline_id("test-pipeline-id", &path, Some(&output)).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), PIPELINE);
        let definition = load_definition(&output).unwrap();
        assert_eq!(definition.pipeline_id.as_deref(), Some("test-pipeline-id"));
        assert_eq!(definition.space_id.as_deref(), Some("my-space-id"));
    }

    #[test]
    fn test_setting_same_value_is_byte_identical() {
        let (_dir, path) = fixture();
        update_space_id("my-space-id", &path, None).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), PIPELINE);
    }

    #[test]
    fn test_update_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = update_pipeline_id("x", &dir.path().join("nope.yaml"), None).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_numeric_looking_id_stays_a_string() {
        let edited = set_top_level_key("name: a\n", "pipeline_id", "12345").unwrap();
        assert_eq!(top_level_string(&edited, "pipeline_id").as_deref(), Some("12345"));
        assert!(edited.ends_with("name: a\n"));
    }

    #[test]
    fn test_insert_after_document_marker() {
        let edited = set_top_level_key("# header\n---\nname: a\n", "space_id", "s-1").unwrap();
        assert_eq!(edited, "# header\n---\nspace_id: s-1\nname: a\n");
    }

    #[test]
    fn test_replace_multiline_value() {
        let source = "pipeline_id:\n  old-id\nname: a\n";
        let edited = set_top_level_key(source, "pipeline_id", "new-id").unwrap();
        assert_eq!(edited, "pipeline_id: new-id\nname: a\n");
    }

    #[test]
    fn test_replace_last_line_without_newline() {
        let edited = set_top_level_key("name: a\nspace_id: old", "space_id", "new").unwrap();
        assert_eq!(edited, "name: a\nspace_id: new");
    }

    #[test]
    fn test_replace_keeps_trailing_comment() {
        let source = "name: a\nspace_id: old # assigned by CI\n";
        let edited = set_top_level_key(source, "space_id", "new").unwrap();
        assert_eq!(edited, "name: a\nspace_id: new # assigned by CI\n");
    }

    #[test]
    fn test_hash_inside_quoted_value_is_not_a_comment() {
        let source = "space_id: \"old # not a comment\"  # real one\r\nname: a\r\n";
        let edited = set_top_level_key(source, "space_id", "new").unwrap();
        assert_eq!(edited, "space_id: new # real one\r\nname: a\r\n");

        let source = "space_id: 'it''s # quoted'\n";
        let edited = set_top_level_key(source, "space_id", "new").unwrap();
        assert_eq!(edited, "space_id: new\n");
    }

    #[test]
    fn test_hash_without_leading_space_is_part_of_value() {
        let edited = set_top_level_key("space_id: a#b\n", "space_id", "new").unwrap();
        assert_eq!(edited, "space_id: new\n");
    }

    #[test]
    fn test_nested_key_is_not_touched() {
        let source = "name: a\nmeta:\n  pipeline_id: nested\n";
        let edited = set_top_level_key(source, "pipeline_id", "top").unwrap();
        assert_eq!(edited, format!("pipeline_id: top\n{}", source));
    }

    #[test]
    fn test_crlf_line_endings_are_kept() {
        let edited = set_top_level_key("name: a\r\n", "space_id", "s").unwrap();
        assert_eq!(edited, "space_id: s\r\nname: a\r\n");
    }

    #[test]
    fn test_write_definition_merges_fields() {
        let (_dir, path) = fixture();
        let mut definition = load_definition(&path).unwrap();
        definition.name = "Orders v2".to_string();
        definition.pipeline_id = Some("p-9".to_string());

        write_definition(&definition, &path, None).unwrap();

        let reloaded = load_definition(&path).unwrap();
        assert_eq!(reloaded, definition);

        let document: Value = serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(document["components"][1]["owner"], Value::from("data-team"));
    }

    #[test]
    fn test_write_definition_removes_unset_ids() {
        let (_dir, path) = fixture();
        let mut definition = load_definition(&path).unwrap();
        definition.space_id = None;
        definition.space_name = Some("fresh".to_string());

        write_definition(&definition, &path, None).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("space_id"));
        assert_eq!(load_definition(&path).unwrap().space_name.as_deref(), Some("fresh"));
    }
}
