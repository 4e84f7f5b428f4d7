//! Run outputs
//!
//! A human-readable summary on stdout and `key=value` lines appended to the
//! CI output file for later steps.

use anyhow::{Context, Result};
use colored::*;
use pipesync_core::domain::ChangeSet;
use std::io::Write;
use std::path::Path;

use crate::reconciler::ApplySummary;

pub type Outputs = Vec<(&'static str, String)>;

/// Outputs describing the planned changes
pub fn plan_outputs(changes: &ChangeSet) -> Outputs {
    vec![
        ("to-create-count", changes.to_create.len().to_string()),
        ("to-update-count", changes.to_update.len().to_string()),
        ("to-update-ids", changes.update_ids().join(" ")),
        ("to-delete-count", changes.to_delete.len().to_string()),
        ("to-delete-ids", changes.delete_ids().join(" ")),
        ("space-to-create-count", changes.spaces_to_create.len().to_string()),
    ]
}

/// Outputs carrying identifiers assigned during the run
pub fn result_outputs(summary: &ApplySummary) -> Outputs {
    let mut outputs = Vec::new();
    if !summary.created_ids.is_empty() {
        outputs.push(("to-create-ids", summary.created_ids.join(" ")));
    }
    if !summary.space_ids.is_empty() {
        outputs.push(("spaces-to-create-ids", summary.space_ids.join(" ")));
    }
    outputs
}

/// Append outputs to `path` as `key=value` lines
pub fn write_outputs(path: &Path, outputs: &Outputs) -> Result<()> {
    if outputs.is_empty() {
        return Ok(());
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open output file {}", path.display()))?;

    for (key, value) in outputs {
        writeln!(file, "{}={}", key, value)
            .with_context(|| format!("Failed to write output file {}", path.display()))?;
    }

    Ok(())
}

/// Print the planned changes
pub fn print_summary(changes: &ChangeSet) {
    println!("{}", "Expected changes on your pipelines:".bold());
    println!("  ‣ Create {} pipeline(s)", changes.to_create.len().to_string().green());
    print_with_ids("Update", changes.update_ids(), |s| s.yellow());
    print_with_ids("Delete", changes.delete_ids(), |s| s.red());

    let spaces = changes.space_names();
    if !spaces.is_empty() {
        println!(
            "The following {} new space(s) will be created: {}",
            spaces.len(),
            spaces.join(" ").cyan()
        );
    }
}

fn print_with_ids(action: &str, ids: Vec<&str>, paint: fn(&str) -> ColoredString) {
    if ids.is_empty() {
        println!("  ‣ {} 0 pipeline(s)", action);
    } else {
        println!(
            "  ‣ {} {} pipeline(s) (IDs: {})",
            action,
            paint(&ids.len().to_string()),
            ids.join(" ").dimmed()
        );
    }
}

/// Print what a run did
pub fn print_result(summary: &ApplySummary) {
    if summary.dry_run {
        println!("{}", "Dry run: no changes were applied.".yellow());
        return;
    }

    println!("{}", "✓ Pipelines synchronized successfully!".green().bold());
    for id in &summary.space_ids {
        println!("  Space created:    {}", id.cyan());
    }
    for id in &summary.created_ids {
        println!("  Pipeline created: {}", id.cyan());
    }
    for id in &summary.updated_ids {
        println!("  Pipeline updated: {}", id.dimmed());
    }
    for id in &summary.deleted_ids {
        println!("  Pipeline deleted: {}", id.dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipesync_core::domain::{PipelineChange, PipelineDefinition, SpaceRequest};
    use std::path::PathBuf;

    fn change(pipeline_id: Option<&str>) -> PipelineChange {
        PipelineChange {
            file: PathBuf::from("pipeline.yaml"),
            pipeline: PipelineDefinition {
                name: "orders".to_string(),
                pipeline_id: pipeline_id.map(str::to_string),
                space_id: None,
                space_name: Some("analytics".to_string()),
                components: Vec::new(),
            },
        }
    }

    #[test]
    fn test_plan_outputs() {
        let changes = ChangeSet {
            to_create: vec![change(None)],
            to_update: vec![change(Some("p-1")), change(Some("p-2"))],
            to_delete: Vec::new(),
            spaces_to_create: vec![SpaceRequest {
                file: PathBuf::from("pipeline.yaml"),
                name: "analytics".to_string(),
            }],
        };

        assert_eq!(
            plan_outputs(&changes),
            vec![
                ("to-create-count", "1".to_string()),
                ("to-update-count", "2".to_string()),
                ("to-update-ids", "p-1 p-2".to_string()),
                ("to-delete-count", "0".to_string()),
                ("to-delete-ids", String::new()),
                ("space-to-create-count", "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_result_outputs_skip_empty_lists() {
        assert!(result_outputs(&ApplySummary::default()).is_empty());

        let summary = ApplySummary {
            created_ids: vec!["p-3".to_string(), "p-4".to_string()],
            ..Default::default()
        };
        assert_eq!(
            result_outputs(&summary),
            vec![("to-create-ids", "p-3 p-4".to_string())]
        );
    }

    #[test]
    fn test_write_outputs_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "existing=1\n").unwrap();

        write_outputs(&path, &vec![("to-create-count", "2".to_string())]).unwrap();
        write_outputs(&path, &vec![("to-create-ids", "a b".to_string())]).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "existing=1\nto-create-count=2\nto-create-ids=a b\n"
        );
    }
}
