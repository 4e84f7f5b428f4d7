//! Dependency index
//!
//! Maps each definition file under a directory to the auxiliary files its
//! transformer references (requirements file first, then transformation
//! file). Used to find which pipelines an edited `.py` or `requirements.txt`
//! belongs to.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::error::{DocumentError, Result};
use crate::parser::load_definition;

const DEFINITION_EXTENSIONS: [&str; 2] = ["yaml", "yml"];
const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Check if a path names a pipeline definition file
pub fn is_definition_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DEFINITION_EXTENSIONS.contains(&ext))
}

/// Check if a path names a file a transformer can depend on
pub fn is_auxiliary_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
        || path.file_name().is_some_and(|name| name == REQUIREMENTS_FILE)
}

/// Lexically normalize a path, folding `.` and `..` segments
///
/// Does not touch the filesystem, so symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Definition file -> auxiliary files it depends on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyIndex {
    entries: BTreeMap<PathBuf, Vec<PathBuf>>,
}

impl DependencyIndex {
    /// Every definition file that depends on `file`
    pub fn owners_of(&self, file: &Path) -> Vec<&Path> {
        let file = normalize_path(file);
        self.entries
            .iter()
            .filter(|(_, deps)| deps.contains(&file))
            .map(|(definition, _)| definition.as_path())
            .collect()
    }
}

/// Build the dependency index for every definition file under `dir`
///
/// Best-effort: definition files that fail to load are skipped. A missing
/// directory yields an empty index.
///
/// # Errors
///
/// Returns an error if a directory under `dir` exists but cannot be read.
pub fn build_dependency_index(dir: &Path) -> Result<DependencyIndex> {
    let mut files = Vec::new();
    if dir.is_dir() {
        collect_definition_files(dir, &mut files)?;
    } else {
        tracing::warn!("Pipelines directory {} does not exist", dir.display());
    }

    let mut entries = BTreeMap::new();
    for file in files {
        let definition = match load_definition(&file) {
            Ok(definition) => definition,
            Err(e) => {
                tracing::debug!("Skipping {} while indexing: {}", file.display(), e);
                continue;
            }
        };

        let base = file.parent().unwrap_or_else(|| Path::new(""));
        let mut deps = Vec::new();
        if let Some(transformer) = definition.transformer() {
            if let Some(path) = transformer.requirements.as_ref().and_then(|r| r.path.as_deref()) {
                deps.push(normalize_path(&base.join(path)));
            }
            if let Some(path) = transformer.transformation.path.as_deref() {
                deps.push(normalize_path(&base.join(path)));
            }
        }

        entries.insert(normalize_path(&file), deps);
    }

    tracing::debug!("Indexed {} definition file(s) under {}", entries.len(), dir.display());

    Ok(DependencyIndex { entries })
}

fn collect_definition_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| DocumentError::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        paths.push(entry.map_err(|e| DocumentError::io(dir, e))?.path());
    }
    paths.sort();

    for path in paths {
        if path.is_dir() {
            collect_definition_files(&path, files)?;
        } else if is_definition_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}
