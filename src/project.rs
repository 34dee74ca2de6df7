//! Project root resolution
//!
//! Users point the tool at a project folder, at its `force-app` folder, or
//! straight at the source directory. All of them resolve to the same source
//! root by appending whatever part of the layout is missing.

use std::path::{Path, PathBuf};

use crate::error::{GraphError, Result};

/// Default Salesforce DX source layout
pub const DEFAULT_SOURCE_LAYOUT: &str = "force-app/main/default";

/// A resolved project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    /// Folder the user means, with the layout stripped (used in titles)
    pub project_dir: PathBuf,
    /// Directory holding `classes/`, `lwc/`, ...
    pub source_dir: PathBuf,
}

/// Resolve `path` to the source directory described by `layout`
pub fn resolve_project_root(path: &Path, layout: &str) -> Result<ProjectRoot> {
    let canonical = path.canonicalize().map_err(|_| GraphError::ProjectNotFound {
        path: path.to_path_buf(),
    })?;

    let segments: Vec<&str> = layout.split('/').filter(|s| !s.is_empty()).collect();
    let present = matched_prefix_len(&canonical, &segments);

    let mut source_dir = canonical.clone();
    for segment in &segments[present..] {
        source_dir.push(segment);
    }

    let mut project_dir = canonical;
    for _ in 0..present {
        project_dir.pop();
    }

    if !source_dir.is_dir() {
        return Err(GraphError::InvalidLayout {
            path: path.to_path_buf(),
            expected: layout.to_string(),
        });
    }

    Ok(ProjectRoot { project_dir, source_dir })
}

/// Longest prefix of `segments` that `path` already ends with
fn matched_prefix_len(path: &Path, segments: &[&str]) -> usize {
    let components: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    (1..=segments.len())
        .rev()
        .find(|&k| {
            components.len() >= k
                && components[components.len() - k..]
                    .iter()
                    .zip(&segments[..k])
                    .all(|(c, s)| c == s)
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("force-app/main/default/classes")).unwrap();
        dir
    }

    #[test]
    fn test_resolve_from_each_level() {
        let dir = project();
        let root = dir.path().canonicalize().unwrap();
        let expected = root.join("force-app/main/default");

        for start in ["", "force-app", "force-app/main", "force-app/main/default"] {
            let resolved =
                resolve_project_root(&dir.path().join(start), DEFAULT_SOURCE_LAYOUT).unwrap();
            assert_eq!(resolved.source_dir, expected, "starting from {:?}", start);
            assert_eq!(resolved.project_dir, root);
        }
    }

    #[test]
    fn test_missing_project() {
        let dir = project();
        let err =
            resolve_project_root(&dir.path().join("nope"), DEFAULT_SOURCE_LAYOUT).unwrap_err();
        assert!(matches!(err, GraphError::ProjectNotFound { .. }));
    }

    #[test]
    fn test_folder_without_layout() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_project_root(dir.path(), DEFAULT_SOURCE_LAYOUT).unwrap_err();
        assert!(matches!(err, GraphError::InvalidLayout { .. }));
    }

    #[test]
    fn test_folder_below_source_dir_is_rejected() {
        let dir = project();
        let classes = dir.path().join("force-app/main/default/classes");
        let err = resolve_project_root(&classes, DEFAULT_SOURCE_LAYOUT).unwrap_err();
        assert!(matches!(err, GraphError::InvalidLayout { .. }));
    }
}
