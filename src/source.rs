//! Source tree access
//!
//! The graph engine never touches the filesystem directly. It asks a
//! [`SourceTree`] for one directory level or one file, and treats `None` as
//! "nothing there". An absent directory is distinct from an empty one.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Narrow I/O interface used by discovery and body resolution
pub trait SourceTree {
    /// Entry names directly under `dir`, in listing order; `None` if `dir` is absent
    fn list_dir(&self, dir: &Path) -> Option<Vec<String>>;

    /// File contents; `None` if the file is absent or unreadable
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    fn read_file(&self, path: &Path) -> Option<String>;
}

/// Reads a project from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSourceTree;

impl SourceTree for FsSourceTree {
    fn list_dir(&self, dir: &Path) -> Option<Vec<String>> {
        if !dir.is_dir() {
            return None;
        }

        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry.file_name().to_string_lossy().into_owned()),
                Err(err) => {
                    debug!("Skipping unreadable entry in {}: {}", dir.display(), err);
                    None
                }
            })
            .collect();

        Some(entries)
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        if !path.is_file() {
            return None;
        }
        match fs::read(path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Some(text),
                Err(err) => {
                    debug!("{} is not valid UTF-8, replacing invalid bytes", path.display());
                    Some(String::from_utf8_lossy(err.as_bytes()).into_owned())
                }
            },
            Err(err) => {
                debug!("Could not read {}: {}", path.display(), err);
                None
            }
        }
    }
}

/// In-memory project tree, listed in insertion order
#[derive(Debug, Default, Clone)]
pub struct MemorySourceTree {
    files: Vec<(PathBuf, String)>,
}

impl MemorySourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        let path = path.into();
        let contents = contents.into();
        match self.files.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = contents,
            None => self.files.push((path, contents)),
        }
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl SourceTree for MemorySourceTree {
    fn list_dir(&self, dir: &Path) -> Option<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        let mut present = false;

        for (path, _) in &self.files {
            let Ok(rest) = path.strip_prefix(dir) else {
                continue;
            };
            let Some(first) = rest.components().next() else {
                continue;
            };
            present = true;
            let name = first.as_os_str().to_string_lossy().into_owned();
            if !names.contains(&name) {
                names.push(name);
            }
        }

        present.then_some(names)
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, contents)| contents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_listing_is_insertion_ordered() {
        let tree = MemorySourceTree::new()
            .with_file("root/classes/B.cls", "b")
            .with_file("root/classes/A.cls", "a")
            .with_file("root/lwc/widget/widget.html", "<template/>")
            .with_file("root/lwc/widget/widget.js", "");

        assert_eq!(
            tree.list_dir(Path::new("root/classes")),
            Some(vec!["B.cls".to_string(), "A.cls".to_string()])
        );
        assert_eq!(
            tree.list_dir(Path::new("root/lwc")),
            Some(vec!["widget".to_string()])
        );
        assert_eq!(tree.list_dir(Path::new("root/flows")), None);
    }

    #[test]
    fn test_memory_read() {
        let mut tree = MemorySourceTree::new();
        tree.insert("root/classes/A.cls", "first");
        tree.insert("root/classes/A.cls", "second");

        assert_eq!(tree.read_file(Path::new("root/classes/A.cls")).as_deref(), Some("second"));
        assert_eq!(tree.read_file(Path::new("root/classes/B.cls")), None);
    }

    #[test]
    fn test_fs_absent_vs_empty() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("classes");
        fs::create_dir(&empty).unwrap();

        let tree = FsSourceTree;
        assert_eq!(tree.list_dir(&empty), Some(Vec::new()));
        assert_eq!(tree.list_dir(&dir.path().join("triggers")), None);

        fs::write(empty.join("Foo.cls"), "public class Foo {}").unwrap();
        assert_eq!(tree.list_dir(&empty), Some(vec!["Foo.cls".to_string()]));
        assert_eq!(
            tree.read_file(&empty.join("Foo.cls")).as_deref(),
            Some("public class Foo {}")
        );
        assert_eq!(tree.read_file(&empty.join("Bar.cls")), None);
    }

    #[test]
    fn test_fs_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Billing.cls");
        fs::write(&path, b"// caf\xe9\nFoo.bar();").unwrap();

        let text = FsSourceTree.read_file(&path).unwrap();
        assert_eq!(text, "// caf\u{FFFD}\nFoo.bar();");
    }
}
