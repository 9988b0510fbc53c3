//! Placement of the project tree root relative to the workspace.

use std::path::{Component, Path, PathBuf};
use xcbridge_api::SourceTree;

/// Storage kind and offset of the document's root group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootLocation {
    pub source_tree: SourceTree,
    /// `None` when the output root is the workspace root.
    pub path: Option<String>,
}

/// Works out how the workspace root is reached from the output root.
///
/// Inputs are made absolute and normalized lexically, so trailing slashes and
/// `.` segments don't matter and the paths need not exist.
pub fn classify(output_root: &Path, workspace_root: &Path) -> RootLocation {
    let output = normalize(output_root);
    let workspace = normalize(workspace_root);

    if output == workspace {
        return RootLocation {
            source_tree: SourceTree::Group,
            path: None,
        };
    }

    if let Ok(descent) = workspace.strip_prefix(&output) {
        return RootLocation {
            source_tree: SourceTree::Group,
            path: Some(join_segments(descent)),
        };
    }

    if let Ok(ascent) = output.strip_prefix(&workspace) {
        let levels = ascent.components().count();
        return RootLocation {
            source_tree: SourceTree::Group,
            path: Some(vec![".."; levels].join("/")),
        };
    }

    RootLocation {
        source_tree: SourceTree::Absolute,
        path: Some(workspace.to_string_lossy().to_string()),
    }
}

fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| Path::new("/").join(path))
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn join_segments(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
