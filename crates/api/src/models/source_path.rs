use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Marker appended to a directory to include all of its descendants.
pub const RECURSIVE_MARKER: &str = "...";

/// A directory offered to the user for source inclusion, with its selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourcePath {
    pub path: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub recursive: bool,
}

impl SourcePath {
    pub fn new(path: impl Into<String>, selected: bool, recursive: bool) -> Self {
        Self {
            path: path.into(),
            selected,
            recursive,
        }
    }

    /// Path filter entry for this selection, or `None` when it is not selected.
    pub fn filter_entry(&self) -> Option<String> {
        if !self.selected {
            return None;
        }
        let path = self.path.trim_end_matches('/');
        Some(match (self.recursive, path.is_empty()) {
            (false, _) => path.to_string(),
            (true, true) => RECURSIVE_MARKER.to_string(),
            (true, false) => format!("{}/{}", path, RECURSIVE_MARKER),
        })
    }
}
