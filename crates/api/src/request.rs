use crate::models::{BuildGraphEntry, SourcePath};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Filesystem locations and names fixed for one generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratorConfig {
    pub project_name: String,
    /// Build tool binary invoked by generated build phases.
    pub build_tool_path: PathBuf,
    /// Wrapper script invoked by invocation targets. When absent the build
    /// tool is called directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_script_path: Option<String>,
    /// Script sourced before every build invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_script_path: Option<String>,
    /// Directory the project document is written into.
    pub output_root: PathBuf,
    /// Root of the build tool's workspace.
    pub workspace_root: PathBuf,
}

impl GeneratorConfig {
    pub fn new(
        project_name: impl Into<String>,
        build_tool_path: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        workspace_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            build_tool_path: build_tool_path.into(),
            build_script_path: None,
            env_script_path: None,
            output_root: output_root.into(),
            workspace_root: workspace_root.into(),
        }
    }
}

/// Parameters of the utility target that cleans the build tool's outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CleanTargetRequest {
    pub script_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
}

/// Everything a single generation pass consumes, apart from the global options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GenerationRequest {
    pub config: GeneratorConfig,
    /// All discovered rules. Rules that no other rule depends on become
    /// invocation targets; the rest only feed indexers.
    #[serde(default)]
    pub rules: Vec<BuildGraphEntry>,
    /// Raw path filter entries (`dir` or `dir/...`).
    #[serde(default)]
    pub path_filters: BTreeSet<String>,
    /// User source-path selections, merged into `path_filters`.
    #[serde(default)]
    pub source_paths: Vec<SourcePath>,
    /// Workspace-relative directories appended to the header search paths.
    #[serde(default)]
    pub additional_include_paths: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_target: Option<CleanTargetRequest>,
}

impl GenerationRequest {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            rules: Vec::new(),
            path_filters: BTreeSet::new(),
            source_paths: Vec::new(),
            additional_include_paths: BTreeSet::new(),
            clean_target: None,
        }
    }

    /// Raw filters plus the entries derived from selected source paths.
    pub fn filter_entries(&self) -> BTreeSet<String> {
        let mut entries = self.path_filters.clone();
        entries.extend(self.source_paths.iter().filter_map(SourcePath::filter_entry));
        entries
    }
}
