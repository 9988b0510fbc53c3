use super::configuration::ConfigurationList;
use super::file_tree::FileNodeId;
use serde::Serialize;
use xcbridge_api::{BuildLabel, ProductType};

/// Position of a target in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(pub(crate) usize);

impl TargetId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Builds one label by shelling out to the build tool.
    Invocation,
    /// Lists sources for the IDE's code model; never builds anything.
    Indexer,
    /// Document-wide helper such as the clean action.
    Utility,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildPhase {
    ShellScript {
        name: String,
        shell_path: String,
        script: String,
    },
    Sources {
        files: Vec<FileNodeId>,
    },
    /// Runs an external tool directly, the way legacy IDE targets do.
    ExternalTool {
        tool_path: String,
        arguments: String,
        working_directory: Option<String>,
        pass_build_settings_in_environment: bool,
    },
}

impl BuildPhase {
    pub fn is_sources(&self) -> bool {
        matches!(self, BuildPhase::Sources { .. })
    }

    pub fn is_shell_script(&self) -> bool {
        matches!(self, BuildPhase::ShellScript { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyType {
    /// Dependency on a target defined in the same document.
    TargetReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDependency {
    pub target: TargetId,
    pub proxy_type: ProxyType,
}

#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub kind: TargetKind,
    pub label: Option<BuildLabel>,
    pub product_type: Option<ProductType>,
    pub configurations: ConfigurationList,
    pub phases: Vec<BuildPhase>,
    pub dependencies: Vec<TargetDependency>,
}

impl Target {
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            product_type: None,
            configurations: ConfigurationList::new(),
            phases: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Adds an edge to `target` unless one already exists.
    pub fn add_dependency(&mut self, target: TargetId) {
        if self.depends_on(target) {
            return;
        }
        self.dependencies.push(TargetDependency {
            target,
            proxy_type: ProxyType::TargetReference,
        });
    }

    pub fn depends_on(&self, target: TargetId) -> bool {
        self.dependencies.iter().any(|d| d.target == target)
    }

    pub fn sources_phase(&self) -> Option<&[FileNodeId]> {
        self.phases.iter().find_map(|phase| match phase {
            BuildPhase::Sources { files } => Some(files.as_slice()),
            _ => None,
        })
    }
}
