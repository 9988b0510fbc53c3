use super::configuration::ConfigurationList;
use super::file_tree::FileTree;
use super::target::{BuildPhase, Target, TargetId, TargetKind};
use crate::error::{GenerationError, Result};
use crate::generator::classify::RootLocation;
use serde::Serialize;
use std::collections::HashMap;
use xcbridge_api::ProductType;

/// The generated project: file tree, targets and the document-level
/// configuration list.
#[derive(Debug, Clone)]
pub struct ProjectDocument {
    pub name: String,
    file_tree: FileTree,
    targets: Vec<Target>,
    target_names: HashMap<String, TargetId>,
    configurations: ConfigurationList,
}

impl ProjectDocument {
    pub fn new(name: impl Into<String>, root: RootLocation) -> Self {
        Self {
            name: name.into(),
            file_tree: FileTree::new(root),
            targets: Vec::new(),
            target_names: HashMap::new(),
            configurations: ConfigurationList::new(),
        }
    }

    pub fn file_tree(&self) -> &FileTree {
        &self.file_tree
    }

    pub fn file_tree_mut(&mut self) -> &mut FileTree {
        &mut self.file_tree
    }

    pub fn configurations(&self) -> &ConfigurationList {
        &self.configurations
    }

    pub fn configurations_mut(&mut self) -> &mut ConfigurationList {
        &mut self.configurations
    }

    /// Registers `target`; names are unique within a document.
    pub fn add_target(&mut self, target: Target) -> Result<TargetId> {
        if self.target_names.contains_key(&target.name) {
            let requested_by = target
                .label
                .as_ref()
                .map(|l| l.to_string())
                .unwrap_or_else(|| target.name.clone());
            return Err(GenerationError::NamingCollision {
                name: target.name,
                requested_by,
            });
        }
        let id = TargetId(self.targets.len());
        self.target_names.insert(target.name.clone(), id);
        self.targets.push(target);
        Ok(id)
    }

    pub fn target(&self, id: TargetId) -> &Target {
        &self.targets[id.0]
    }

    pub fn target_mut(&mut self, id: TargetId) -> &mut Target {
        &mut self.targets[id.0]
    }

    pub fn target_id(&self, name: &str) -> Option<TargetId> {
        self.target_names.get(name).copied()
    }

    pub fn target_by_name(&self, name: &str) -> Option<&Target> {
        self.target_id(name).map(|id| self.target(id))
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target_ids(&self) -> impl Iterator<Item = TargetId> + use<> {
        (0..self.targets.len()).map(TargetId)
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Targets that depend on `id`.
    pub fn dependents_of(&self, id: TargetId) -> Vec<TargetId> {
        self.target_ids()
            .filter(|other| self.target(*other).depends_on(id))
            .collect()
    }
}

#[derive(Serialize)]
struct DocumentView<'a> {
    name: &'a str,
    configurations: &'a ConfigurationList,
    files: &'a FileTree,
    targets: Vec<TargetView<'a>>,
}

#[derive(Serialize)]
struct TargetView<'a> {
    name: &'a str,
    kind: TargetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_type: Option<&'static str>,
    configurations: &'a ConfigurationList,
    phases: Vec<PhaseView<'a>>,
    dependencies: Vec<&'a str>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum PhaseView<'a> {
    ShellScript {
        name: &'a str,
        shell_path: &'a str,
        script: &'a str,
    },
    Sources {
        files: Vec<String>,
    },
    ExternalTool {
        tool_path: &'a str,
        arguments: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        working_directory: Option<&'a str>,
        pass_build_settings_in_environment: bool,
    },
}

impl ProjectDocument {
    fn view(&self) -> DocumentView<'_> {
        let targets = self
            .targets
            .iter()
            .map(|target| TargetView {
                name: &target.name,
                kind: target.kind,
                label: target.label.as_ref().map(|l| l.as_str()),
                product_type: target.product_type.as_ref().map(ProductType::identifier),
                configurations: &target.configurations,
                phases: target.phases.iter().map(|p| self.phase_view(p)).collect(),
                dependencies: target
                    .dependencies
                    .iter()
                    .map(|d| self.target(d.target).name.as_str())
                    .collect(),
            })
            .collect();

        DocumentView {
            name: &self.name,
            configurations: &self.configurations,
            files: &self.file_tree,
            targets,
        }
    }

    fn phase_view<'a>(&'a self, phase: &'a BuildPhase) -> PhaseView<'a> {
        match phase {
            BuildPhase::ShellScript {
                name,
                shell_path,
                script,
            } => PhaseView::ShellScript {
                name,
                shell_path,
                script,
            },
            BuildPhase::Sources { files } => PhaseView::Sources {
                files: files.iter().map(|f| self.file_tree.path_of(*f)).collect(),
            },
            BuildPhase::ExternalTool {
                tool_path,
                arguments,
                working_directory,
                pass_build_settings_in_environment,
            } => PhaseView::ExternalTool {
                tool_path,
                arguments,
                working_directory: working_directory.as_deref(),
                pass_build_settings_in_environment: *pass_build_settings_in_environment,
            },
        }
    }
}

impl Serialize for ProjectDocument {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.view().serialize(serializer)
    }
}
