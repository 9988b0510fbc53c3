//! Single-pass translation of build-graph entries into a [`ProjectDocument`].
//!
//! A pass is driven through [`ProjectGenerator`]: targets are synthesized into
//! the in-progress document, then [`ProjectGenerator::finish`] wires the
//! utility target into every other target and checks the dependency graph.
//! Any error drops the generator and with it the partial document.

pub mod classify;
pub mod filter;
mod indexer;
mod invocation;
mod linkage;
mod utility;

pub use filter::PathFilterSet;
pub use indexer::{RuleMap, indexer_target_name};
pub use utility::CLEAN_TARGET_NAME;

use crate::error::{GenerationError, Result};
use crate::model::configuration::{BuildSettings, STANDARD_CONFIGURATIONS};
use crate::model::{FileNodeId, ProjectDocument, Target, TargetId};
use classify::RootLocation;
use petgraph::graph::DiGraph;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};
use xcbridge_api::{
    BuildGraphEntry, BuildLabel, GenerationRequest, GeneratorConfig, GlobalOptions, OptionKey,
    SourceTree,
};

/// Owns the document for the duration of one generation pass.
pub struct ProjectGenerator<'a> {
    config: &'a GeneratorConfig,
    options: &'a GlobalOptions,
    root: RootLocation,
    document: ProjectDocument,
    /// Labels already handled by the indexer synthesizer.
    indexed: HashMap<BuildLabel, Option<TargetId>>,
    clean_target: Option<TargetId>,
}

impl<'a> ProjectGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig, options: &'a GlobalOptions) -> Self {
        let root = classify::classify(&config.output_root, &config.workspace_root);
        debug!(
            "Project root group: {:?} {:?}",
            root.source_tree,
            root.path.as_deref()
        );
        Self {
            config,
            options,
            document: ProjectDocument::new(config.project_name.clone(), root.clone()),
            root,
            indexed: HashMap::new(),
            clean_target: None,
        }
    }

    /// Read-only view of the document being built.
    pub fn document(&self) -> &ProjectDocument {
        &self.document
    }

    pub fn root_location(&self) -> &RootLocation {
        &self.root
    }

    /// Writes the standard configurations into the document-level list.
    pub fn generate_top_level_build_configurations(
        &mut self,
        additional_include_paths: &BTreeSet<String>,
    ) {
        let workspace = self.workspace_setting_root();

        let mut search_paths = vec![workspace.clone()];
        search_paths.extend(
            additional_include_paths
                .iter()
                .map(|p| format!("{}/{}", workspace, p)),
        );
        if let Some(extra) = self.options.project_value(OptionKey::HeaderSearchPaths) {
            search_paths.extend(
                extra
                    .split_whitespace()
                    .map(|p| format!("{}/{}", workspace, p)),
            );
        }
        let search_paths = search_paths.join(" ");

        for name in STANDARD_CONFIGURATIONS {
            let mut settings = BuildSettings::new();
            for (key, value) in [
                ("ALWAYS_SEARCH_USER_PATHS", "NO"),
                ("CODE_SIGN_IDENTITY", ""),
                ("CODE_SIGNING_REQUIRED", "NO"),
                ("ENABLE_TESTABILITY", "YES"),
                ("ONLY_ACTIVE_ARCH", "YES"),
            ] {
                settings.insert(key.to_string(), value.to_string());
            }
            settings.insert("HEADER_SEARCH_PATHS".to_string(), search_paths.clone());
            for key in [OptionKey::DeploymentTarget, OptionKey::SdkRoot] {
                if let Some(value) = self.options.value_for(key, name) {
                    settings.insert(key.build_setting().to_string(), value.to_string());
                }
            }
            self.document.configurations_mut().insert(name, settings);
        }
    }

    /// Adds workspace-relative references for arbitrary files (BUILD files).
    pub fn generate_file_references<I, S>(&mut self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            self.document
                .file_tree_mut()
                .get_or_create(SourceTree::Group, path.as_ref())?;
        }
        Ok(())
    }

    /// Completes the pass and hands over the document.
    pub fn finish(mut self) -> Result<ProjectDocument> {
        self.wire_utility_dependencies();
        self.check_acyclic()?;

        info!(
            "Generated project '{}': {} targets, {} file nodes",
            self.document.name,
            self.document.target_count(),
            self.document.file_tree().node_count()
        );
        Ok(self.document)
    }

    /// Adds a target, attaching the utility dependency if one already exists.
    fn register_target(&mut self, target: Target) -> Result<TargetId> {
        debug!("Adding {:?} target '{}'", target.kind, target.name);
        let id = self.document.add_target(target)?;
        if let Some(clean) = self.clean_target {
            if clean != id {
                self.document.target_mut(id).add_dependency(clean);
            }
        }
        Ok(id)
    }

    /// File references for the entry's sources that pass `filters`, in
    /// source order and without duplicates.
    fn filtered_sources(
        &mut self,
        entry: &BuildGraphEntry,
        filters: &PathFilterSet,
    ) -> Result<Vec<FileNodeId>> {
        let mut files = Vec::new();
        for path in &entry.source_files {
            if !filters.is_included(path) {
                continue;
            }
            let origin = if path.starts_with('/') {
                SourceTree::Absolute
            } else {
                SourceTree::Group
            };
            let id = self.document.file_tree_mut().get_or_create(origin, path)?;
            if !files.contains(&id) {
                files.push(id);
            }
        }
        Ok(files)
    }

    /// Path the workspace root has in build settings.
    fn workspace_setting_root(&self) -> String {
        match (&self.root.source_tree, &self.root.path) {
            (SourceTree::Absolute, Some(path)) => path.clone(),
            (_, Some(path)) => format!("$(SRCROOT)/{}", path),
            (_, None) => "$(SRCROOT)".to_string(),
        }
    }

    fn check_acyclic(&self) -> Result<()> {
        let mut graph = DiGraph::<TargetId, ()>::new();
        let nodes: Vec<_> = self
            .document
            .target_ids()
            .map(|id| graph.add_node(id))
            .collect();
        for id in self.document.target_ids() {
            for dep in &self.document.target(id).dependencies {
                graph.add_edge(nodes[id.index()], nodes[dep.target.index()], ());
            }
        }

        petgraph::algo::toposort(&graph, None)
            .map(|_| ())
            .map_err(|cycle| {
                let id = graph[cycle.node_id()];
                GenerationError::DependencyCycle(self.document.target(id).name.clone())
            })
    }
}

/// Runs a complete generation pass.
///
/// Rules no other rule depends on become invocation targets; indexers are
/// generated for those rules and, through the rule map, for everything they
/// depend on.
pub fn generate(request: &GenerationRequest, options: &GlobalOptions) -> Result<ProjectDocument> {
    let filters = PathFilterSet::new(request.filter_entries())?;
    let mut generator = ProjectGenerator::new(&request.config, options);

    generator.generate_top_level_build_configurations(&request.additional_include_paths);

    let rule_map = RuleMap::from_entries(&request.rules)?;

    let consumed = request
        .rules
        .iter()
        .flat_map(|entry| entry.dependencies.iter())
        .map(BuildLabel::canonical)
        .collect::<std::result::Result<HashSet<_>, _>>()?;
    let mut top_level: Vec<BuildGraphEntry> = Vec::new();
    for entry in &request.rules {
        if !consumed.contains(&entry.label.canonical()?) {
            top_level.push(entry.clone());
        }
    }
    info!(
        "Generating '{}' from {} rules ({} top level)",
        request.config.project_name,
        request.rules.len(),
        top_level.len()
    );

    let build_files: BTreeSet<&str> = request
        .rules
        .iter()
        .filter_map(|entry| entry.build_file_path.as_deref())
        .filter(|path| filters.is_included(path))
        .collect();
    generator.generate_file_references(build_files)?;

    generator.generate_build_targets(&top_level, &filters)?;
    for entry in &top_level {
        generator.generate_indexer_target(entry, &rule_map, &filters)?;
    }

    if let Some(clean) = &request.clean_target {
        generator.generate_clean_target(&clean.script_path, clean.working_directory.as_deref())?;
    }

    generator.finish()
}
