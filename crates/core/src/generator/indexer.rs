use super::ProjectGenerator;
use super::filter::PathFilterSet;
use crate::error::Result;
use crate::model::configuration::{BuildSettings, ConfigurationList};
use crate::model::{BuildPhase, Target, TargetId, TargetKind};
use std::collections::HashMap;
use tracing::debug;
use xcbridge_api::{BuildGraphEntry, BuildLabel, PathInfo, ProductType, SourceTree};
use xxhash_rust::xxh3::xxh3_64;

/// Every known rule, keyed by canonical label, used to follow dependency
/// edges whatever form a dependency set spells a label in.
#[derive(Debug, Clone, Default)]
pub struct RuleMap {
    rules: HashMap<BuildLabel, BuildGraphEntry>,
}

impl RuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<'e, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'e BuildGraphEntry>,
    {
        let mut map = Self::new();
        for entry in entries {
            map.insert(entry.clone())?;
        }
        Ok(map)
    }

    pub fn insert(&mut self, entry: BuildGraphEntry) -> Result<()> {
        let key = entry.label.canonical()?;
        self.rules.insert(key, entry);
        Ok(())
    }

    pub fn get(&self, label: &BuildLabel) -> Result<Option<&BuildGraphEntry>> {
        Ok(self.rules.get(&label.canonical()?))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

const INDEXER_PREFIX: &str = "_indexer_";
const DATAMODEL_CONTAINER: &str = ".xcdatamodeld";
const GENERATED_ROOT: &str = "bazel-genfiles";

/// `_indexer_<name>_<fingerprint>`; the fingerprint covers the whole label so
/// same-named rules in different packages stay distinct.
pub fn indexer_target_name(label: &BuildLabel) -> Result<String> {
    let name = label.target_name()?;
    let canonical = label.canonical()?;
    Ok(format!(
        "{}{}_{}",
        INDEXER_PREFIX,
        name,
        xxh3_64(canonical.as_str().as_bytes())
    ))
}

impl ProjectGenerator<'_> {
    /// Generates the indexer for `entry` and for every dependency reachable
    /// through `rule_map`. Returns `None` when `entry` has nothing to index.
    pub fn generate_indexer_target(
        &mut self,
        entry: &BuildGraphEntry,
        rule_map: &RuleMap,
        filters: &PathFilterSet,
    ) -> Result<Option<TargetId>> {
        let result = self.index_entry(entry, filters)?;

        let mut pending: Vec<&BuildLabel> = entry.dependencies.iter().rev().collect();
        while let Some(label) = pending.pop() {
            if self.indexed.contains_key(&label.canonical()?) {
                continue;
            }
            let Some(dependency) = rule_map.get(label)? else {
                debug!("No rule for dependency {} of {}", label, entry.label);
                continue;
            };
            self.index_entry(dependency, filters)?;
            pending.extend(dependency.dependencies.iter().rev());
        }

        Ok(result)
    }

    fn index_entry(
        &mut self,
        entry: &BuildGraphEntry,
        filters: &PathFilterSet,
    ) -> Result<Option<TargetId>> {
        let key = entry.label.canonical()?;
        if let Some(existing) = self.indexed.get(&key) {
            return Ok(*existing);
        }
        let name = indexer_target_name(&entry.label)?;

        // --- Step 1: BUILD file ---
        if let Some(build_file) = entry.build_file_path.as_deref() {
            if filters.is_included(build_file) {
                self.generate_file_references([build_file])?;
            }
        }

        // --- Step 2: sources and data models ---
        let mut files = self.filtered_sources(entry, filters)?;
        for model in entry.path_list_attribute("datamodels") {
            let container = datamodel_container(&model.path);
            let id = self
                .document
                .file_tree_mut()
                .get_or_create(model.source_tree(), container)?;
            if !files.contains(&id) {
                files.push(id);
            }
        }

        // --- Step 3: header settings ---
        let pch = entry
            .path_attribute("pch")
            .map(|info| self.header_setting(info));
        let bridging_header = entry
            .path_attribute("bridging_header")
            .map(|info| self.header_setting(info));

        if files.is_empty() && pch.is_none() && bridging_header.is_none() {
            debug!("Nothing to index for {}", entry.label);
            self.indexed.insert(key, None);
            return Ok(None);
        }

        let mut settings = BuildSettings::new();
        settings.insert("PRODUCT_NAME".to_string(), name.clone());
        if let Some(pch) = pch {
            settings.insert("GCC_PREFIX_HEADER".to_string(), pch);
        }
        if let Some(header) = bridging_header {
            settings.insert("SWIFT_OBJC_BRIDGING_HEADER".to_string(), header);
        }

        let mut target = Target::new(name, TargetKind::Indexer);
        target.label = Some(entry.label.clone());
        target.product_type = Some(ProductType::StaticLibrary);
        target.configurations = ConfigurationList::standard(&settings);
        target.phases.push(BuildPhase::Sources { files });

        let id = self.register_target(target)?;
        self.indexed.insert(key, Some(id));
        Ok(Some(id))
    }

    /// Build-setting value for a header attribute.
    fn header_setting(&self, info: &PathInfo) -> String {
        match info.source_tree() {
            SourceTree::Group => format!("{}/{}", self.workspace_setting_root(), info.path),
            SourceTree::BuildOutput => format!("{}/{}", GENERATED_ROOT, info.path),
            SourceTree::Absolute => info.path.clone(),
        }
    }
}

/// `a/M.xcdatamodeld/v2.xcdatamodel` -> `a/M.xcdatamodeld`.
fn datamodel_container(path: &str) -> &str {
    let mut offset = 0;
    while let Some(found) = path[offset..].find(DATAMODEL_CONTAINER) {
        let end = offset + found + DATAMODEL_CONTAINER.len();
        if end == path.len() || path[end..].starts_with('/') {
            return &path[..end];
        }
        offset = end;
    }
    path
}
