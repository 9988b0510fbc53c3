use super::ProjectGenerator;
use super::filter::PathFilterSet;
use crate::error::{GenerationError, Result};
use crate::model::configuration::{BuildSettings, ConfigurationList, STANDARD_CONFIGURATIONS};
use crate::model::{BuildPhase, Target, TargetKind};
use std::collections::HashMap;
use tracing::debug;
use xcbridge_api::{BuildGraphEntry, OptionKey, OptionScope};

const SHELL_PATH: &str = "/bin/bash";

impl ProjectGenerator<'_> {
    /// Creates one invocation target per entry, then resolves host linkage
    /// among the entries of this batch.
    pub fn generate_build_targets(
        &mut self,
        entries: &[BuildGraphEntry],
        filters: &PathFilterSet,
    ) -> Result<()> {
        let mut batch = HashMap::with_capacity(entries.len());
        for entry in entries {
            let target = self.make_invocation_target(entry)?;
            let id = self.register_target(target)?;
            batch.insert(entry.label.canonical()?, id);
        }

        self.link_hosts(entries, &batch, filters)
    }

    /// Builds the target for one entry without adding it to the document.
    pub fn make_invocation_target(&self, entry: &BuildGraphEntry) -> Result<Target> {
        let parts = entry.label.parts()?;
        let info = entry.rule_type.info();

        // --- Step 1: required attributes ---
        for requirement in info.attributes {
            if entry.attribute(requirement.name).is_none() && requirement.default.is_none() {
                return Err(GenerationError::MissingRequiredAttribute {
                    label: entry.label.to_string(),
                    rule_type: entry.rule_type.to_string(),
                    attribute: requirement.name,
                });
            }
        }

        // --- Step 2: settings shared by every configuration ---
        let mut base = BuildSettings::new();
        base.insert("BAZEL_TARGET".to_string(), entry.label.to_string());
        base.insert("BUILD_PATH".to_string(), parts.package.to_string());
        base.insert("PRODUCT_NAME".to_string(), parts.target_name.to_string());
        if info.produces_bundle {
            let ipa = if parts.package.is_empty() {
                format!("{}.ipa", parts.target_name)
            } else {
                format!("{}/{}.ipa", parts.package, parts.target_name)
            };
            base.insert("BAZEL_TARGET_IPA".to_string(), ipa);
        }

        // --- Step 3: fan out, applying per-configuration option overrides ---
        let mut configurations = ConfigurationList::new();
        for name in STANDARD_CONFIGURATIONS {
            let mut settings = base.clone();
            for key in OptionKey::ALL {
                if key.scope() != OptionScope::Target {
                    continue;
                }
                if let Some(value) = self.options.value_for(key, name) {
                    settings.insert(key.build_setting().to_string(), value.to_string());
                }
            }
            configurations.insert(name, settings);
        }

        let mut target = Target::new(parts.target_name, TargetKind::Invocation);
        target.label = Some(entry.label.clone());
        target.product_type = Some(info.product_type);
        target.configurations = configurations;
        target.phases.push(BuildPhase::ShellScript {
            name: format!("build {}", entry.label),
            shell_path: SHELL_PATH.to_string(),
            script: self.invocation_script(entry.label.as_str()),
        });

        debug!(
            "Invocation target '{}' for {} ({})",
            target.name, entry.label, entry.rule_type
        );
        Ok(target)
    }

    fn invocation_script(&self, label: &str) -> String {
        let tool = self.config.build_tool_path.display();

        let mut lines = vec!["set -e".to_string()];
        if let Some(env) = self.config.env_script_path.as_deref().filter(|p| !p.is_empty()) {
            lines.push(format!("source \"{}\"", env));
        }
        match self.config.build_script_path.as_deref().filter(|p| !p.is_empty()) {
            Some(script) => lines.push(format!(
                "exec \"{}\" \"{}\" --bazel \"{}\"",
                script, label, tool
            )),
            None => lines.push(format!("exec \"{}\" build \"{}\"", tool, label)),
        }
        lines.join("\n")
    }
}
