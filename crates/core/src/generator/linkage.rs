use super::ProjectGenerator;
use super::filter::PathFilterSet;
use crate::error::Result;
use crate::model::configuration::{self, BuildSettings, RUNNER_BASE_CONFIGURATIONS};
use crate::model::{BuildPhase, TargetId};
use std::collections::HashMap;
use tracing::{debug, warn};
use xcbridge_api::{BuildGraphEntry, BuildLabel};

/// Attribute naming the application a test bundle runs inside.
pub const HOST_ATTRIBUTE: &str = "xctest_app";
const XCTEST_ATTRIBUTE: &str = "xctest";

const RUNNER_OVERRIDES: [(&str, &str); 4] = [
    ("DEBUG_INFORMATION_FORMAT", "dwarf"),
    ("ONLY_ACTIVE_ARCH", "YES"),
    ("OTHER_CFLAGS", "-help"),
    ("OTHER_LDFLAGS", "-help"),
];

impl ProjectGenerator<'_> {
    /// Binds dependents to the hosts they name. `batch` maps canonical labels
    /// of the entries synthesized together to their targets; hosts outside it
    /// are ignored.
    pub(super) fn link_hosts(
        &mut self,
        entries: &[BuildGraphEntry],
        batch: &HashMap<BuildLabel, TargetId>,
        filters: &PathFilterSet,
    ) -> Result<()> {
        for entry in entries {
            let Some(host_label) = entry.text_attribute(HOST_ATTRIBUTE) else {
                continue;
            };
            if entry.flag_attribute(XCTEST_ATTRIBUTE) == Some(false) {
                debug!("{} is a logic test, not linking to {}", entry.label, host_label);
                continue;
            }

            let host_key = BuildLabel::new(host_label).canonical()?;
            let Some(&host) = batch.get(&host_key) else {
                warn!(
                    "Host {} of {} is not part of this batch, skipping linkage",
                    host_label, entry.label
                );
                continue;
            };
            let Some(&dependent) = batch.get(&entry.label.canonical()?) else {
                continue;
            };

            self.link(entry, dependent, host, filters)?;
        }
        Ok(())
    }

    fn link(
        &mut self,
        entry: &BuildGraphEntry,
        dependent: TargetId,
        host: TargetId,
        filters: &PathFilterSet,
    ) -> Result<()> {
        let host_name = self.document.target(host).name.clone();
        debug!("Linking '{}' to host '{}'", self.document.target(dependent).name, host_name);

        let sources = self.filtered_sources(entry, filters)?;

        let target = self.document.target_mut(dependent);
        target.configurations.set_all("BUNDLE_LOADER", "$(TEST_HOST)");
        target.configurations.set_all(
            "TEST_HOST",
            &format!("$(BUILT_PRODUCTS_DIR)/{0}.app/{0}", host_name),
        );
        target.add_dependency(host);

        if sources.is_empty() {
            return Ok(());
        }

        // The sources phase must run ahead of the invocation phase.
        let insert_at = target
            .phases
            .iter()
            .position(BuildPhase::is_shell_script)
            .unwrap_or(target.phases.len());
        target
            .phases
            .insert(insert_at, BuildPhase::Sources { files: sources });

        self.add_runner_configurations(host);
        self.add_runner_configurations(dependent);
        self.add_document_runner_configurations();
        Ok(())
    }

    fn add_runner_configurations(&mut self, id: TargetId) {
        let configurations = &mut self.document.target_mut(id).configurations;
        for base in RUNNER_BASE_CONFIGURATIONS {
            let Some(settings) = configurations.get(base) else {
                continue;
            };
            let mut settings = settings.clone();
            for (key, value) in RUNNER_OVERRIDES {
                settings.insert(key.to_string(), value.to_string());
            }
            configurations.insert(&configuration::test_runner_name(base), settings);
        }
    }

    fn add_document_runner_configurations(&mut self) {
        let configurations = self.document.configurations_mut();
        for base in RUNNER_BASE_CONFIGURATIONS {
            if !configurations.contains(base) {
                configurations.insert(base, BuildSettings::new());
            }
            let runner = configuration::test_runner_name(base);
            if !configurations.contains(&runner) {
                let settings = configurations.get(base).cloned().unwrap_or_default();
                configurations.insert(&runner, settings);
            }
        }
    }
}
