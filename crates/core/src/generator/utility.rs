use super::ProjectGenerator;
use crate::error::{GenerationError, Result};
use crate::model::configuration::{BuildSettings, ConfigurationList};
use crate::model::{BuildPhase, Target, TargetId, TargetKind};
use tracing::debug;

/// Reserved name of the clean utility target.
pub const CLEAN_TARGET_NAME: &str = "_bazel_clean_";

impl ProjectGenerator<'_> {
    /// Adds the clean utility target. Every other target, whether created
    /// before or after this call, depends on it.
    pub fn generate_clean_target(
        &mut self,
        script_path: &str,
        working_directory: Option<&str>,
    ) -> Result<TargetId> {
        if self.clean_target.is_some() {
            return Err(GenerationError::NamingCollision {
                name: CLEAN_TARGET_NAME.to_string(),
                requested_by: script_path.to_string(),
            });
        }

        let mut target = Target::new(CLEAN_TARGET_NAME, TargetKind::Utility);
        target.configurations = ConfigurationList::standard(&BuildSettings::new());
        target.phases.push(BuildPhase::ExternalTool {
            tool_path: script_path.to_string(),
            arguments: format!("\"{}\"", self.config.build_tool_path.display()),
            working_directory: working_directory.map(str::to_string),
            pass_build_settings_in_environment: true,
        });

        let id = self.document.add_target(target)?;
        self.clean_target = Some(id);
        self.wire_utility_dependencies();

        debug!("Clean target added with script {}", script_path);
        Ok(id)
    }

    /// Points every non-utility target at the clean target. Idempotent.
    pub(super) fn wire_utility_dependencies(&mut self) {
        let Some(clean) = self.clean_target else {
            return;
        };
        for id in self.document.target_ids() {
            if id != clean {
                self.document.target_mut(id).add_dependency(clean);
            }
        }
    }
}
