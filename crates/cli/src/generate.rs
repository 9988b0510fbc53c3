use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;
use xcbridge_api::{GenerationRequest, GlobalOptions};
use xcbridge_core::ProjectDocument;

/// On-disk input of `xcbridge generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Snapshot {
    #[serde(flatten)]
    pub request: GenerationRequest,
    #[serde(default)]
    pub options: GlobalOptions,
}

impl Snapshot {
    pub fn load(path: &Path) -> xcbridge_core::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn generate(&self) -> xcbridge_core::Result<ProjectDocument> {
        xcbridge_core::generate(&self.request, &self.options)
    }
}

pub fn run(snapshot: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    info!("Loading snapshot from {}", snapshot.display());
    let snapshot = Snapshot::load(snapshot)?;

    let document = snapshot.generate()?;
    let json = serde_json::to_string_pretty(&document)?;

    match output {
        Some(path) => {
            fs::write(path, json)?;
            info!("Project document written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
