use xcbridge_api::{ModelError, SourceTree};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Label error: {0}")]
    LabelParse(#[from] ModelError),
    #[error("Rule {label} of type {rule_type} is missing required attribute '{attribute}'")]
    MissingRequiredAttribute {
        label: String,
        rule_type: String,
        attribute: &'static str,
    },
    #[error("Target name '{name}' is already taken (requested for {requested_by})")]
    NamingCollision { name: String, requested_by: String },
    #[error("File reference conflict for '{path}': already present as {existing:?}, requested as {requested:?}")]
    FileReferenceConflict {
        path: String,
        existing: SourceTree,
        requested: SourceTree,
    },
    #[error("Invalid path filter '{filter}': {reason}")]
    InvalidPathFilter { filter: String, reason: &'static str },
    #[error("Target dependencies form a cycle through '{0}'")]
    DependencyCycle(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
