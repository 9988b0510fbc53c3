pub mod error;
pub mod models;
pub mod request;

// Re-export commonly used types
pub use error::{ModelError, ModelResult};
pub use models::*;
pub use request::{CleanTargetRequest, GenerationRequest, GeneratorConfig};
