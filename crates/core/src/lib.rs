//! Translates a build-tool rule graph into an IDE project document.
//!
//! The entry point is [`generate`], which runs one complete, atomic pass. The
//! lower-level [`ProjectGenerator`] exposes the individual steps for callers
//! that drive a pass themselves.

pub mod error;
pub mod generator;
pub mod logging;
pub mod model;

pub use error::{GenerationError, Result};
pub use generator::{ProjectGenerator, generate};
pub use model::ProjectDocument;
