pub mod configuration;
pub mod document;
pub mod file_tree;
pub mod target;

pub use configuration::{BuildSettings, ConfigurationList};
pub use document::ProjectDocument;
pub use file_tree::{FileNode, FileNodeId, FileNodeKind, FileTree};
pub use target::{BuildPhase, ProxyType, Target, TargetDependency, TargetId, TargetKind};
