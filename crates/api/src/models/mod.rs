pub mod entry;
pub mod label;
pub mod options;
pub mod rule;
pub mod source_path;

pub use entry::*;
pub use label::*;
pub use options::*;
pub use rule::*;
pub use source_path::*;
