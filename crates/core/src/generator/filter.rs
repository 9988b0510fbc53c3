//! User allow-list restricting which files indexers may reference.

use crate::error::{GenerationError, Result};
use std::collections::BTreeSet;
use xcbridge_api::{RECURSIVE_MARKER, SourcePath};

/// A validated set of path filter entries.
///
/// An entry `dir` admits files whose directory is exactly `dir`; the empty
/// entry therefore admits files directly under the workspace root. An entry
/// `dir/...` admits `dir` itself and everything beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilterSet {
    exact: BTreeSet<String>,
    recursive: BTreeSet<String>,
}

impl PathFilterSet {
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for entry in entries {
            set.insert(entry.as_ref())?;
        }
        Ok(set)
    }

    pub fn from_source_paths(paths: &[SourcePath]) -> Result<Self> {
        Self::new(paths.iter().filter_map(SourcePath::filter_entry))
    }

    pub fn insert(&mut self, entry: &str) -> Result<()> {
        let invalid = |reason| GenerationError::InvalidPathFilter {
            filter: entry.to_string(),
            reason,
        };

        let (base, recursive) = if entry == RECURSIVE_MARKER {
            ("", true)
        } else if let Some(base) = entry.strip_suffix("/...") {
            (base, true)
        } else {
            (entry, false)
        };

        if base.starts_with('/') {
            return Err(invalid("filters are workspace relative"));
        }
        if !base.is_empty() {
            for segment in base.split('/') {
                match segment {
                    "" => return Err(invalid("empty path segment")),
                    "." | ".." => return Err(invalid("relative path segment")),
                    RECURSIVE_MARKER => return Err(invalid("recursive marker must be last")),
                    s if s.ends_with(RECURSIVE_MARKER) => {
                        return Err(invalid("recursive marker must follow a separator"));
                    }
                    _ => {}
                }
            }
        }

        if recursive {
            self.recursive.insert(base.to_string());
        } else {
            self.exact.insert(base.to_string());
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.recursive.is_empty()
    }

    /// Whether `path` (workspace relative) passes at least one entry.
    pub fn is_included(&self, path: &str) -> bool {
        let directory = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        if self.exact.contains(directory) {
            return true;
        }
        self.recursive.iter().any(|base| {
            base.is_empty()
                || path == base
                || directory == base
                || directory
                    .strip_prefix(base.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}
