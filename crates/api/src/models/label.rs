use crate::error::{ModelError, ModelResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a build rule, e.g. `//some/package:target`.
///
/// The label is stored exactly as the build tool reported it. Parsing into
/// package and target name happens on demand so that a malformed label only
/// fails the generation pass that actually needs it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct BuildLabel(String);

/// The two halves of a parsed [`BuildLabel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelParts<'a> {
    pub package: &'a str,
    pub target_name: &'a str,
}

impl BuildLabel {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the label into package path and target name.
    ///
    /// Accepted forms are `//pkg:name`, `pkg:name`, `:name` (root package) and
    /// `//pkg` (name taken from the last package segment).
    pub fn parts(&self) -> ModelResult<LabelParts<'_>> {
        let raw = self.0.as_str();
        let invalid = |reason| ModelError::InvalidLabel {
            label: raw.to_string(),
            reason,
        };

        if raw.is_empty() {
            return Err(invalid("label is empty"));
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(invalid("label contains whitespace"));
        }

        let body = raw.strip_prefix("//").unwrap_or(raw);
        let (package, target_name) = match body.split_once(':') {
            Some((_, name)) if name.contains(':') => {
                return Err(invalid("label contains more than one ':'"));
            }
            Some((package, name)) => (package, name),
            None => {
                let name = body.rsplit('/').next().unwrap_or(body);
                (body, name)
            }
        };

        if target_name.is_empty() {
            return Err(invalid("target name is empty"));
        }
        if !package.is_empty() && package.split('/').any(str::is_empty) {
            return Err(invalid("package path has an empty segment"));
        }

        Ok(LabelParts {
            package,
            target_name,
        })
    }

    /// `package:name`, so that `//pkg:name`, `pkg:name` and `//pkg` forms of
    /// one rule compare equal.
    pub fn canonical(&self) -> ModelResult<BuildLabel> {
        let parts = self.parts()?;
        Ok(Self(format!("{}:{}", parts.package, parts.target_name)))
    }

    pub fn package(&self) -> ModelResult<&str> {
        self.parts().map(|p| p.package)
    }

    pub fn target_name(&self) -> ModelResult<&str> {
        self.parts().map(|p| p.target_name)
    }
}

impl fmt::Display for BuildLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BuildLabel {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BuildLabel {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
