use super::label::BuildLabel;
use super::rule::RuleType;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Where a file path is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceTree {
    /// Relative to the enclosing group, and ultimately to the workspace root.
    Group,
    /// Relative to the build tool's output directory.
    BuildOutput,
    /// An absolute filesystem path.
    Absolute,
}

/// A path-valued attribute together with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PathInfo {
    pub path: String,
    /// Output root the file was generated into, for non-source files.
    #[serde(rename = "rootPath", default, skip_serializing_if = "Option::is_none")]
    pub root_path: Option<String>,
    /// `true` when the file lives in the workspace rather than the build output.
    #[serde(rename = "src", default = "default_is_source")]
    pub is_source: bool,
}

fn default_is_source() -> bool {
    true
}

impl PathInfo {
    pub fn source(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            root_path: None,
            is_source: true,
        }
    }

    pub fn generated(path: impl Into<String>, root_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            root_path: Some(root_path.into()),
            is_source: false,
        }
    }

    pub fn source_tree(&self) -> SourceTree {
        if self.path.starts_with('/') {
            SourceTree::Absolute
        } else if self.is_source {
            SourceTree::Group
        } else {
            SourceTree::BuildOutput
        }
    }
}

/// Attribute values reported for a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Flag(bool),
    Path(PathInfo),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&PathInfo> {
        match self {
            AttributeValue::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Interprets `true`, `1`, `"true"` and `"1"` as set.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AttributeValue::Flag(b) => Some(*b),
            AttributeValue::Text(s) => match s.as_str() {
                "1" | "true" | "True" => Some(true),
                "0" | "false" | "False" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Every path record in this value, flattening nested lists.
    pub fn paths(&self) -> Vec<&PathInfo> {
        match self {
            AttributeValue::Path(p) => vec![p],
            AttributeValue::List(items) => items.iter().flat_map(|v| v.paths()).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<PathInfo> for AttributeValue {
    fn from(p: PathInfo) -> Self {
        AttributeValue::Path(p)
    }
}

/// One rule of the build graph, as discovered by the build tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BuildGraphEntry {
    pub label: BuildLabel,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(default)]
    pub source_files: Vec<String>,
    #[serde(default)]
    pub dependencies: BTreeSet<BuildLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_file_path: Option<String>,
}

impl BuildGraphEntry {
    pub fn new(label: impl Into<BuildLabel>, rule_type: impl Into<RuleType>) -> Self {
        Self {
            label: label.into(),
            rule_type: rule_type.into(),
            attributes: BTreeMap::new(),
            source_files: Vec::new(),
            dependencies: BTreeSet::new(),
            build_file_path: None,
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_sources(mut self, sources: &[&str]) -> Self {
        self.source_files = sources.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_dependencies(mut self, deps: &[&str]) -> Self {
        self.dependencies = deps.iter().map(|d| BuildLabel::new(*d)).collect();
        self
    }

    pub fn with_build_file(mut self, path: &str) -> Self {
        self.build_file_path = Some(path.to_string());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn text_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(AttributeValue::as_text)
    }

    pub fn path_attribute(&self, name: &str) -> Option<&PathInfo> {
        self.attribute(name).and_then(AttributeValue::as_path)
    }

    pub fn path_list_attribute(&self, name: &str) -> Vec<&PathInfo> {
        self.attribute(name).map(|v| v.paths()).unwrap_or_default()
    }

    /// Attribute flag value, falling back to the rule type's declared default.
    pub fn flag_attribute(&self, name: &str) -> Option<bool> {
        if let Some(value) = self.attribute(name) {
            return value.as_flag();
        }
        self.rule_type
            .info()
            .attributes
            .iter()
            .find(|req| req.name == name)
            .and_then(|req| req.default)
            .and_then(|d| AttributeValue::from(d).as_flag())
    }
}
