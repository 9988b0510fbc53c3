use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recognized generator options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub enum OptionKey {
    /// Target platform SDK.
    #[serde(rename = "SDKROOT")]
    SdkRoot,
    /// Minimum deployment target.
    #[serde(rename = "IPHONEOS_DEPLOYMENT_TARGET")]
    DeploymentTarget,
    /// Extra header search directories, whitespace separated, workspace relative.
    #[serde(rename = "HEADER_SEARCH_PATHS")]
    HeaderSearchPaths,
    #[serde(rename = "OTHER_CFLAGS")]
    OtherCFlags,
    #[serde(rename = "OTHER_LDFLAGS")]
    OtherLdFlags,
    #[serde(rename = "OTHER_SWIFT_FLAGS")]
    OtherSwiftFlags,
}

/// Whether an option lands in the document-level configuration list or in
/// every invocation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionScope {
    Project,
    Target,
}

impl OptionKey {
    pub const ALL: [OptionKey; 6] = [
        OptionKey::SdkRoot,
        OptionKey::DeploymentTarget,
        OptionKey::HeaderSearchPaths,
        OptionKey::OtherCFlags,
        OptionKey::OtherLdFlags,
        OptionKey::OtherSwiftFlags,
    ];

    pub fn scope(&self) -> OptionScope {
        match self {
            OptionKey::SdkRoot | OptionKey::DeploymentTarget | OptionKey::HeaderSearchPaths => {
                OptionScope::Project
            }
            OptionKey::OtherCFlags | OptionKey::OtherLdFlags | OptionKey::OtherSwiftFlags => {
                OptionScope::Target
            }
        }
    }

    /// Build setting the option feeds; also its key in serialized form.
    pub fn build_setting(&self) -> &'static str {
        match self {
            OptionKey::SdkRoot => "SDKROOT",
            OptionKey::DeploymentTarget => "IPHONEOS_DEPLOYMENT_TARGET",
            OptionKey::HeaderSearchPaths => "HEADER_SEARCH_PATHS",
            OptionKey::OtherCFlags => "OTHER_CFLAGS",
            OptionKey::OtherLdFlags => "OTHER_LDFLAGS",
            OptionKey::OtherSwiftFlags => "OTHER_SWIFT_FLAGS",
        }
    }

    pub fn default_value(&self) -> Option<&'static str> {
        match self {
            OptionKey::DeploymentTarget => Some("8.4"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OptionValue {
    /// Value applied to every configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_value: Option<String>,
    /// Per-configuration overrides keyed by configuration name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub configuration_values: BTreeMap<String, String>,
}

/// Option bag for one generation pass. Immutable once handed to the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct GlobalOptions {
    values: BTreeMap<OptionKey, OptionValue>,
}

impl GlobalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_project_value(&mut self, key: OptionKey, value: impl Into<String>) {
        self.values.entry(key).or_default().project_value = Some(value.into());
    }

    pub fn set_configuration_value(
        &mut self,
        key: OptionKey,
        configuration: &str,
        value: impl Into<String>,
    ) {
        self.values
            .entry(key)
            .or_default()
            .configuration_values
            .insert(configuration.to_string(), value.into());
    }

    pub fn with_project_value(mut self, key: OptionKey, value: impl Into<String>) -> Self {
        self.set_project_value(key, value);
        self
    }

    pub fn get(&self, key: OptionKey) -> Option<&OptionValue> {
        self.values.get(&key)
    }

    /// Value of `key` for the given configuration: the configuration override
    /// if present, else the project value, else the key's default.
    pub fn value_for(&self, key: OptionKey, configuration: &str) -> Option<&str> {
        self.values
            .get(&key)
            .and_then(|v| {
                v.configuration_values
                    .get(configuration)
                    .or(v.project_value.as_ref())
                    .map(String::as_str)
            })
            .or_else(|| key.default_value())
    }

    pub fn project_value(&self, key: OptionKey) -> Option<&str> {
        self.values
            .get(&key)
            .and_then(|v| v.project_value.as_deref())
            .or_else(|| key.default_value())
    }
}
