use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEBUG: &str = "Debug";
pub const RELEASE: &str = "Release";
pub const FASTBUILD: &str = "Fastbuild";

/// Configuration names every target carries, in document order.
pub const STANDARD_CONFIGURATIONS: [&str; 3] = [DEBUG, RELEASE, FASTBUILD];

/// Configurations that get a test-runner variant when a test links to a host.
pub const RUNNER_BASE_CONFIGURATIONS: [&str; 2] = [DEBUG, RELEASE];

pub const TEST_RUNNER_PREFIX: &str = "__TestRunner_";

pub type BuildSettings = BTreeMap<String, String>;

pub fn test_runner_name(base: &str) -> String {
    format!("{}{}", TEST_RUNNER_PREFIX, base)
}

/// Named build configurations in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigurationList {
    configurations: IndexMap<String, BuildSettings>,
}

impl ConfigurationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard configurations, all sharing `settings`.
    pub fn standard(settings: &BuildSettings) -> Self {
        let mut list = Self::new();
        for name in STANDARD_CONFIGURATIONS {
            list.insert(name, settings.clone());
        }
        list
    }

    pub fn insert(&mut self, name: &str, settings: BuildSettings) {
        self.configurations.insert(name.to_string(), settings);
    }

    pub fn get(&self, name: &str) -> Option<&BuildSettings> {
        self.configurations.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut BuildSettings> {
        self.configurations.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.configurations.contains_key(name)
    }

    /// Sets `key` in every configuration.
    pub fn set_all(&mut self, key: &str, value: &str) {
        for settings in self.configurations.values_mut() {
            settings.insert(key.to_string(), value.to_string());
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configurations.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BuildSettings)> {
        self.configurations.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }
}
