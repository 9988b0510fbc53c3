use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Rule type tag as reported by the build tool (e.g. `ios_application`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RuleType(#[schemars(with = "String")] Cow<'static, str>);

impl RuleType {
    pub const IOS_APPLICATION: RuleType = RuleType(Cow::Borrowed("ios_application"));
    pub const IOS_TEST: RuleType = RuleType(Cow::Borrowed("ios_test"));
    pub const IOS_EXTENSION: RuleType = RuleType(Cow::Borrowed("ios_extension"));
    pub const IOS_FRAMEWORK: RuleType = RuleType(Cow::Borrowed("ios_framework"));
    pub const IOS_BINARY: RuleType = RuleType(Cow::Borrowed("ios_binary"));
    pub const OBJC_LIBRARY: RuleType = RuleType(Cow::Borrowed("objc_library"));
    pub const SWIFT_LIBRARY: RuleType = RuleType(Cow::Borrowed("swift_library"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Static description of how the generator treats this rule type.
    pub fn info(&self) -> RuleInfo {
        match self.as_str() {
            "ios_application" => RuleInfo {
                product_type: ProductType::Application,
                produces_bundle: true,
                attributes: &[],
            },
            "ios_test" => RuleInfo {
                product_type: ProductType::UnitTestBundle,
                produces_bundle: true,
                attributes: &[AttributeRequirement {
                    name: "xctest",
                    default: Some("1"),
                }],
            },
            "ios_extension" => RuleInfo {
                product_type: ProductType::AppExtension,
                produces_bundle: true,
                attributes: &[AttributeRequirement {
                    name: "binary",
                    default: None,
                }],
            },
            "ios_framework" => RuleInfo {
                product_type: ProductType::Framework,
                produces_bundle: true,
                attributes: &[],
            },
            "objc_library" | "swift_library" => RuleInfo {
                product_type: ProductType::StaticLibrary,
                produces_bundle: false,
                attributes: &[],
            },
            _ => RuleInfo {
                product_type: ProductType::Tool,
                produces_bundle: false,
                attributes: &[],
            },
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RuleType {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

impl From<String> for RuleType {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Kind of product the IDE should expect from a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Application,
    UnitTestBundle,
    AppExtension,
    Framework,
    StaticLibrary,
    Tool,
}

impl ProductType {
    /// Product type identifier understood by the IDE.
    pub fn identifier(&self) -> &'static str {
        match self {
            ProductType::Application => "com.apple.product-type.application",
            ProductType::UnitTestBundle => "com.apple.product-type.bundle.unit-test",
            ProductType::AppExtension => "com.apple.product-type.app-extension",
            ProductType::Framework => "com.apple.product-type.framework",
            ProductType::StaticLibrary => "com.apple.product-type.library.static",
            ProductType::Tool => "com.apple.product-type.tool",
        }
    }
}

/// An attribute a rule type needs, with the value assumed when it is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRequirement {
    pub name: &'static str,
    pub default: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleInfo {
    pub product_type: ProductType,
    /// Whether the rule's output is an archived bundle (`<pkg>/<name>.ipa`).
    pub produces_bundle: bool,
    pub attributes: &'static [AttributeRequirement],
}
