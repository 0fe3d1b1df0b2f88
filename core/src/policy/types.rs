use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Rego-style package path as reported by the policy engine, e.g.
/// `data.compliance_framework.azure_tags.owner`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct PolicyPackage(pub String);

impl PolicyPackage {
    pub fn new(package: impl Into<String>) -> Self {
        Self(package.into())
    }

    /// The package without its leading `data.` namespace.
    pub fn pure_package(&self) -> &str {
        self.0.strip_prefix("data.").unwrap_or(&self.0)
    }
}

impl fmt::Display for PolicyPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pure_package())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Policy {
    #[serde(default)]
    pub file: String,
    pub package: PolicyPackage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyResult {
    pub policy: Policy,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub additional_variables: Map<String, Value>,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

/// One violation object as reported by a policy.
///
/// `title`, `description` and `remarks` are only taken when they are strings.
/// Any other value reported under those names stays in `extra`, so it still
/// shows up in `payload()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Map<String, Value>")]
pub struct Violation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for Violation {
    fn from(mut extra: Map<String, Value>) -> Self {
        let mut take = |key: &str| match extra.remove(key) {
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                extra.insert(key.to_string(), other);
                None
            }
            None => None,
        };
        let title = take("title");
        let description = take("description");
        let remarks = take("remarks");
        Self {
            title,
            description,
            remarks,
            extra,
        }
    }
}

impl Violation {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn title_or_else(&self, fallback: impl FnOnce() -> String) -> String {
        self.title.clone().unwrap_or_else(fallback)
    }

    pub fn description_or_empty(&self) -> String {
        self.description.clone().unwrap_or_default()
    }

    pub fn remarks_or_empty(&self) -> String {
        self.remarks.clone().unwrap_or_default()
    }

    /// Compact JSON of every field the engine reported.
    pub fn payload(&self) -> String {
        let mut fields = self.extra.clone();
        for (k, v) in [
            ("title", &self.title),
            ("description", &self.description),
            ("remarks", &self.remarks),
        ] {
            if let Some(v) = v {
                fields.insert(k.to_string(), json!(v));
            }
        }
        Value::Object(fields).to_string()
    }
}
