//! Immutable component metadata for one catalog version.

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::error::CatalogError;

/// Durations such as `500ms`, `5s` or `1h30m`.
static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(ms|s|m|h|d))+$").expect("duration pattern is valid")
});

/// Declared type of a component parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Duration,
    #[serde(other)]
    Object,
}

impl ParameterType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Duration => "duration",
            Self::Object => "object",
        }
    }

    /// Whether `value` is acceptable for this type.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::String | Self::Object => true,
            Self::Integer => value.parse::<i64>().is_ok(),
            Self::Number => value.parse::<f64>().is_ok(),
            Self::Boolean => value == "true" || value == "false",
            // A bare number is read as milliseconds.
            Self::Duration => value.parse::<u64>().is_ok() || DURATION.is_match(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ParameterModel {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub required: bool,
    pub default: Option<serde_json::Value>,
    pub description: String,
    #[serde(rename = "enum")]
    pub enum_values: Vec<String>,
}

impl ParameterModel {
    /// The default value rendered as it would be written in a document.
    pub fn default_text(&self) -> Option<String> {
        self.default.as_ref().map(|value| match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Whether `value` matches the declared type and allowed values.
    pub fn accepts(&self, value: &str) -> bool {
        if !self.enum_values.is_empty() {
            return self.enum_values.iter().any(|allowed| allowed == value);
        }
        self.kind.accepts(value)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ComponentModel {
    #[serde(skip)]
    pub name: String,
    pub title: String,
    pub description: String,
    pub parameters: IndexMap<String, ParameterModel>,
}

impl ComponentModel {
    /// Look up a parameter, accepting the kebab-case spelling of its name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterModel> {
        self.parameters
            .get(name)
            .or_else(|| self.parameters.get(&kebab_to_camel(name)))
    }
}

/// `include-metadata` → `includeMetadata`.
pub fn kebab_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    components: IndexMap<String, ComponentModel>,
}

/// Metadata for every component of one catalog version.
///
/// Shared read-only behind an `Arc` once published.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogSnapshot {
    version: String,
    components: IndexMap<String, ComponentModel>,
}

impl CatalogSnapshot {
    pub fn new(version: impl Into<String>, components: IndexMap<String, ComponentModel>) -> Self {
        let mut components = components;
        for (name, component) in components.iter_mut() {
            component.name = name.clone();
            for (parameter_name, parameter) in component.parameters.iter_mut() {
                parameter.name = parameter_name.clone();
            }
        }
        Self {
            version: version.into(),
            components,
        }
    }

    /// Parse the JSON catalog format.
    pub fn from_json(version: &str, json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| CatalogError::Malformed {
                version: version.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::new(version, file.components))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn component(&self, id: &str) -> Option<&ComponentModel> {
        self.components.get(id)
    }

    /// Components in catalog order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentModel> {
        self.components.values()
    }
}
