//! Dialect parsers.
//!
//! Each supported surface syntax turns raw text into the same
//! [`InstanceModel`] shape; completion and validation never look at the
//! dialect beyond [`Dialect::separator`].

mod properties;
mod yaml;

pub use properties::PropertiesParser;
pub use yaml::YamlParser;

use tower_lsp::lsp_types::Url;

use crate::model::InstanceModel;

/// Turns document text into an instance model.
///
/// Implementations are pure and total: malformed spans are left out of the
/// model, never reported as errors.
pub trait DialectParser: Send + Sync {
    fn parse(&self, text: &str) -> InstanceModel;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Properties,
    Yaml,
}

impl Dialect {
    /// Detect the dialect from the file extension, falling back to the
    /// client's language id.
    pub fn detect(uri: &Url, language_id: &str) -> Option<Self> {
        Self::from_path(uri.path()).or_else(|| Self::from_language_id(language_id))
    }

    pub fn from_path(path: &str) -> Option<Self> {
        if path.ends_with(".properties") {
            Some(Self::Properties)
        } else if path.ends_with(".yaml") || path.ends_with(".yml") {
            Some(Self::Yaml)
        } else {
            None
        }
    }

    pub fn from_language_id(language_id: &str) -> Option<Self> {
        match language_id {
            "properties" | "java-properties" | "spring-boot-properties" => Some(Self::Properties),
            "yaml" | "spring-boot-properties-yaml" => Some(Self::Yaml),
            _ => None,
        }
    }

    pub fn parser(&self) -> &'static dyn DialectParser {
        match self {
            Self::Properties => &PropertiesParser,
            Self::Yaml => &YamlParser,
        }
    }

    pub fn parse(&self, text: &str) -> InstanceModel {
        self.parser().parse(text)
    }

    /// What goes between a key and its value.
    pub fn separator(&self) -> &'static str {
        match self {
            Self::Properties => "=",
            Self::Yaml => ": ",
        }
    }
}
