use crate::error::{GenerationError, Result};
use std::collections::BTreeMap;

/// Base image policy for one language
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageImageRule {
    /// Image repository name (`openjdk` for java)
    pub image: String,
    /// Tag used when the request carries no version
    pub default_tag: String,
    /// Substrings marking a version that already names an image flavor
    pub variant_markers: Vec<String>,
    /// Appended to a bare version; `None` for languages without flavors
    pub default_variant: Option<String>,
}

impl LanguageImageRule {
    /// Pick the generic reference for an optional version string.
    ///
    /// Variant detection is plain case-sensitive substring containment, so
    /// `314-jre-candidate` counts as already carrying `-jre`.
    pub fn image_for(&self, version: Option<&str>) -> String {
        let version = match version.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => return format!("{}:{}", self.image, self.default_tag),
        };

        match &self.default_variant {
            Some(suffix) if !self.has_variant(version) => {
                format!("{}:{}{}", self.image, version, suffix)
            }
            _ => format!("{}:{}", self.image, version),
        }
    }

    fn has_variant(&self, version: &str) -> bool {
        self.variant_markers.iter().any(|marker| version.contains(marker.as_str()))
    }
}

/// Language → image policy table, keyed by lowercase language name
#[derive(Clone, Debug)]
pub struct BaseImagePolicy {
    rules: BTreeMap<String, LanguageImageRule>,
}

impl Default for BaseImagePolicy {
    fn default() -> Self {
        let mut policy = Self::empty();
        for (language, rule) in get_builtin_image_rules() {
            policy = policy.with_language(language, rule);
        }
        policy
    }
}

impl BaseImagePolicy {
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Add or replace the rule for a language.
    pub fn with_language(mut self, language: &str, rule: LanguageImageRule) -> Self {
        self.rules.insert(language.to_lowercase(), rule);
        self
    }

    pub fn supported_languages(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    pub fn select(&self, language: &str, version: Option<&str>) -> Result<String> {
        let rule = self
            .rules
            .get(&language.trim().to_lowercase())
            .ok_or_else(|| GenerationError::UnsupportedLanguage(language.to_string()))?;

        let image = rule.image_for(version);
        tracing::debug!(
            "Mapping language '{}' version '{:?}' to generic base image '{}'",
            language,
            version,
            image
        );
        Ok(image)
    }
}

/// Select the generic base image using the built-in policy table.
pub fn select_base_image(language: &str, version: Option<&str>) -> Result<String> {
    BaseImagePolicy::default().select(language, version)
}

fn rule(image: &str, default_tag: &str, markers: &[&str], default_variant: Option<&str>) -> LanguageImageRule {
    LanguageImageRule {
        image: image.to_string(),
        default_tag: default_tag.to_string(),
        variant_markers: markers.iter().map(|m| m.to_string()).collect(),
        default_variant: default_variant.map(str::to_string),
    }
}

fn get_builtin_image_rules() -> Vec<(&'static str, LanguageImageRule)> {
    vec![
        ("python", rule("python", "3.11-slim", &["-slim", "-alpine", "-buster"], Some("-slim"))),
        ("node", rule("node", "18-alpine", &["-alpine", "-slim", "-buster"], Some("-alpine"))),
        ("java", rule("openjdk", "17-jdk-slim", &["-jre", "-jdk", "-slim"], Some("-jdk-slim"))),
        ("go", rule("golang", "1.20-alpine", &["-alpine"], Some("-alpine"))),
        // Rust tags have no slim/alpine style default flavor
        ("rust", rule("rust", "1.68", &[], None)),
    ]
}
