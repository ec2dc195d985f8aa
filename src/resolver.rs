//! Harbor path resolution.
//!
//! Maps a generic image reference (`python:3.11-slim`) onto the internal
//! registry path configured for it. Lookup order is exact reference, then
//! bare image name, then a synthesized `library/` path.

use std::collections::BTreeMap;

pub const DEFAULT_TAG: &str = "latest";

/// Read-only mapping table loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarborMapping {
    base_url: String,
    mappings: BTreeMap<String, String>,
}

impl HarborMapping {
    pub fn new(base_url: impl Into<String>, mappings: BTreeMap<String, String>) -> Self {
        Self {
            base_url: base_url.into(),
            mappings,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn mappings(&self) -> &BTreeMap<String, String> {
        &self.mappings
    }

    /// Resolve a generic image reference to its Harbor path.
    ///
    /// Never fails. With no base URL configured the reference is returned
    /// as-is so callers without a registry still get a usable image.
    pub fn resolve(&self, generic_image: &str) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            tracing::warn!(
                "No harbor_base_url configured; leaving '{}' unresolved",
                generic_image
            );
            return generic_image.to_string();
        }

        let (base_name, tag) = split_reference(generic_image);

        if let Some(fragment) = self.mappings.get(generic_image) {
            let path = join_fragment(base, fragment, tag);
            tracing::debug!("Exact mapping found for '{}': {}", generic_image, path);
            return path;
        }

        if let Some(fragment) = self.mappings.get(base_name) {
            let path = join_fragment(base, fragment, tag);
            tracing::debug!("Base name mapping for '{}' found: {}", base_name, path);
            return path;
        }

        tracing::warn!(
            "No mapping found for '{}'. Constructing default path using 'library' scope.",
            generic_image
        );
        format!("{}/library/{}:{}", base, base_name.trim_matches('/'), tag)
    }
}

/// Split `name[:tag]` on the first colon; the tag defaults to `latest`.
pub fn split_reference(reference: &str) -> (&str, &str) {
    match reference.split_once(':') {
        Some((name, tag)) if !tag.is_empty() => (name, tag),
        Some((name, _)) => (name, DEFAULT_TAG),
        None => (reference, DEFAULT_TAG),
    }
}

/// True when the last path segment of a fragment carries its own tag.
fn fragment_has_tag(fragment: &str) -> bool {
    fragment
        .rsplit('/')
        .next()
        .map(|segment| segment.contains(':'))
        .unwrap_or(false)
}

fn join_fragment(base: &str, fragment: &str, tag: &str) -> String {
    let fragment = fragment.trim().trim_matches('/');
    if fragment_has_tag(fragment) {
        format!("{}/{}", base, fragment)
    } else {
        format!("{}/{}:{}", base, fragment, tag)
    }
}
