//! Typed pipeline flags with defaulted fields and open extras.
//!
//! The downstream pipeline reads a fixed set of options; callers may
//! override any of them per request and may pass additional keys, which are
//! preserved untouched for forward compatibility.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Options controlling the downstream search pipeline.
///
/// Defaults cannot be removed by the caller, only overridden; unknown keys
/// ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchFlags {
    /// Provider used for hypothetical-document generation.
    pub hyde_provider: String,
    /// Provider used for result descriptions.
    pub description_provider: String,
    /// Model used for the reasoning stage.
    pub reasoning_model: String,
    /// Whether to expand the search with alternative skills.
    pub alternative_skills: bool,
    /// Whether to run the reasoning stage.
    pub reasoning: bool,
    /// Whether to fall back to a secondary provider on failure.
    pub fallback: bool,
    /// Caller-supplied keys outside the fixed set, preserved as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Caller-supplied flag overrides; every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFlagOverrides {
    hyde_provider: Option<String>,
    description_provider: Option<String>,
    reasoning_model: Option<String>,
    alternative_skills: Option<bool>,
    reasoning: Option<bool>,
    fallback: Option<bool>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl SearchFlags {
    /// Returns the default flag set for the given provider identifier.
    #[must_use]
    pub fn defaults(default_provider: &str) -> Self {
        Self {
            hyde_provider: default_provider.to_string(),
            description_provider: default_provider.to_string(),
            reasoning_model: default_provider.to_string(),
            alternative_skills: false,
            reasoning: false,
            fallback: false,
            extra: BTreeMap::new(),
        }
    }

    /// Merges caller overrides onto the defaults, field by field.
    #[must_use]
    pub fn with_overrides(default_provider: &str, overrides: SearchFlagOverrides) -> Self {
        let defaults = Self::defaults(default_provider);
        Self {
            hyde_provider: overrides.hyde_provider.unwrap_or(defaults.hyde_provider),
            description_provider: overrides
                .description_provider
                .unwrap_or(defaults.description_provider),
            reasoning_model: overrides
                .reasoning_model
                .unwrap_or(defaults.reasoning_model),
            alternative_skills: overrides
                .alternative_skills
                .unwrap_or(defaults.alternative_skills),
            reasoning: overrides.reasoning.unwrap_or(defaults.reasoning),
            fallback: overrides.fallback.unwrap_or(defaults.fallback),
            extra: overrides.extra,
        }
    }
}
