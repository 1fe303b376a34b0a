//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};

/// A free-form location reduced to ordered match tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// The input exactly as given.
    pub raw_input: String,
    /// Folded match candidates, most specific first. Never empty.
    pub tokens: Vec<String>,
    /// Best-guess administrative or macro region (display form).
    #[serde(default)]
    pub inferred_region: Option<String>,
    /// True when the input was a U.S. ZIP or Canadian postal code.
    #[serde(default)]
    pub is_postal_code: bool,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub admin_region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    /// Segment tokens the gazetteer read as a differently named place
    /// ("on" for Ontario). The canonical name is also in `tokens`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ResolvedLocation {
    /// "City, Region, Country" from whichever parts were recognized.
    pub fn formatted(&self) -> String {
        let parts: Vec<&str> = [&self.city, &self.admin_region, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        if parts.is_empty() {
            match &self.postal_code {
                Some(code) => code.clone(),
                None => self.raw_input.trim().to_string(),
            }
        } else {
            parts.join(", ")
        }
    }

    /// Position of `token` in specificity order.
    pub fn token_rank(&self, token: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t == token)
    }
}

/// Why a location string could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionFailure {
    #[error("Location input cannot be empty.")]
    EmptyInput,
}
