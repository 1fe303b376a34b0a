//! Gazetteer tables: countries, administrative regions, macro-regions and
//! postal-code inference data.
//!
//! The built-in tables live in `data/regions.json` and are embedded at compile
//! time. A replacement file with the same schema can be loaded at runtime, so
//! region updates never require code changes.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use super::text::fold;

const BUILTIN_JSON: &str = include_str!("../../data/regions.json");

static BUILTIN: Lazy<RegionTables> = Lazy::new(|| {
    RegionTables::from_json_str(BUILTIN_JSON).expect("embedded data/regions.json is valid")
});

/// Errors raised while loading a region table file.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("cannot read region tables '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed region tables: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid region tables: {0}")]
    Invalid(String),
}

// ─── File schema ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct TableFile {
    macro_regions: Vec<String>,
    countries: Vec<Country>,
    admin_regions: Vec<AdminRegion>,
    zip_prefixes: Vec<ZipRange>,
    canada_postal: BTreeMap<String, String>,
}

/// A country with its aliases and the macro-regions it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub macro_regions: Vec<String>,
}

/// A state, province or other first-level subdivision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminRegion {
    pub name: String,
    #[serde(default)]
    pub abbr: Option<String>,
    pub country: String,
}

/// Inclusive range of U.S. ZIP 3-digit prefixes mapped to one region.
#[derive(Debug, Clone, Deserialize)]
struct ZipRange {
    from: u16,
    to: u16,
    region: String,
}

// ─── Indexed tables ──────────────────────────────────────────────

/// Indexed gazetteer. Every key is stored folded.
#[derive(Debug, Clone)]
pub struct RegionTables {
    macro_regions: Vec<String>,
    countries: Vec<Country>,
    admin_regions: Vec<AdminRegion>,
    zip_prefixes: Vec<ZipRange>,
    canada_postal: HashMap<char, usize>,
    macro_index: HashMap<String, usize>,
    country_index: HashMap<String, usize>,
    admin_index: HashMap<String, Vec<usize>>,
}

impl RegionTables {
    /// The tables compiled into the binary.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Load tables from a JSON file on disk.
    pub fn load_from(path: &Path) -> Result<Self, TableError> {
        let data = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        let file: TableFile = serde_json::from_str(json)?;
        Self::index(file)
    }

    fn index(file: TableFile) -> Result<Self, TableError> {
        let mut macro_index = HashMap::new();
        for (i, name) in file.macro_regions.iter().enumerate() {
            macro_index.insert(fold(name), i);
        }

        let mut country_index = HashMap::new();
        for (i, country) in file.countries.iter().enumerate() {
            for macro_region in &country.macro_regions {
                if !macro_index.contains_key(&fold(macro_region)) {
                    return Err(TableError::Invalid(format!(
                        "country '{}' references unknown macro-region '{}'",
                        country.name, macro_region
                    )));
                }
            }
            country_index.insert(fold(&country.name), i);
            for alias in &country.aliases {
                country_index.entry(fold(alias)).or_insert(i);
            }
        }

        let mut admin_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, region) in file.admin_regions.iter().enumerate() {
            if !country_index.contains_key(&fold(&region.country)) {
                return Err(TableError::Invalid(format!(
                    "region '{}' references unknown country '{}'",
                    region.name, region.country
                )));
            }
            admin_index.entry(fold(&region.name)).or_default().push(i);
            if let Some(abbr) = region.abbr.as_deref().filter(|a| !a.trim().is_empty()) {
                admin_index.entry(fold(abbr)).or_default().push(i);
            }
        }

        let admin_by_name = |name: &str| -> Option<usize> {
            admin_index.get(&fold(name)).and_then(|ids| {
                ids.iter().copied().find(|&i| fold(&file.admin_regions[i].name) == fold(name))
            })
        };

        for range in &file.zip_prefixes {
            if range.from > range.to || range.to > 999 {
                return Err(TableError::Invalid(format!(
                    "ZIP prefix range {}..={} is out of order or above 999",
                    range.from, range.to
                )));
            }
            if admin_by_name(&range.region).is_none() {
                return Err(TableError::Invalid(format!(
                    "ZIP prefix range {}..={} maps to unknown region '{}'",
                    range.from, range.to, range.region
                )));
            }
        }

        let mut canada_postal = HashMap::new();
        for (key, province) in &file.canada_postal {
            let mut chars = key.chars();
            let letter = match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
                _ => {
                    return Err(TableError::Invalid(format!(
                        "postal prefix '{}' must be a single letter",
                        key
                    )))
                }
            };
            let id = admin_by_name(province).ok_or_else(|| {
                TableError::Invalid(format!("postal prefix '{}' maps to unknown region '{}'", key, province))
            })?;
            canada_postal.insert(letter, id);
        }

        Ok(Self {
            macro_regions: file.macro_regions,
            countries: file.countries,
            admin_regions: file.admin_regions,
            zip_prefixes: file.zip_prefixes,
            canada_postal,
            macro_index,
            country_index,
            admin_index,
        })
    }

    /// Macro-regions in declaration order (display form).
    pub fn macro_regions(&self) -> &[String] {
        &self.macro_regions
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Look up a macro-region by folded name.
    pub fn macro_region(&self, folded: &str) -> Option<&str> {
        self.macro_index.get(folded).map(|&i| self.macro_regions[i].as_str())
    }

    /// Look up a country by folded name or alias.
    pub fn country(&self, folded: &str) -> Option<&Country> {
        self.country_index.get(folded).map(|&i| &self.countries[i])
    }

    /// All administrative regions whose folded name or abbreviation equals
    /// `folded`, in declaration order.
    pub fn admin_regions(&self, folded: &str) -> Vec<&AdminRegion> {
        self.admin_index
            .get(folded)
            .map(|ids| ids.iter().map(|&i| &self.admin_regions[i]).collect())
            .unwrap_or_default()
    }

    /// Region for a U.S. ZIP 3-digit prefix.
    pub fn zip_region(&self, prefix: u16) -> Option<&AdminRegion> {
        let range = self
            .zip_prefixes
            .iter()
            .find(|r| (r.from..=r.to).contains(&prefix))?;
        self.admin_named(&range.region)
    }

    /// Province for the first letter of a Canadian postal code.
    pub fn canada_province(&self, letter: char) -> Option<&AdminRegion> {
        self.canada_postal
            .get(&letter.to_ascii_uppercase())
            .map(|&i| &self.admin_regions[i])
    }

    fn admin_named(&self, name: &str) -> Option<&AdminRegion> {
        let key = fold(name);
        self.admin_regions(&key).into_iter().find(|r| fold(&r.name) == key)
    }
}

impl Default for RegionTables {
    fn default() -> Self {
        Self::builtin()
    }
}
