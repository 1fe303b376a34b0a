//! Runtime settings: where the catalog and region tables live, and which
//! time zone "today" is computed in.
//!
//! Precedence for each setting: explicit flag, then environment variable,
//! then a per-user directory (via `dirs`) when it actually holds the file,
//! then the built-in default.

use chrono_tz::Tz;
use std::env;
use std::path::{Path, PathBuf};

use crate::catalog::{self, CatalogError, EclipseCatalog, SOLAR_FILE};
use crate::location::{RegionTables, TableError};

pub const CATALOG_DIR_VAR: &str = "ECLIPSE_CATALOG_DIR";
pub const REGIONS_FILE_VAR: &str = "ECLIPSE_REGIONS_FILE";
const APP_DIR: &str = "eclipse-finder";
const REGIONS_FILE: &str = "regions.json";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown time zone '{0}'. Use an IANA name such as Europe/Madrid.")]
    UnknownTimeZone(String),
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub catalog_dir: Option<PathBuf>,
    pub regions_file: Option<PathBuf>,
    pub tz: Option<String>,
}

/// Per-user directories. Swappable in tests.
#[derive(Debug, Clone, Default)]
pub struct UserDirs {
    pub data: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl UserDirs {
    pub fn current() -> Self {
        Self { data: dirs::data_dir(), config: dirs::config_dir() }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub catalog_dir: PathBuf,
    /// `None` means the tables compiled into the binary.
    pub regions_file: Option<PathBuf>,
    pub tz: Tz,
}

impl Settings {
    /// Resolve against the process environment and real user directories.
    pub fn resolve(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::resolve_with(overrides, |key| env::var(key).ok(), &UserDirs::current())
    }

    pub fn resolve_with<F>(overrides: &Overrides, env: F, user_dirs: &UserDirs) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |key: &str| env(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        let catalog_dir = overrides
            .catalog_dir
            .clone()
            .or_else(|| from_env(CATALOG_DIR_VAR))
            .or_else(|| {
                user_dirs
                    .data
                    .as_ref()
                    .map(|d| d.join(APP_DIR))
                    .filter(|d| d.join(SOLAR_FILE).is_file())
            })
            .unwrap_or_else(|| PathBuf::from("data"));

        let regions_file = overrides
            .regions_file
            .clone()
            .or_else(|| from_env(REGIONS_FILE_VAR))
            .or_else(|| {
                user_dirs
                    .config
                    .as_ref()
                    .map(|d| d.join(APP_DIR).join(REGIONS_FILE))
                    .filter(|p| p.is_file())
            });

        let tz = match overrides.tz.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ConfigError::UnknownTimeZone(name.to_string()))?,
            None => Tz::UTC,
        };

        Ok(Self { catalog_dir, regions_file, tz })
    }

    /// Region tables from the configured file, else the built-in set.
    pub fn region_tables(&self) -> Result<RegionTables, TableError> {
        match &self.regions_file {
            Some(path) => RegionTables::load_from(path),
            None => Ok(RegionTables::builtin()),
        }
    }

    pub fn load_catalog(&self) -> Result<EclipseCatalog, CatalogError> {
        catalog::load_dir(&self.catalog_dir)
    }

    pub fn catalog_dir(&self) -> &Path {
        &self.catalog_dir
    }
}
