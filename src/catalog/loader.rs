//! CSV catalog loader.
//!
//! One file per kind, header row required. Only `Date` is mandatory; the
//! remaining columns (`Type`, `Saros`, `Magnitude`, `Latitude`, `Longitude`,
//! `Duration`, `Regions`, `Notes`) may be absent or blank.
//!
//! Rows with an unreadable date are skipped with a warning, never fatal.

use chrono::NaiveDate;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::types::{compose_title, Coordinates, EclipseCatalog, EclipseEvent, EclipseKind};
use crate::location::text::{fold, title_case};

pub const SOLAR_FILE: &str = "solar_eclipses_1900_2100.csv";
pub const LUNAR_FILE: &str = "lunar_eclipses_1900_2100.csv";

/// Catalog loading errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("Cannot read catalog '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Type", default)]
    subtype: String,
    #[serde(rename = "Saros", default)]
    saros: String,
    #[serde(rename = "Magnitude", default)]
    magnitude: String,
    #[serde(rename = "Latitude", default)]
    latitude: String,
    #[serde(rename = "Longitude", default)]
    longitude: String,
    #[serde(rename = "Duration", default)]
    duration: String,
    #[serde(rename = "Regions", default)]
    regions: String,
    #[serde(rename = "Notes", default)]
    notes: String,
}

/// Load both catalog files from `dir` into one catalog.
pub fn load_dir(dir: &Path) -> Result<EclipseCatalog, CatalogError> {
    let solar = load_file(&dir.join(SOLAR_FILE), EclipseKind::Solar)?;
    let lunar = load_file(&dir.join(LUNAR_FILE), EclipseKind::Lunar)?;
    Ok(solar.merge(lunar))
}

/// Load a single catalog file whose rows are all of `kind`.
pub fn load_file(path: &Path, kind: EclipseKind) -> Result<EclipseCatalog, CatalogError> {
    if !path.is_file() {
        return Err(CatalogError::Missing(path.to_path_buf()));
    }
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|source| CatalogError::Csv { path: path.to_path_buf(), source })?;
    let catalog = read_rows(reader, kind)
        .map_err(|source| CatalogError::Csv { path: path.to_path_buf(), source })?;
    info!(path = %path.display(), kind = kind.as_str(), events = catalog.len(), "loaded catalog");
    Ok(catalog)
}

/// Parse catalog CSV from any reader.
pub fn read_catalog<R: io::Read>(input: R, kind: EclipseKind) -> Result<EclipseCatalog, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input);
    read_rows(reader, kind)
}

fn read_rows<R: io::Read>(mut reader: csv::Reader<R>, kind: EclipseKind) -> Result<EclipseCatalog, csv::Error> {
    let mut events = Vec::new();
    for (index, record) in reader.deserialize::<CatalogRow>().enumerate() {
        let row = match record {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => {
                warn!(row = index + 1, error = %e, "skipping undecodable catalog row");
                continue;
            }
        };
        match row_to_event(row, kind) {
            Some(event) => events.push(event),
            None => warn!(row = index + 1, "skipping catalog row with invalid date"),
        }
    }
    Ok(EclipseCatalog::new(events))
}

fn row_to_event(row: CatalogRow, kind: EclipseKind) -> Option<EclipseEvent> {
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").ok()?;
    let subtype = subtype_label(&row.subtype);
    let saros = non_empty(&row.saros);
    let magnitude = non_empty(&row.magnitude);
    let duration = non_empty(&row.duration).and_then(normalize_duration);
    let coords = match (parse_float(&row.latitude), parse_float(&row.longitude)) {
        (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
        _ => None,
    };

    let mut regions: Vec<String> = Vec::new();
    let explicit = row.regions.split(';').map(str::trim).filter(|r| !r.is_empty());
    for region in explicit.map(str::to_string).chain(approximate_regions(coords).into_iter().map(str::to_string)) {
        if !regions.iter().any(|known| fold(known) == fold(&region)) {
            regions.push(region);
        }
    }

    Some(EclipseEvent {
        kind,
        date,
        title: compose_title(date, &subtype, kind),
        peak_description: peak_description(kind, magnitude, duration.as_deref(), coords, saros),
        visibility_regions: regions,
        visibility_notes: non_empty(&row.notes)
            .map(|n| n.trim_end_matches(&['.', ';'][..]).to_string())
            .unwrap_or_default(),
        visibility_hint: visibility_hint(coords, magnitude, saros),
        greatest_eclipse: coords,
        saros: saros.map(str::to_string),
        magnitude: magnitude.and_then(parse_float),
        subtype,
    })
}

/// Catalog type codes ("T", "A", "H", "P", "N") or words, title-cased.
fn subtype_label(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "Unknown".into();
    }
    if raw.len() <= 2 {
        let label = match raw.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('T') => "Total",
            Some('A') => "Annular",
            Some('H') => "Hybrid",
            Some('P') => "Partial",
            Some('N') => "Penumbral",
            _ => return title_case(raw),
        };
        return label.into();
    }
    title_case(raw)
}

/// Coarse macro-regions from the greatest-eclipse point.
///
/// Longitude bands first, then latitude. No coordinates means "Global".
pub fn approximate_regions(coords: Option<Coordinates>) -> Vec<&'static str> {
    let Some(c) = coords else {
        return vec!["Global"];
    };
    let lon = c.normalized_lon();
    let lat = c.lat;

    if (-170.0..=-30.0).contains(&lon) {
        if lat >= 15.0 {
            vec!["North America"]
        } else if lat <= -10.0 {
            vec!["South America"]
        } else {
            vec!["North America", "South America"]
        }
    } else if lon > -30.0 && lon <= 60.0 {
        if lat >= 35.0 {
            vec!["Europe"]
        } else if lat >= 0.0 {
            vec!["North Africa", "Africa"]
        } else {
            vec!["Africa"]
        }
    } else if lon > 60.0 && lon <= 120.0 {
        if lat >= 25.0 {
            vec!["East Asia", "Asia"]
        } else if lat >= -10.0 {
            vec!["South Asia", "Asia"]
        } else {
            vec!["Oceania"]
        }
    } else if lat >= 0.0 {
        vec!["East Asia", "Asia"]
    } else {
        vec!["Oceania"]
    }
}

/// "02m18s" -> "2m18s", "00h58m" -> "0h58m". Only zeros followed by
/// another digit are dropped.
fn normalize_duration(value: &str) -> Option<String> {
    let mut rest = value.trim();
    if rest.is_empty() {
        return None;
    }
    while rest.starts_with('0') && rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
        rest = &rest[1..];
    }
    Some(rest.to_string())
}

fn peak_description(
    kind: EclipseKind,
    magnitude: Option<&str>,
    duration: Option<&str>,
    coords: Option<Coordinates>,
    saros: Option<&str>,
) -> String {
    let mut parts = Vec::new();
    if let Some(m) = magnitude {
        let body = match kind {
            EclipseKind::Solar => "sun",
            EclipseKind::Lunar => "moon",
        };
        parts.push(format!("Magnitude {} obscuration of the {}.", m, body));
    }
    if let Some(d) = duration {
        parts.push(format!("Duration around {}.", d));
    }
    match coords {
        Some(c) => parts.push(format!("Greatest eclipse near {}.", c)),
        None => parts.push("Greatest eclipse location unknown.".into()),
    }
    if let Some(s) = saros {
        parts.push(format!("Saros cycle {}.", s));
    }
    parts.join(" ")
}

fn visibility_hint(coords: Option<Coordinates>, magnitude: Option<&str>, saros: Option<&str>) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(c) = coords {
        parts.push(format!("Greatest eclipse at {}", c));
    }
    if let Some(m) = magnitude {
        parts.push(format!("magnitude {}", m));
    }
    if let Some(s) = saros {
        parts.push(format!("Saros {}", s));
    }
    parts.join("; ")
}

fn non_empty(s: &str) -> Option<&str> {
    let t = s.trim();
    if t.is_empty() { None } else { Some(t) }
}

fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
