//! Eclipse records and the in-memory catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::location::text::fold;

/// Solar or lunar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EclipseKind {
    Solar,
    Lunar,
}

impl EclipseKind {
    pub const ALL: [EclipseKind; 2] = [EclipseKind::Solar, EclipseKind::Lunar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solar => "solar",
            Self::Lunar => "lunar",
        }
    }
}

impl fmt::Display for EclipseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solar => write!(f, "Solar"),
            Self::Lunar => write!(f, "Lunar"),
        }
    }
}

impl FromStr for EclipseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solar" | "sun" => Ok(Self::Solar),
            "lunar" | "moon" => Ok(Self::Lunar),
            _ => Err(format!("Unknown eclipse kind '{}'. Use 'solar' or 'lunar'.", s)),
        }
    }
}

/// Latitude/longitude of greatest eclipse. A coarse hint, not path geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Longitude wrapped into [-180, 180).
    pub fn normalized_lon(&self) -> f64 {
        (self.lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0.0 { 'E' } else { 'W' };
        write!(f, "{:.1}\u{00B0} {}, {:.1}\u{00B0} {}", self.lat.abs(), ns, self.lon.abs(), ew)
    }
}

/// One catalogued eclipse. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EclipseEvent {
    pub kind: EclipseKind,
    pub date: NaiveDate,
    /// "Total", "Annular", "Partial", "Hybrid", "Penumbral" or "Unknown".
    pub subtype: String,
    pub title: String,
    pub peak_description: String,
    pub visibility_regions: Vec<String>,
    /// Free-text visibility notes from the catalog. Searched by the matcher.
    pub visibility_notes: String,
    /// Generated greatest-eclipse / magnitude / Saros line. Display only.
    #[serde(default)]
    pub visibility_hint: String,
    #[serde(default)]
    pub greatest_eclipse: Option<Coordinates>,
    #[serde(default)]
    pub saros: Option<String>,
    #[serde(default)]
    pub magnitude: Option<f64>,
}

impl EclipseEvent {
    /// A bare event with a generated title and no visibility data.
    pub fn new(kind: EclipseKind, date: NaiveDate, subtype: &str) -> Self {
        Self {
            kind,
            date,
            subtype: subtype.to_string(),
            title: compose_title(date, subtype, kind),
            peak_description: String::new(),
            visibility_regions: Vec::new(),
            visibility_notes: String::new(),
            visibility_hint: String::new(),
            greatest_eclipse: None,
            saros: None,
            magnitude: None,
        }
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visibility_regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.visibility_notes = notes.to_string();
        self
    }

    pub fn with_peak_description(mut self, description: &str) -> Self {
        self.peak_description = description.to_string();
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.greatest_eclipse = Some(Coordinates { lat, lon });
        self
    }

    /// "2026-08-12 - Total Solar - August 12, 2026 Total Solar Eclipse"
    pub fn summary(&self) -> String {
        format!("{} - {} {} - {}", self.date, self.subtype, self.kind, self.title)
    }
}

/// "August 12, 2026 Total Solar Eclipse"
pub fn compose_title(date: NaiveDate, subtype: &str, kind: EclipseKind) -> String {
    format!("{} {} {} Eclipse", date.format("%B %d, %Y"), subtype, kind)
}

// ─── Catalog ─────────────────────────────────────────────────────

/// An event with its match fields folded once at load time.
#[derive(Debug, Clone)]
pub(crate) struct CatalogEntry {
    pub event: EclipseEvent,
    pub region_keys: Vec<String>,
    pub notes_key: String,
}

impl CatalogEntry {
    fn new(event: EclipseEvent) -> Self {
        let region_keys = event.visibility_regions.iter().map(|r| fold(r)).collect();
        let notes_key = fold(&event.visibility_notes);
        Self { event, region_keys, notes_key }
    }
}

/// Read-only collection of solar and lunar events.
///
/// Storage order is whatever the loader produced; the matcher sorts.
#[derive(Debug, Clone, Default)]
pub struct EclipseCatalog {
    entries: Vec<CatalogEntry>,
}

impl EclipseCatalog {
    pub fn new(events: Vec<EclipseEvent>) -> Self {
        Self {
            entries: events.into_iter().map(CatalogEntry::new).collect(),
        }
    }

    /// Append another catalog's events after this one's.
    pub fn merge(mut self, other: EclipseCatalog) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &EclipseEvent> {
        self.entries.iter().map(|e| &e.event)
    }

    pub fn count_of(&self, kind: EclipseKind) -> usize {
        self.events().filter(|e| e.kind == kind).count()
    }

    /// Earliest and latest event dates.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.events().map(|e| e.date).min()?;
        let last = self.events().map(|e| e.date).max()?;
        Some((first, last))
    }

    pub(crate) fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}
