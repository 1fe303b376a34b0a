//! Finder facade: raw location + reference date in, per-kind outcomes out.
//!
//! Owns the normalizer and the catalog so front ends only deal with strings.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

use crate::catalog::{EclipseCatalog, EclipseKind};
use crate::location::{LocationNormalizer, ResolutionFailure, ResolvedLocation};
use crate::matcher::{EventMatcher, MatchOutcome};

/// Errors surfaced to the user by the front ends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FinderError {
    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),
    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),
}

impl FinderError {
    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Resolution(ResolutionFailure::EmptyInput) => "empty_location",
            Self::InvalidDate(_) => "invalid_date",
        }
    }
}

/// `YYYY-MM-DD`, or `today` when absent or blank.
pub fn parse_reference_date(input: Option<&str>, today: NaiveDate) -> Result<NaiveDate, FinderError> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(today),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| FinderError::InvalidDate(s.to_string())),
    }
}

/// Current calendar date in `tz`.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Everything one lookup produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub location: ResolvedLocation,
    pub reference_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solar: Option<MatchOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunar: Option<MatchOutcome>,
}

impl Report {
    pub fn outcome(&self, kind: EclipseKind) -> Option<&MatchOutcome> {
        match kind {
            EclipseKind::Solar => self.solar.as_ref(),
            EclipseKind::Lunar => self.lunar.as_ref(),
        }
    }

    /// True when any requested kind came back without a match.
    pub fn has_misses(&self) -> bool {
        [&self.solar, &self.lunar]
            .into_iter()
            .flatten()
            .any(|o| !o.is_found())
    }
}

/// Normalizer and catalog bundled for repeated lookups.
#[derive(Debug, Clone, Default)]
pub struct EclipseFinder {
    normalizer: LocationNormalizer,
    catalog: EclipseCatalog,
}

impl EclipseFinder {
    pub fn new(normalizer: LocationNormalizer, catalog: EclipseCatalog) -> Self {
        info!(events = catalog.len(), "eclipse finder ready");
        Self { normalizer, catalog }
    }

    pub fn normalizer(&self) -> &LocationNormalizer {
        &self.normalizer
    }

    pub fn catalog(&self) -> &EclipseCatalog {
        &self.catalog
    }

    /// Solar and lunar lookup.
    pub fn lookup(&self, raw: &str, reference: NaiveDate) -> Result<Report, ResolutionFailure> {
        self.lookup_kinds(raw, reference, &EclipseKind::ALL)
    }

    /// Lookup restricted to `kinds`. Kinds not listed are left `None`.
    pub fn lookup_kinds(
        &self,
        raw: &str,
        reference: NaiveDate,
        kinds: &[EclipseKind],
    ) -> Result<Report, ResolutionFailure> {
        let location = self.normalizer.resolve(raw)?;
        let matcher = EventMatcher::new(&self.catalog);
        let run = |kind: EclipseKind| {
            kinds
                .contains(&kind)
                .then(|| matcher.find_next(&location, reference, kind))
        };
        let solar = run(EclipseKind::Solar);
        let lunar = run(EclipseKind::Lunar);
        Ok(Report { location, reference_date: reference, solar, lunar })
    }

    /// Ask on `prompt` and read from `input` until an answer resolves.
    ///
    /// Resolution failures are reported on `prompt` and asked again.
    /// `Ok(None)` means end of input before a usable answer.
    pub fn prompt_lookup<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut prompt: W,
        reference: NaiveDate,
        kinds: &[EclipseKind],
    ) -> io::Result<Option<Report>> {
        loop {
            write!(prompt, "Location (city, region, country or postal code): ")?;
            prompt.flush()?;
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match self.lookup_kinds(line.trim(), reference, kinds) {
                Ok(report) => return Ok(Some(report)),
                Err(e) => {
                    debug!(error = %e, "asking again");
                    writeln!(prompt, "{} Please try again.", e)?;
                }
            }
        }
    }

    /// Parse the date string first, then look up. Used by the front ends.
    pub fn lookup_str(
        &self,
        raw: &str,
        date: Option<&str>,
        today: NaiveDate,
        kinds: &[EclipseKind],
    ) -> Result<Report, FinderError> {
        let reference = parse_reference_date(date, today)?;
        Ok(self.lookup_kinds(raw, reference, kinds)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EclipseEvent;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn finder() -> EclipseFinder {
        let catalog = EclipseCatalog::new(vec![
            EclipseEvent::new(EclipseKind::Solar, date(2026, 8, 12), "Total").with_regions(["North America"]),
            EclipseEvent::new(EclipseKind::Lunar, date(2026, 3, 3), "Total").with_regions(["Asia"]),
        ]);
        EclipseFinder::new(LocationNormalizer::default(), catalog)
    }

    #[test]
    fn test_parse_reference_date() {
        let today = date(2026, 10, 18);
        assert_eq!(parse_reference_date(None, today).unwrap(), today);
        assert_eq!(parse_reference_date(Some("  "), today).unwrap(), today);
        assert_eq!(parse_reference_date(Some("2027-02-06"), today).unwrap(), date(2027, 2, 6));
        assert_eq!(
            parse_reference_date(Some("06/02/2027"), today),
            Err(FinderError::InvalidDate("06/02/2027".into()))
        );
    }

    #[test]
    fn test_lookup_both_kinds() {
        let report = finder().lookup("Toronto, ON, Canada", date(2026, 1, 1)).unwrap();
        let solar = report.solar.as_ref().unwrap().found().unwrap();
        assert_eq!(solar.days_until, 223);
        assert!(!report.lunar.as_ref().unwrap().is_found());
        assert!(report.has_misses());
    }

    #[test]
    fn test_lookup_single_kind() {
        let report = finder()
            .lookup_kinds("Toronto, ON, Canada", date(2026, 1, 1), &[EclipseKind::Solar])
            .unwrap();
        assert!(report.lunar.is_none());
        assert!(report.outcome(EclipseKind::Solar).is_some());
        assert!(!report.has_misses());
    }

    #[test]
    fn test_empty_location() {
        let err = finder().lookup("   ", date(2026, 1, 1)).unwrap_err();
        assert_eq!(err, ResolutionFailure::EmptyInput);
    }

    #[test]
    fn test_lookup_str_errors() {
        let f = finder();
        let today = date(2026, 1, 1);
        let err = f.lookup_str("", None, today, &EclipseKind::ALL).unwrap_err();
        assert_eq!(err.code(), "empty_location");
        let err = f.lookup_str("Toronto", Some("soon"), today, &EclipseKind::ALL).unwrap_err();
        assert_eq!(err.code(), "invalid_date");
        assert_eq!(err.to_string(), "Invalid date 'soon'. Use YYYY-MM-DD.");
    }

    #[test]
    fn test_prompt_asks_again_after_empty_answer() {
        let input = "\n   \nToronto, ON, Canada\n";
        let mut shown = Vec::new();
        let report = finder()
            .prompt_lookup(input.as_bytes(), &mut shown, date(2026, 1, 1), &EclipseKind::ALL)
            .unwrap()
            .unwrap();
        assert_eq!(report.location.raw_input, "Toronto, ON, Canada");
        assert_eq!(report.location.city.as_deref(), Some("Toronto"));
        let shown = String::from_utf8(shown).unwrap();
        assert_eq!(shown.matches("Location input cannot be empty. Please try again.").count(), 2);
        assert_eq!(shown.matches("Location (").count(), 3);
    }

    #[test]
    fn test_prompt_stops_at_end_of_input() {
        let mut shown = Vec::new();
        let report = finder()
            .prompt_lookup("\n".as_bytes(), &mut shown, date(2026, 1, 1), &EclipseKind::ALL)
            .unwrap();
        assert!(report.is_none());
    }

    #[test]
    fn test_report_json_omits_unrequested_kind() {
        let report = finder()
            .lookup_kinds("Canada", date(2026, 1, 1), &[EclipseKind::Lunar])
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("solar").is_none());
        assert_eq!(json["reference_date"], "2026-01-01");
        assert_eq!(json["lunar"]["status"], "no_match");
    }
}
