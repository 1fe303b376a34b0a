//! Event matcher: next catalogued eclipse visible from a resolved location.
//!
//! Events are scanned in ascending date order from the reference date. For
//! each event the location's tokens are tried most specific first, against
//! region tags and then against the free-text notes. The first event with any
//! hit wins, so an earlier notes match beats a later tag match.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::catalog::types::CatalogEntry;
use crate::catalog::{EclipseCatalog, EclipseEvent, EclipseKind};
use crate::location::text::contains_phrase;
use crate::location::ResolvedLocation;

/// Broad keywords offered when nothing in the location matched.
pub const MACRO_REGION_SUGGESTIONS: [&str; 6] = [
    "north america",
    "south america",
    "europe",
    "africa",
    "asia",
    "oceania",
];

/// Which event field produced the hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBasis {
    RegionTag,
    Notes,
}

/// A matched upcoming event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub event: EclipseEvent,
    /// The location token that hit, in folded form.
    pub matched_token: String,
    pub basis: MatchBasis,
    /// Whole days from the reference date. Zero on the day itself.
    pub days_until: i64,
}

impl MatchResult {
    /// "Matched region tag 'north america'."
    pub fn explanation(&self) -> String {
        match self.basis {
            MatchBasis::RegionTag => format!("Matched region tag '{}'.", self.matched_token),
            MatchBasis::Notes => format!("Matched visibility notes on '{}'.", self.matched_token),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionReason {
    /// A less specific part of the input.
    Broader,
    /// A continent-scale keyword not present in the input.
    MacroRegion,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub token: String,
    pub reason: SuggestionReason,
}

/// Nothing upcoming matched. Not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoMatch {
    pub suggestions: Vec<Suggestion>,
    /// First upcoming event of the requested kind, regardless of location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest: Option<EclipseEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Found(MatchResult),
    NoMatch(NoMatch),
}

impl MatchOutcome {
    pub fn found(&self) -> Option<&MatchResult> {
        match self {
            Self::Found(m) => Some(m),
            Self::NoMatch(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.found().is_some()
    }
}

/// Stateless matcher over a borrowed catalog.
#[derive(Debug, Clone, Copy)]
pub struct EventMatcher<'a> {
    catalog: &'a EclipseCatalog,
}

impl<'a> EventMatcher<'a> {
    pub fn new(catalog: &'a EclipseCatalog) -> Self {
        Self { catalog }
    }

    /// Next event of `kind` on or after `reference` visible from `location`.
    pub fn find_next(&self, location: &ResolvedLocation, reference: NaiveDate, kind: EclipseKind) -> MatchOutcome {
        let upcoming = self.upcoming(kind, reference);

        for entry in &upcoming {
            if let Some((token, basis)) = match_entry(entry, &location.tokens) {
                let days_until = (entry.event.date - reference).num_days();
                debug!(
                    kind = kind.as_str(),
                    date = %entry.event.date,
                    token,
                    basis = ?basis,
                    "matched event"
                );
                return MatchOutcome::Found(MatchResult {
                    event: entry.event.clone(),
                    matched_token: token.to_string(),
                    basis,
                    days_until,
                });
            }
        }

        debug!(kind = kind.as_str(), candidates = upcoming.len(), "no upcoming event matched");
        MatchOutcome::NoMatch(NoMatch {
            suggestions: suggestions(location),
            nearest: upcoming.first().map(|e| e.event.clone()),
        })
    }

    /// Solar and lunar outcomes, in that order.
    pub fn find_both(&self, location: &ResolvedLocation, reference: NaiveDate) -> (MatchOutcome, MatchOutcome) {
        (
            self.find_next(location, reference, EclipseKind::Solar),
            self.find_next(location, reference, EclipseKind::Lunar),
        )
    }

    fn upcoming(&self, kind: EclipseKind, reference: NaiveDate) -> Vec<&'a CatalogEntry> {
        let mut entries: Vec<&CatalogEntry> = self
            .catalog
            .entries()
            .iter()
            .filter(|e| e.event.kind == kind && e.event.date >= reference)
            .collect();
        // Stable: same-day events keep catalog order.
        entries.sort_by_key(|e| e.event.date);
        entries
    }
}

fn match_entry<'t>(entry: &CatalogEntry, tokens: &'t [String]) -> Option<(&'t str, MatchBasis)> {
    if let Some(token) = tokens.iter().find(|t| entry.region_keys.iter().any(|k| k == *t)) {
        return Some((token.as_str(), MatchBasis::RegionTag));
    }
    tokens
        .iter()
        .find(|t| contains_phrase(&entry.notes_key, t))
        .map(|t| (t.as_str(), MatchBasis::Notes))
}

/// Broader tokens minus aliases whose canonical name already follows.
fn suggestions(location: &ResolvedLocation) -> Vec<Suggestion> {
    let tokens = &location.tokens;
    let mut out: Vec<Suggestion> = tokens
        .iter()
        .skip(1)
        .filter(|t| !location.aliases.contains(t))
        .map(|t| Suggestion { token: t.clone(), reason: SuggestionReason::Broader })
        .collect();
    for keyword in MACRO_REGION_SUGGESTIONS {
        if !tokens.iter().any(|t| t == keyword) {
            out.push(Suggestion { token: keyword.to_string(), reason: SuggestionReason::MacroRegion });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationNormalizer;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn location(tokens: &[&str]) -> ResolvedLocation {
        ResolvedLocation {
            raw_input: tokens.first().copied().unwrap_or_default().to_string(),
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            inferred_region: None,
            is_postal_code: false,
            city: None,
            admin_region: None,
            country: None,
            postal_code: None,
            aliases: Vec::new(),
        }
    }

    fn solar(y: i32, m: u32, d: u32) -> EclipseEvent {
        EclipseEvent::new(EclipseKind::Solar, date(y, m, d), "Total")
    }

    fn lunar(y: i32, m: u32, d: u32) -> EclipseEvent {
        EclipseEvent::new(EclipseKind::Lunar, date(y, m, d), "Total")
    }

    fn sample_catalog() -> EclipseCatalog {
        EclipseCatalog::new(vec![
            solar(2027, 8, 2).with_regions(["Spain", "Egypt", "Europe"]),
            solar(2026, 8, 12)
                .with_regions(["Greenland", "Iceland", "Spain", "North America"])
                .with_notes("Totality crosses Iceland and northern Spain"),
            solar(2024, 4, 8).with_regions(["Mexico", "United States", "Canada"]),
            solar(2028, 7, 22).with_regions(["Australia", "Oceania"]),
            lunar(2026, 3, 3).with_regions(["Asia", "Oceania", "North America"]),
            lunar(2029, 12, 20).with_regions(["Europe", "Africa"]),
        ])
    }

    #[test]
    fn test_toronto_scenario() {
        let catalog = EclipseCatalog::new(vec![solar(2026, 8, 12).with_regions(["North America"])]);
        let loc = LocationNormalizer::default().resolve("Toronto, ON, Canada").unwrap();
        let outcome = EventMatcher::new(&catalog).find_next(&loc, date(2026, 1, 1), EclipseKind::Solar);
        let found = outcome.found().unwrap();
        assert_eq!(found.matched_token, "north america");
        assert_eq!(found.basis, MatchBasis::RegionTag);
        assert_eq!(found.days_until, 223);
        assert_eq!(found.event.date, date(2026, 8, 12));
    }

    #[test]
    fn test_future_only() {
        let catalog = sample_catalog();
        let matcher = EventMatcher::new(&catalog);
        let outcome = matcher.find_next(&location(&["spain"]), date(2026, 9, 1), EclipseKind::Solar);
        let found = outcome.found().unwrap();
        assert_eq!(found.event.date, date(2027, 8, 2));
        assert!(found.days_until >= 0);
    }

    #[test]
    fn test_same_day_counts_as_upcoming() {
        let catalog = sample_catalog();
        let outcome = EventMatcher::new(&catalog).find_next(&location(&["spain"]), date(2026, 8, 12), EclipseKind::Solar);
        let found = outcome.found().unwrap();
        assert_eq!(found.event.date, date(2026, 8, 12));
        assert_eq!(found.days_until, 0);
    }

    #[test]
    fn test_earliest_event_wins_regardless_of_catalog_order() {
        let catalog = sample_catalog();
        let outcome = EventMatcher::new(&catalog).find_next(&location(&["spain"]), date(2025, 1, 1), EclipseKind::Solar);
        assert_eq!(outcome.found().unwrap().event.date, date(2026, 8, 12));
    }

    #[test]
    fn test_no_earlier_matching_event_exists() {
        let catalog = sample_catalog();
        let reference = date(2024, 1, 1);
        let loc = location(&["europe"]);
        let found = EventMatcher::new(&catalog)
            .find_next(&loc, reference, EclipseKind::Solar)
            .found()
            .cloned()
            .unwrap();
        for event in catalog.events().filter(|e| e.kind == EclipseKind::Solar) {
            let tagged = event.visibility_regions.iter().any(|r| r == "Europe");
            if tagged && event.date >= reference {
                assert!(event.date >= found.event.date);
            }
        }
    }

    #[test]
    fn test_most_specific_token_reported() {
        let catalog = sample_catalog();
        let loc = location(&["reykjavik, iceland", "reykjavik", "iceland", "europe"]);
        let found = EventMatcher::new(&catalog)
            .find_next(&loc, date(2026, 1, 1), EclipseKind::Solar)
            .found()
            .cloned()
            .unwrap();
        assert_eq!(found.matched_token, "iceland");
        assert_eq!(found.basis, MatchBasis::RegionTag);
    }

    #[test]
    fn test_tag_beats_notes_within_event() {
        let catalog = EclipseCatalog::new(vec![solar(2026, 8, 12)
            .with_regions(["Europe"])
            .with_notes("Visible from Iceland")]);
        let loc = location(&["iceland", "europe"]);
        let found = EventMatcher::new(&catalog)
            .find_next(&loc, date(2026, 1, 1), EclipseKind::Solar)
            .found()
            .cloned()
            .unwrap();
        assert_eq!(found.matched_token, "europe");
        assert_eq!(found.basis, MatchBasis::RegionTag);
    }

    #[test]
    fn test_notes_match_on_earlier_event() {
        let catalog = EclipseCatalog::new(vec![
            solar(2027, 1, 1).with_regions(["Iceland"]),
            solar(2026, 8, 12).with_regions(["Europe"]).with_notes("Visible from Iceland at sunset"),
        ]);
        let found = EventMatcher::new(&catalog)
            .find_next(&location(&["iceland"]), date(2026, 1, 1), EclipseKind::Solar)
            .found()
            .cloned()
            .unwrap();
        assert_eq!(found.event.date, date(2026, 8, 12));
        assert_eq!(found.basis, MatchBasis::Notes);
    }

    #[test]
    fn test_notes_respect_word_boundaries() {
        let catalog = EclipseCatalog::new(vec![solar(2026, 8, 12).with_notes("Long duration over the ocean")]);
        let outcome = EventMatcher::new(&catalog).find_next(&location(&["on"]), date(2026, 1, 1), EclipseKind::Solar);
        assert!(!outcome.is_found());
    }

    #[test]
    fn test_kind_filter() {
        let catalog = sample_catalog();
        let found = EventMatcher::new(&catalog)
            .find_next(&location(&["north america"]), date(2026, 1, 1), EclipseKind::Lunar)
            .found()
            .cloned()
            .unwrap();
        assert_eq!(found.event.kind, EclipseKind::Lunar);
        assert_eq!(found.event.date, date(2026, 3, 3));
    }

    #[test]
    fn test_same_day_ties_keep_catalog_order() {
        let catalog = EclipseCatalog::new(vec![
            solar(2026, 8, 12).with_regions(["Europe"]).with_peak_description("first"),
            solar(2026, 8, 12).with_regions(["Europe"]).with_peak_description("second"),
        ]);
        let found = EventMatcher::new(&catalog)
            .find_next(&location(&["europe"]), date(2026, 1, 1), EclipseKind::Solar)
            .found()
            .cloned()
            .unwrap();
        assert_eq!(found.event.peak_description, "first");
    }

    #[test]
    fn test_deterministic() {
        let catalog = sample_catalog();
        let matcher = EventMatcher::new(&catalog);
        let loc = location(&["madrid, spain", "madrid", "spain", "europe"]);
        let a = matcher.find_next(&loc, date(2026, 1, 1), EclipseKind::Solar);
        let b = matcher.find_next(&loc, date(2026, 1, 1), EclipseKind::Solar);
        assert_eq!(a, b);
    }

    #[test]
    fn test_antarctica_near_catalog_end() {
        let catalog = sample_catalog();
        let loc = LocationNormalizer::default().resolve("Antarctica").unwrap();
        let outcome = EventMatcher::new(&catalog).find_next(&loc, date(2028, 1, 1), EclipseKind::Solar);
        let MatchOutcome::NoMatch(no_match) = outcome else {
            panic!("expected no match");
        };
        assert!(no_match
            .suggestions
            .iter()
            .any(|s| s.reason == SuggestionReason::MacroRegion));
        assert_eq!(no_match.nearest.unwrap().date, date(2028, 7, 22));
    }

    #[test]
    fn test_no_match_suggests_broader_tokens() {
        let catalog = EclipseCatalog::default();
        let loc = location(&["springfield, ohio", "springfield", "ohio", "united states", "north america"]);
        let outcome = EventMatcher::new(&catalog).find_next(&loc, date(2026, 1, 1), EclipseKind::Solar);
        let MatchOutcome::NoMatch(no_match) = outcome else {
            panic!("expected no match");
        };
        let broader: Vec<&str> = no_match
            .suggestions
            .iter()
            .filter(|s| s.reason == SuggestionReason::Broader)
            .map(|s| s.token.as_str())
            .collect();
        assert_eq!(broader, vec!["springfield", "ohio", "united states", "north america"]);
        assert!(!no_match
            .suggestions
            .iter()
            .any(|s| s.reason == SuggestionReason::MacroRegion && s.token == "north america"));
        assert!(no_match.nearest.is_none());
    }

    #[test]
    fn test_broader_suggestions_skip_aliases() {
        let catalog = EclipseCatalog::default();
        let loc = LocationNormalizer::default().resolve("Toronto, ON, Canada").unwrap();
        let MatchOutcome::NoMatch(no_match) = EventMatcher::new(&catalog).find_next(&loc, date(2026, 1, 1), EclipseKind::Solar)
        else {
            panic!("expected no match");
        };
        let broader: Vec<&str> = no_match
            .suggestions
            .iter()
            .filter(|s| s.reason == SuggestionReason::Broader)
            .map(|s| s.token.as_str())
            .collect();
        assert_eq!(broader, vec!["toronto", "canada", "ontario", "north america"]);
    }

    #[test]
    fn test_city_without_commas_matches_notes() {
        let catalog = EclipseCatalog::new(vec![solar(2026, 8, 12).with_notes("Totality visible from Toronto at sunrise")]);
        let normalizer = LocationNormalizer::default();
        let matcher = EventMatcher::new(&catalog);
        for input in ["Toronto ON Canada", "Toronto, ON, Canada"] {
            let loc = normalizer.resolve(input).unwrap();
            let found = matcher
                .find_next(&loc, date(2026, 1, 1), EclipseKind::Solar)
                .found()
                .cloned()
                .unwrap();
            assert_eq!(found.matched_token, "toronto");
            assert_eq!(found.basis, MatchBasis::Notes);
        }
    }

    #[test]
    fn test_generated_catalog_text_never_matches() {
        let csv = "Date,Type,Saros,Magnitude,Latitude,Longitude,Duration,Regions,Notes\n\
                   2026-08-12,T,126,1.0386,65.2,-25.2,02m18s,Iceland,\n";
        let catalog = crate::catalog::read_catalog(csv.as_bytes(), EclipseKind::Solar).unwrap();
        let normalizer = LocationNormalizer::default();
        let matcher = EventMatcher::new(&catalog);
        for input in ["126", "25", "N", "1.0386", "Saros"] {
            let loc = normalizer.resolve(input).unwrap();
            let outcome = matcher.find_next(&loc, date(2026, 1, 1), EclipseKind::Solar);
            assert!(!outcome.is_found(), "{} should not match", input);
        }
        let loc = normalizer.resolve("Reykjavik, Iceland").unwrap();
        assert!(matcher.find_next(&loc, date(2026, 1, 1), EclipseKind::Solar).is_found());
    }

    #[test]
    fn test_empty_catalog_is_no_match() {
        let catalog = EclipseCatalog::default();
        let outcome = EventMatcher::new(&catalog).find_next(&location(&["europe"]), date(2026, 1, 1), EclipseKind::Lunar);
        assert!(matches!(outcome, MatchOutcome::NoMatch(_)));
    }

    #[test]
    fn test_find_both() {
        let catalog = sample_catalog();
        let (solar_outcome, lunar_outcome) =
            EventMatcher::new(&catalog).find_both(&location(&["europe"]), date(2026, 1, 1));
        assert_eq!(solar_outcome.found().unwrap().event.date, date(2027, 8, 2));
        assert_eq!(lunar_outcome.found().unwrap().event.date, date(2029, 12, 20));
    }

    #[test]
    fn test_outcome_serializes_with_status() {
        let catalog = EclipseCatalog::new(vec![solar(2026, 8, 12).with_regions(["Europe"])]);
        let outcome = EventMatcher::new(&catalog).find_next(&location(&["europe"]), date(2026, 8, 1), EclipseKind::Solar);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "found");
        assert_eq!(json["basis"], "region_tag");
        assert_eq!(json["days_until"], 11);
    }

    #[test]
    fn test_explanation() {
        let result = MatchResult {
            event: solar(2026, 8, 12),
            matched_token: "iceland".into(),
            basis: MatchBasis::Notes,
            days_until: 1,
        };
        assert_eq!(result.explanation(), "Matched visibility notes on 'iceland'.");
    }
}
