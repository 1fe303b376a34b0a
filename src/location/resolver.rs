//! Location normalizer: free text or postal code to ordered match tokens.
//!
//! Flow:  postal detection (ZIP → Canadian) → comma segments → gazetteer
//! phrases → token assembly (most specific first).
//!
//! Only empty input fails. Anything else degrades to a best-effort token set
//! and is left for the matcher's relaxation path.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use tracing::debug;

use super::tables::{AdminRegion, Country, RegionTables};
use super::text::{fold, fold_list};
use super::types::{ResolutionFailure, ResolvedLocation};

static ZIP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}(?:-[0-9]{4})?$").expect("ZIP pattern compiles"));

static CANADA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][0-9][A-Za-z](?: ?[0-9][A-Za-z][0-9])?$").expect("postal pattern compiles")
});

/// Abbreviations this short only count at the end of a segment
/// ("Austin TX") or right before a closing country ("Toronto ON Canada"),
/// never mid-phrase ("Rio de Janeiro").
const ABBREVIATION_MAX_LEN: usize = 3;

/// Longest gazetteer phrase tried ("newfoundland and labrador" is four words).
const MAX_PHRASE_WORDS: usize = 4;

/// Turns raw location strings into [`ResolvedLocation`]s.
#[derive(Debug, Clone, Default)]
pub struct LocationNormalizer {
    tables: RegionTables,
}

/// A gazetteer hit inside one comma segment.
enum Place<'a> {
    Country(&'a Country),
    Admin(Vec<&'a AdminRegion>),
    Macro(&'a str),
}

struct Segment<'a> {
    original: &'a str,
    folded: String,
    hits: Vec<(Place<'a>, Range<usize>)>,
}

struct PostalHit<'a> {
    code: String,
    region: Option<&'a AdminRegion>,
}

/// Ordered token list; repeats keep their first position.
#[derive(Default)]
struct TokenList(Vec<String>);

impl TokenList {
    fn push(&mut self, token: impl Into<String>) {
        let token = token.into();
        if !token.is_empty() && !self.0.contains(&token) {
            self.0.push(token);
        }
    }
}

impl LocationNormalizer {
    pub fn new(tables: RegionTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &RegionTables {
        &self.tables
    }

    /// Resolve a raw location string or postal code.
    pub fn resolve(&self, raw: &str) -> Result<ResolvedLocation, ResolutionFailure> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ResolutionFailure::EmptyInput);
        }

        let postal = self.detect_postal(trimmed);

        let mut segments: Vec<Segment> = trimmed
            .split(',')
            .map(|s| Segment { original: s.trim(), folded: fold(s), hits: Vec::new() })
            .filter(|s| !s.folded.is_empty())
            .collect();
        for segment in &mut segments {
            segment.hits = self.places_in(&segment.folded);
        }

        // Countries named explicitly, in input order.
        let mut countries: Vec<&Country> = Vec::new();
        for segment in &segments {
            for (place, _) in &segment.hits {
                if let Place::Country(c) = place {
                    if !countries.iter().any(|known| known.name == c.name) {
                        countries.push(*c);
                    }
                }
            }
        }

        // Administrative regions, disambiguated against the countries above.
        // A name whose every reading contradicts an explicit country is left
        // as plain text ("Victoria, BC, Canada").
        let mut admins: Vec<&AdminRegion> = Vec::new();
        let mut covered: Vec<Vec<Range<usize>>> = Vec::with_capacity(segments.len());
        let mut macros: Vec<&str> = Vec::new();
        let mut aliases: Vec<String> = Vec::new();
        for segment in &segments {
            let word_count = segment.folded.split_whitespace().count();
            let mut spans = Vec::new();
            for (place, span) in &segment.hits {
                let canonical = match place {
                    Place::Country(c) => Some(c.name.as_str()),
                    Place::Macro(name) => {
                        if !macros.contains(name) {
                            macros.push(*name);
                        }
                        Some(*name)
                    }
                    Place::Admin(candidates) => pick_admin(candidates, &countries).map(|region| {
                        if !admins.iter().any(|a| a.name == region.name) {
                            admins.push(region);
                        }
                        region.name.as_str()
                    }),
                };
                let Some(canonical) = canonical else { continue };
                spans.push(span.clone());
                if *span == (0..word_count) && fold(canonical) != segment.folded {
                    aliases.push(segment.folded.clone());
                }
            }
            covered.push(spans);
        }

        let postal_region = postal.as_ref().and_then(|p| p.region);

        // Countries implied by regions.
        let mut all_countries: Vec<&Country> = countries.clone();
        for region in admins.iter().chain(postal_region.iter()) {
            if let Some(country) = self.tables.country(&fold(&region.country)) {
                if !all_countries.iter().any(|c| c.name == country.name) {
                    all_countries.push(country);
                }
            }
        }

        // ── Token assembly ──────────────────────────────────────
        let mut tokens = TokenList::default();
        tokens.push(fold_list(trimmed));
        for (segment, spans) in segments.iter().zip(&covered) {
            tokens.push(segment.folded.clone());
            if let Some(rest) = uncovered_folded(segment, spans) {
                tokens.push(rest);
            }
        }
        for region in admins.iter().chain(postal_region.iter()) {
            tokens.push(fold(&region.name));
        }
        for country in &all_countries {
            tokens.push(fold(&country.name));
        }
        for country in &all_countries {
            for macro_region in &country.macro_regions {
                tokens.push(fold(macro_region));
            }
        }
        for name in &macros {
            tokens.push(fold(name));
        }

        let city = if postal.is_some() {
            None
        } else {
            segments
                .iter()
                .zip(&covered)
                .find_map(|(segment, spans)| uncovered_words(segment, spans))
        };

        let admin_region = postal_region.or_else(|| admins.first().copied()).map(|r| r.name.clone());
        let inferred_region = admin_region.clone().or_else(|| {
            all_countries
                .first()
                .and_then(|c| c.macro_regions.first().cloned())
                .or_else(|| macros.first().map(|m| m.to_string()))
        });

        let resolved = ResolvedLocation {
            raw_input: raw.to_string(),
            tokens: tokens.0,
            inferred_region,
            is_postal_code: postal.is_some(),
            city,
            admin_region,
            country: all_countries.first().map(|c| c.name.clone()),
            postal_code: postal.map(|p| p.code),
            aliases,
        };

        debug!(
            raw = %resolved.raw_input,
            tokens = ?resolved.tokens,
            inferred = ?resolved.inferred_region,
            postal = resolved.is_postal_code,
            "resolved location"
        );
        Ok(resolved)
    }

    /// Recognize a U.S. ZIP or a Canadian postal code.
    ///
    /// A Canadian-shaped code whose first letter is not assigned to a
    /// province is not a postal code.
    fn detect_postal(&self, input: &str) -> Option<PostalHit<'_>> {
        if ZIP_PATTERN.is_match(input) {
            let prefix: u16 = input[..3].parse().ok()?;
            return Some(PostalHit {
                code: input.to_string(),
                region: self.tables.zip_region(prefix),
            });
        }

        if CANADA_PATTERN.is_match(input) {
            let first = input.chars().next()?;
            let province = self.tables.canada_province(first)?;
            let compact: String = input
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| c.to_ascii_uppercase())
                .collect();
            let code = if compact.len() == 6 {
                format!("{} {}", &compact[..3], &compact[3..])
            } else {
                compact
            };
            return Some(PostalHit { code, region: Some(province) });
        }

        None
    }

    /// Longest-first gazetteer scan over the words of a folded segment.
    fn places_in(&self, folded: &str) -> Vec<(Place<'_>, Range<usize>)> {
        let words: Vec<&str> = folded.split_whitespace().collect();
        let mut hits = Vec::new();
        let mut i = 0;

        while i < words.len() {
            let longest = MAX_PHRASE_WORDS.min(words.len() - i);
            let mut found = None;
            for len in (1..=longest).rev() {
                let end = i + len;
                let phrase = words[i..end].join(" ");
                if phrase.len() <= ABBREVIATION_MAX_LEN && end != words.len() && !self.is_country(&words[end..]) {
                    continue;
                }
                if let Some(place) = self.lookup(&phrase) {
                    found = Some((place, i..end));
                    break;
                }
            }
            match found {
                Some((place, span)) => {
                    i = span.end;
                    hits.push((place, span));
                }
                None => i += 1,
            }
        }

        hits
    }

    fn is_country(&self, words: &[&str]) -> bool {
        self.tables.country(&words.join(" ")).is_some()
    }

    fn lookup(&self, phrase: &str) -> Option<Place<'_>> {
        if let Some(country) = self.tables.country(phrase) {
            return Some(Place::Country(country));
        }
        let admins = self.tables.admin_regions(phrase);
        if !admins.is_empty() {
            return Some(Place::Admin(admins));
        }
        self.tables.macro_region(phrase).map(Place::Macro)
    }
}

fn pick_admin<'a>(candidates: &[&'a AdminRegion], countries: &[&Country]) -> Option<&'a AdminRegion> {
    if countries.is_empty() {
        return candidates.first().copied();
    }
    candidates
        .iter()
        .copied()
        .find(|region| countries.iter().any(|c| fold(&c.name) == fold(&region.country)))
}

/// Folded words of a segment that no recognized place covers, when that
/// is only part of the segment.
fn uncovered_folded(segment: &Segment, spans: &[Range<usize>]) -> Option<String> {
    if spans.is_empty() {
        return None;
    }
    let words: Vec<&str> = segment
        .folded
        .split_whitespace()
        .enumerate()
        .filter(|(i, _)| !spans.iter().any(|s| s.contains(i)))
        .map(|(_, w)| w)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Words of a segment that no recognized place covers, in original case.
fn uncovered_words(segment: &Segment, spans: &[Range<usize>]) -> Option<String> {
    let original: Vec<&str> = segment.original.split_whitespace().collect();
    let folded_len = segment.folded.split_whitespace().count();
    if original.len() != folded_len {
        return if spans.is_empty() { Some(segment.original.to_string()) } else { None };
    }
    let words: Vec<&str> = original
        .iter()
        .enumerate()
        .filter(|(i, _)| !spans.iter().any(|s| s.contains(i)))
        .map(|(_, w)| *w)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}
