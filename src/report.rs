//! Plain-text rendering of a [`Report`] for the terminal.

use crate::catalog::{EclipseEvent, EclipseKind};
use crate::finder::Report;
use crate::location::text::title_case;
use crate::matcher::{MatchOutcome, MatchResult, NoMatch, SuggestionReason};

const TIP: &str = "Tip: try broadening the location, for example only the state, province or country.";

/// "223 days", "1 day", "today".
pub fn countdown(days: i64) -> String {
    match days {
        0 => "today".into(),
        1 => "1 day".into(),
        n => format!("{} days", n),
    }
}

pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("Searching eclipse catalog for: {}\n", report.location.formatted()));
    if let Some(region) = &report.location.inferred_region {
        out.push_str(&format!("Inferred region: {}\n", region));
    }
    out.push_str(&format!("Reference date: {}\n", report.reference_date));

    for kind in EclipseKind::ALL {
        if let Some(outcome) = report.outcome(kind) {
            out.push('\n');
            match outcome {
                MatchOutcome::Found(found) => render_found(&mut out, kind, found),
                MatchOutcome::NoMatch(miss) => render_miss(&mut out, kind, miss),
            }
        }
    }

    if report.has_misses() {
        out.push_str(&format!("\n{}\n", TIP));
    }
    out
}

fn render_found(out: &mut String, kind: EclipseKind, found: &MatchResult) {
    let event = &found.event;
    out.push_str(&format!("Next {} Eclipse\n", kind));
    out.push_str(&format!("  {}\n", event.title));
    out.push_str(&format!("  Date:       {}\n", event.date.format("%B %d, %Y")));
    out.push_str(&format!("  Days until: {}\n", countdown(found.days_until)));
    if !event.peak_description.is_empty() {
        out.push_str(&format!("  Peak:       {}\n", event.peak_description));
    }
    if let Some(visibility) = visibility_line(event) {
        out.push_str(&format!("  Visibility: {}\n", visibility));
    }
    out.push_str(&format!("  {}\n", found.explanation()));
}

fn render_miss(out: &mut String, kind: EclipseKind, miss: &NoMatch) {
    let name = kind.as_str();
    out.push_str(&format!("Next {} Eclipse\n", kind));
    out.push_str(&format!("  No upcoming {} eclipses in the current catalog match this location.\n", name));
    let broader = labels(miss, SuggestionReason::Broader);
    if !broader.is_empty() {
        out.push_str(&format!("  Broader terms: {}\n", broader.join(", ")));
    }
    let regions = labels(miss, SuggestionReason::MacroRegion);
    if !regions.is_empty() {
        out.push_str(&format!("  Or a region:   {}\n", regions.join(", ")));
    }
    if let Some(nearest) = &miss.nearest {
        out.push_str(&format!("  Nearest {} eclipse anywhere: {}\n", name, nearest.summary()));
    }
}

fn labels(miss: &NoMatch, reason: SuggestionReason) -> Vec<String> {
    miss.suggestions
        .iter()
        .filter(|s| s.reason == reason)
        .map(|s| title_case(&s.token))
        .collect()
}

/// Notes when present, otherwise the region tags.
fn visibility_line(event: &EclipseEvent) -> Option<String> {
    if !event.visibility_notes.is_empty() {
        Some(event.visibility_notes.clone())
    } else if !event.visibility_regions.is_empty() {
        Some(format!("Regions: {}", event.visibility_regions.join(", ")))
    } else {
        None
    }
}
