//! Best-effort splitting of a compound bug report into independent bug units.
//!
//! This is a string heuristic, not a language parser. It will sometimes split
//! a single bug in two ("export and import both fail") or keep two bugs
//! together; callers accept that.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Fragments this short or shorter are dropped.
const MIN_UNIT_CHARS: usize = 10;

const NUMBERED_MARKERS: [&str; 5] = ["1.", "2.", "3.", "4.", "5."];
const BULLET_MARKERS: [&str; 3] = ["- ", "* ", "• "];

/// Checked in this order; the first one present is the only one split on.
const CONJUNCTIONS: [&str; 4] = [" and ", " also ", " additionally ", " furthermore "];

/// Optional newline, then a numeral with a dot or a bullet followed by whitespace.
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n?\s*(?:\d+\.|[-*•]\s+)").expect("list marker pattern is valid")
});

/// Split a bug report into ordered bug units.
///
/// Never returns an empty list: if every candidate is filtered out, the
/// trimmed report itself is the single unit. Original casing is preserved.
pub fn split(report: &str) -> Vec<String> {
    let trimmed = report.trim();

    let candidates: Vec<String> = if has_list_markers(trimmed) {
        LIST_MARKER
            .split(trimmed)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    } else if let Some(parts) = split_on_conjunction(trimmed) {
        parts
    } else {
        vec![trimmed.to_string()]
    };

    let units: Vec<String> = candidates
        .into_iter()
        .filter(|unit| unit.trim().chars().count() > MIN_UNIT_CHARS)
        .collect();

    if units.is_empty() {
        vec![trimmed.to_string()]
    } else {
        units
    }
}

fn has_list_markers(text: &str) -> bool {
    NUMBERED_MARKERS
        .iter()
        .chain(BULLET_MARKERS.iter())
        .any(|marker| text.contains(marker))
}

fn split_on_conjunction(text: &str) -> Option<Vec<String>> {
    let lowered = text.to_lowercase();
    let separator = CONJUNCTIONS.iter().find(|sep| lowered.contains(*sep))?;

    // Case-insensitive match against the original text keeps the unit casing.
    let pattern = RegexBuilder::new(&regex::escape(separator))
        .case_insensitive(true)
        .build()
        .ok()?;

    Some(
        pattern
            .split(text)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
    )
}
