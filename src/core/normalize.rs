// RunShape - core/normalize.rs
//
// Field normalisation: raw cell markup to clean strings and locale-tolerant
// numbers. Every function here is pure and total. Anything that cannot be
// interpreted confidently becomes `None`; nothing panics or guesses.

use crate::util::constants;
use regex::Regex;
use std::sync::OnceLock;

/// Non-breaking-space spellings replaced by an ordinary space.
const NBSP_FORMS: &[&str] = &["&nbsp;", "&#160;", "&#xa0;", "&#xA0;", "\u{a0}"];

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("normalize: invalid tag regex"))
}

/// Remove every `<...>` tag, keeping the text between them.
///
/// A lone `<` with no closing `>` is kept as text.
pub fn strip_tags(s: &str) -> String {
    tag_re().replace_all(s, "").into_owned()
}

/// Clean a cell's inner markup into display text: strip tags, turn
/// non-breaking spaces into spaces, trim.
pub fn clean_text(s: &str) -> String {
    let mut out = strip_tags(s);
    for form in NBSP_FORMS {
        if out.contains(form) {
            out = out.replace(form, " ");
        }
    }
    out.trim().to_string()
}

/// Clean text that may legitimately be absent; empty becomes `None`.
pub fn clean_opt(s: &str) -> Option<String> {
    let t = clean_text(s);
    if t.is_empty() { None } else { Some(t) }
}

/// Collapse the placeholder dash to `None`; any other text is kept.
pub fn non_placeholder(cleaned: String) -> Option<String> {
    if cleaned == constants::PLACEHOLDER_DASH {
        None
    } else {
        Some(cleaned)
    }
}

/// Parse a distance label such as `"1,86 mi"` into miles.
///
/// Keeps only digits, commas and periods, then reads the comma as the
/// decimal separator. A period is left as-is, so `"2.1 mi"` also parses
/// to 2.1, while `"1.234,5"` (period thousands separator) has two
/// separators and yields `None`. The result is never negative and never
/// non-finite because signs and letters are filtered out first.
pub fn parse_distance(label: &str) -> Option<f64> {
    let kept: String = label
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if kept.is_empty() {
        return None;
    }
    kept.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a percentage cell such as `"85 %"` into an integer.
///
/// Keeps only digits and periods; a fractional value like `"85.5"` is not
/// an integer and yields `None`.
pub fn parse_percent(cell: &str) -> Option<u32> {
    let kept: String = cell
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if kept.is_empty() {
        return None;
    }
    kept.parse::<u32>().ok()
}
