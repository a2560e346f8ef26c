// RunShape - core/prognosis.rs
//
// Tiered extraction of predicted race times from the prognosis panel.
//
// Tiers are tried in order, from most to least structural precision. The
// first tier that yields any entry wins and later tiers never run, even if
// the winning tier's output looks incomplete.

use crate::core::locate::{blocks, Locator};
use crate::core::markers::{class_tag_pattern, compile, Markers};
use crate::core::model::{ParseResult, PrognosisEntry};
use crate::core::normalize::{clean_opt, clean_text, parse_distance};
use crate::core::sequence::sequence;
use crate::core::staleness::login_detected;
use crate::util::error::MarkerError;
use crate::util::logging::preview;
use regex::{Captures, Regex};
use std::sync::OnceLock;

// Shared pattern pieces. Whitespace may be spelled as an entity.
const WS: &str = r"(?:\s|&nbsp;|&#160;|\x{a0})*";
const GAP: &str = r"(?:\s|&nbsp;|&#160;|\x{a0}|<[^>]*>)*";
const EM_OPEN: &str = r"<(?:strong|b)\b[^>]*>";
const EM_CLOSE: &str = r"</(?:strong|b)\s*>";
const TIME: &str = r"\d{1,2}(?::\d{2}){1,2}";

/// One extraction strategy.
pub trait Tier: Send + Sync {
    /// Short name used in debug logging.
    fn name(&self) -> &'static str;

    /// Extract zero or more entries from a located fragment.
    fn attempt(&self, fragment: &str) -> Vec<PrognosisEntry>;
}

// =============================================================================
// Tier 1: strict
// =============================================================================

/// Paragraphs shaped as a right-aligned span holding an emphasised time and
/// a parenthetical pace, followed by an emphasised distance.
#[derive(Debug, Clone)]
pub struct StrictTier {
    pattern: Regex,
}

impl StrictTier {
    pub fn new(markers: &Markers) -> Result<Self, MarkerError> {
        let unit = regex::escape(&markers.distance_unit);
        let pattern = format!(
            r"(?is)<span{right}{GAP}{EM_OPEN}{WS}(?P<time>{TIME}){WS}{EM_CLOSE}{GAP}\({WS}(?P<pace>[^()<>]*?/{WS}{unit}){WS}\){GAP}</span\s*>.*?{EM_OPEN}{WS}(?P<dist>[^<>]*?{unit}){WS}{EM_CLOSE}",
            right = class_tag_pattern(&markers.right_class),
        );
        Ok(Self {
            pattern: compile("right_class", &pattern)?,
        })
    }
}

impl Tier for StrictTier {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn attempt(&self, fragment: &str) -> Vec<PrognosisEntry> {
        paragraphs(fragment)
            .into_iter()
            .flat_map(|p| self.pattern.captures_iter(p).filter_map(|c| entry_from(&c)))
            .collect()
    }
}

// =============================================================================
// Tier 2: relaxed
// =============================================================================

/// Paragraphs holding a time directly followed by a parenthetical pace, then
/// an emphasised distance, with no wrapper requirement.
#[derive(Debug, Clone)]
pub struct RelaxedTier {
    pattern: Regex,
}

impl RelaxedTier {
    pub fn new(markers: &Markers) -> Result<Self, MarkerError> {
        let unit = regex::escape(&markers.distance_unit);
        let pattern = format!(
            r"(?is)(?P<time>\b{TIME}){GAP}\({WS}(?P<pace>[^()<>]*?/{WS}{unit}){WS}\).*?{EM_OPEN}{WS}(?P<dist>[^<>]*?{unit}){WS}{EM_CLOSE}"
        );
        Ok(Self {
            pattern: compile("distance_unit", &pattern)?,
        })
    }
}

impl Tier for RelaxedTier {
    fn name(&self) -> &'static str {
        "relaxed"
    }

    fn attempt(&self, fragment: &str) -> Vec<PrognosisEntry> {
        paragraphs(fragment)
            .into_iter()
            .flat_map(|p| self.pattern.captures_iter(p).filter_map(|c| entry_from(&c)))
            .collect()
    }
}

// =============================================================================
// Tier 3: minimal
// =============================================================================

/// Unscoped scan for a distance, then a time, then a parenthetical pace,
/// with any markup in between.
#[derive(Debug, Clone)]
pub struct MinimalTier {
    pattern: Regex,
}

impl MinimalTier {
    pub fn new(markers: &Markers) -> Result<Self, MarkerError> {
        let unit = regex::escape(&markers.distance_unit);
        let pattern = format!(
            r"(?is)(?P<dist>\b\d+(?:[.,]\d+)?{WS}{unit})(?:[^a-z]|$).*?(?P<time>\b\d{{1,2}}:\d{{2}}(?::\d{{2}})?)\b.*?\({WS}(?P<pace>[^()<>]*?/{WS}{unit}){WS}\)"
        );
        Ok(Self {
            pattern: compile("distance_unit", &pattern)?,
        })
    }
}

impl Tier for MinimalTier {
    fn name(&self) -> &'static str {
        "minimal"
    }

    fn attempt(&self, fragment: &str) -> Vec<PrognosisEntry> {
        self.pattern
            .captures_iter(fragment)
            .filter_map(|c| entry_from(&c))
            .collect()
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Build a normalised entry from a match with `dist`, `time`, `pace` groups.
fn entry_from(caps: &Captures<'_>) -> Option<PrognosisEntry> {
    let dist = caps.name("dist")?.as_str();
    let distance_label = clean_text(dist);
    if distance_label.is_empty() {
        return None;
    }
    Some(PrognosisEntry {
        distance_mi: parse_distance(&distance_label),
        distance_label,
        time: caps.name("time").and_then(|m| clean_opt(m.as_str())),
        pace: caps.name("pace").and_then(|m| clean_opt(m.as_str())),
    })
}

fn p_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<p\b[^>]*>").expect("prognosis: invalid <p> regex"))
}

fn p_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</p\s*>").expect("prognosis: invalid </p> regex"))
}

/// Inner markup of each paragraph; unclosed paragraphs end at the next one.
fn paragraphs(html: &str) -> Vec<&str> {
    blocks(html, p_open_re(), p_close_re())
        .into_iter()
        .map(|b| b.inner)
        .collect()
}

// =============================================================================
// Parser
// =============================================================================

/// Locates the prognosis panel and runs the tier sequence over it.
pub struct PrognosisParser {
    locator: Locator,
    tiers: Vec<Box<dyn Tier>>,
}

impl PrognosisParser {
    /// Parser with the three built-in tiers in strict, relaxed, minimal order.
    pub fn new(markers: &Markers) -> Result<Self, MarkerError> {
        let tiers: Vec<Box<dyn Tier>> = vec![
            Box::new(StrictTier::new(markers)?),
            Box::new(RelaxedTier::new(markers)?),
            Box::new(MinimalTier::new(markers)?),
        ];
        Self::with_tiers(markers, tiers)
    }

    /// Parser with a caller-supplied tier sequence.
    pub fn with_tiers(markers: &Markers, tiers: Vec<Box<dyn Tier>>) -> Result<Self, MarkerError> {
        markers.validate()?;
        Ok(Self {
            locator: Locator::new("panel_class", &markers.panel_class)?,
            tiers,
        })
    }

    /// Names of the configured tiers, in attempt order.
    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    /// Extract and order prognosis entries. Never fails: markup that
    /// matches no tier yields an empty, not-found result.
    pub fn parse(&self, html: &str) -> ParseResult<PrognosisEntry> {
        if html.trim().is_empty() {
            return ParseResult::empty();
        }

        let login = login_detected(html);
        let fragment = self.locator.locate(html);
        tracing::debug!(
            located = fragment.located,
            bytes = fragment.html.len(),
            head = preview(fragment.html),
            "Prognosis fragment"
        );

        let mut entries = Vec::new();
        for tier in &self.tiers {
            let found = tier.attempt(fragment.html);
            if found.is_empty() {
                tracing::trace!(tier = tier.name(), "Tier produced no entries");
                continue;
            }
            tracing::debug!(tier = tier.name(), entries = found.len(), "Tier matched");
            entries = found;
            break;
        }

        if entries.is_empty() {
            tracing::debug!(login_detected = login, "No prognosis entries found");
        }

        sequence(&mut entries);
        ParseResult::new(login, entries)
    }
}

/// Parse a prognosis document with the built-in markers.
pub fn parse_prognosis(html: &str) -> ParseResult<PrognosisEntry> {
    static PARSER: OnceLock<PrognosisParser> = OnceLock::new();
    PARSER
        .get_or_init(|| {
            PrognosisParser::new(&Markers::default()).expect("built-in markers are valid")
        })
        .parse(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const STRICT_P: &str = r#"<p><span class="right"><strong>13:13</strong><small>(7:05/mi)</small></span><strong>1,86 mi</strong></p>"#;

    fn markers() -> Markers {
        Markers::default()
    }

    fn expected_5k() -> PrognosisEntry {
        PrognosisEntry {
            distance_label: "1,86 mi".to_string(),
            distance_mi: Some(1.86),
            time: Some("13:13".to_string()),
            pace: Some("7:05/mi".to_string()),
        }
    }

    /// Records how often it runs and returns fixed entries.
    struct CountingTier {
        calls: Arc<AtomicUsize>,
        out: Vec<PrognosisEntry>,
    }

    impl Tier for CountingTier {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn attempt(&self, _fragment: &str) -> Vec<PrognosisEntry> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.out.clone()
        }
    }

    #[test]
    fn test_strict_scenario() {
        let result = parse_prognosis(STRICT_P);
        assert!(result.meta.found);
        assert!(!result.meta.login_detected);
        assert_eq!(result.entries, vec![expected_5k()]);
    }

    #[test]
    fn test_strict_tier_directly() {
        let tier = StrictTier::new(&markers()).unwrap();
        assert_eq!(tier.attempt(STRICT_P), vec![expected_5k()]);
    }

    #[test]
    fn test_strict_tolerates_drift() {
        let html = r#"<P class="x">
            <span   data-k="v" class='pull right' >
              <strong class="t"> 3:29:59 </strong>
              <small>( 8:00/mi )</small>
            </span>
            <em>Marathon</em> <strong>26,22&nbsp;mi</strong>
        </P>"#;
        let tier = StrictTier::new(&markers()).unwrap();
        let got = tier.attempt(html);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].distance_label, "26,22 mi");
        assert_eq!(got[0].distance_mi, Some(26.22));
        assert_eq!(got[0].time.as_deref(), Some("3:29:59"));
        assert_eq!(got[0].pace.as_deref(), Some("8:00/mi"));
    }

    #[test]
    fn test_strict_requires_right_span() {
        let html = r#"<p><span class="left"><strong>13:13</strong><small>(7:05/mi)</small></span><strong>1,86 mi</strong></p>"#;
        let tier = StrictTier::new(&markers()).unwrap();
        assert!(tier.attempt(html).is_empty());
    }

    #[test]
    fn test_relaxed_without_span() {
        let html = r#"<p><b>13:13</b> (7:05/mi) &middot; <strong>1,86 mi</strong></p>"#;
        assert!(StrictTier::new(&markers()).unwrap().attempt(html).is_empty());
        let got = RelaxedTier::new(&markers()).unwrap().attempt(html);
        assert_eq!(got, vec![expected_5k()]);
    }

    #[test]
    fn test_minimal_distance_first() {
        let html = "<div>1,86 mi</div><div><i>13:13</i></div><div>(7:05/mi)</div>";
        assert!(RelaxedTier::new(&markers()).unwrap().attempt(html).is_empty());
        let got = MinimalTier::new(&markers()).unwrap().attempt(html);
        assert_eq!(got, vec![expected_5k()]);
    }

    #[test]
    fn test_falls_through_to_minimal() {
        let html = r#"<div class="panel-content"><div>6,21 mi</div><div>44:10</div><div>(7:07/mi)</div></div>"#;
        let result = parse_prognosis(html);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].distance_mi, Some(6.21));
        assert_eq!(result.entries[0].time.as_deref(), Some("44:10"));
    }

    #[test]
    fn test_tier_short_circuit() {
        let first_calls = Arc::new(AtomicUsize::new(0));
        let second_calls = Arc::new(AtomicUsize::new(0));
        let parser = PrognosisParser::with_tiers(
            &markers(),
            vec![
                Box::new(CountingTier {
                    calls: Arc::clone(&first_calls),
                    out: vec![expected_5k()],
                }),
                Box::new(CountingTier {
                    calls: Arc::clone(&second_calls),
                    out: vec![expected_5k(), expected_5k()],
                }),
            ],
        )
        .unwrap();

        let result = parser.parse("<p>anything</p>");
        assert_eq!(result.entries.len(), 1);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0, "later tier must not run");
    }

    #[test]
    fn test_empty_tier_falls_through() {
        let first_calls = Arc::new(AtomicUsize::new(0));
        let second_calls = Arc::new(AtomicUsize::new(0));
        let parser = PrognosisParser::with_tiers(
            &markers(),
            vec![
                Box::new(CountingTier {
                    calls: Arc::clone(&first_calls),
                    out: Vec::new(),
                }),
                Box::new(CountingTier {
                    calls: Arc::clone(&second_calls),
                    out: vec![expected_5k()],
                }),
            ],
        )
        .unwrap();

        assert!(parser.parse("<p>x</p>").meta.found);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_strict_match_stops_relaxed_records() {
        // The second paragraph only fits the relaxed tier; strict wins and
        // its single record is the whole result.
        let html = format!(
            r#"{STRICT_P}<p><b>44:10</b> (7:07/mi) <strong>6,21 mi</strong></p>"#
        );
        let result = parse_prognosis(&html);
        assert_eq!(result.entries, vec![expected_5k()]);
    }

    #[test]
    fn test_login_page_without_matches() {
        let result = parse_prognosis("<html><h1>Login</h1><form></form></html>");
        assert!(result.entries.is_empty());
        assert!(!result.meta.found);
        assert!(result.meta.login_detected);
    }

    #[test]
    fn test_login_flag_independent_of_matches() {
        let html = format!("<a href=\"/login\">Login</a>{STRICT_P}");
        let result = parse_prognosis(&html);
        assert!(result.meta.found);
        assert!(result.meta.login_detected);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        for html in ["", "   \n"] {
            let result = parse_prognosis(html);
            assert!(!result.meta.found);
            assert!(!result.meta.login_detected);
            assert!(result.entries.is_empty());
        }
    }

    #[test]
    fn test_entries_sorted_with_unparsable_last() {
        let html = r#"<div class="panel-content">
            <p><span class="right"><strong>3:29:59</strong> <small>(8:00/mi)</small></span> <strong>26,22 mi</strong></p>
            <p><span class="right"><strong>1:40:00</strong> <small>(7:38/mi)</small></span> <strong>Half mi</strong></p>
            <p><span class="right"><strong>13:13</strong> <small>(7:05/mi)</small></span> <strong>1,86 mi</strong></p>
        </div>"#;
        let result = parse_prognosis(html);
        let labels: Vec<_> = result.entries.iter().map(|e| e.distance_label.as_str()).collect();
        assert_eq!(labels, vec!["1,86 mi", "26,22 mi", "Half mi"]);
        assert_eq!(result.entries[2].distance_mi, None);
    }

    #[test]
    fn test_only_panel_fragment_considered() {
        let html = format!(
            r#"<div class="sidebar">{STRICT_P}</div><div class="panel-content"><p>nothing here</p></div>"#
        );
        let result = parse_prognosis(&html);
        assert!(!result.meta.found, "paragraph outside the panel must be ignored");
    }

    #[test]
    fn test_unclosed_paragraphs_split() {
        let html = r#"<p><span class="right"><strong>13:13</strong><small>(7:05/mi)</small></span><strong>1,86 mi</strong><p><span class="right"><strong>44:10</strong><small>(7:07/mi)</small></span><strong>6,21 mi</strong>"#;
        assert_eq!(paragraphs(html).len(), 2);
        assert_eq!(parse_prognosis(html).entries.len(), 2);
    }

    #[test]
    fn test_custom_unit() {
        let m = Markers {
            distance_unit: "km".to_string(),
            ..Markers::default()
        };
        let parser = PrognosisParser::new(&m).unwrap();
        let html = r#"<p><span class="right"><strong>20:00</strong><small>(4:00/km)</small></span><strong>5,0 km</strong></p>"#;
        let result = parser.parse(html);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].distance_mi, Some(5.0));
        assert_eq!(parser.tier_names(), vec!["strict", "relaxed", "minimal"]);
    }

    #[test]
    fn test_invalid_markers_rejected() {
        let m = Markers {
            panel_class: String::new(),
            ..Markers::default()
        };
        assert!(PrognosisParser::new(&m).is_err());
    }

    #[test]
    fn test_deeply_nested_panel_parses() {
        let depth = 40_000;
        let html = format!(
            r#"<div class="panel-content">{}{}{}</div>"#,
            "<div>".repeat(depth),
            STRICT_P,
            "</div>".repeat(depth)
        );
        let result = parse_prognosis(&html);
        assert_eq!(result.entries, vec![expected_5k()]);
    }
}
