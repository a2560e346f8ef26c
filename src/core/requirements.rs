// RunShape - core/requirements.rs
//
// Row extraction from the marathon-shape requirements table.
//
// The table is located by class, data rows are selected by class, and each
// row's cells are mapped to fields through a fixed column table. Rows that
// are too short are skipped individually; they never fail the whole table.

use crate::core::locate::{blocks, Locator};
use crate::core::markers::{class_tag_pattern, compile, Markers};
use crate::core::model::{ParseResult, RequirementEntry};
use crate::core::normalize::{clean_text, non_placeholder, parse_distance, parse_percent};
use crate::core::sequence::sequence;
use crate::core::staleness::login_detected;
use crate::util::constants;
use crate::util::error::MarkerError;
use crate::util::logging::preview;
use regex::Regex;
use std::sync::OnceLock;

// =============================================================================
// Column layout
// =============================================================================

/// Fields of a requirements row, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Distance,
    RequiredPct,
    Weekly,
    LongRun,
    AchievedPct,
    /// Inspected as raw markup, never emitted as text.
    AchievedIcon,
    PrognosisTime,
    /// The only column allowed to be missing.
    OptimumTime,
}

/// Cell index of each field. Update this table, and nothing else, when the
/// upstream column order changes.
pub const REQUIREMENT_COLUMNS: &[(usize, Column)] = &[
    (0, Column::Distance),
    (1, Column::RequiredPct),
    (2, Column::Weekly),
    (3, Column::LongRun),
    (4, Column::AchievedPct),
    (5, Column::AchievedIcon),
    (6, Column::PrognosisTime),
    (7, Column::OptimumTime),
];

/// Index of `column` in the layout table.
pub fn column_index(column: Column) -> Option<usize> {
    REQUIREMENT_COLUMNS
        .iter()
        .find(|(_, c)| *c == column)
        .map(|(i, _)| *i)
}

// =============================================================================
// Achievement icon
// =============================================================================

/// What the achievement icon says, before it is collapsed to a boolean.
///
/// `Unrecognised` and `Cross` both become `achieved_ok = false`; the
/// distinction is kept here so callers can tell "not achieved" from
/// "no recognisable icon".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementMarker {
    Check,
    Cross,
    Unrecognised,
}

impl AchievementMarker {
    /// Classify a cell by the class tokens in its raw markup. A check icon
    /// takes precedence when both kinds appear.
    pub fn classify(cell_markup: &str) -> Self {
        let mut cross = false;
        for caps in class_value_re().captures_iter(cell_markup) {
            let value = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            for raw in value.split_whitespace() {
                let token = icon_token(raw);
                if in_family(&token, constants::ICON_CHECK_FAMILIES) {
                    return Self::Check;
                }
                if in_family(&token, constants::ICON_CROSS_FAMILIES) {
                    cross = true;
                }
            }
        }
        if cross { Self::Cross } else { Self::Unrecognised }
    }

    pub fn achieved(self) -> bool {
        matches!(self, Self::Check)
    }
}

/// `token` is one of `families` or a `-` variant of one.
fn in_family(token: &str, families: &[&str]) -> bool {
    families.iter().any(|family| {
        token
            .strip_prefix(family)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
    })
}

/// Lowercase a class token and drop a known icon-font prefix.
fn icon_token(raw: &str) -> String {
    let lc = raw.to_ascii_lowercase();
    for prefix in constants::ICON_CLASS_PREFIXES {
        if let Some(rest) = lc.strip_prefix(prefix) {
            return rest.to_string();
        }
    }
    lc
}

fn class_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#)
            .expect("requirements: invalid class regex")
    })
}

// =============================================================================
// Row and cell splitting
// =============================================================================

fn tr_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<tr\b[^>]*>").expect("requirements: invalid <tr> regex"))
}

fn tr_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</tr\s*>").expect("requirements: invalid </tr> regex"))
}

fn cell_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<t[dh]\b[^>]*>").expect("requirements: invalid cell regex"))
}

fn cell_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</t[dh]\s*>").expect("requirements: invalid cell regex"))
}

/// Inner markup of each cell of a row, in document order.
fn cells(row_inner: &str) -> Vec<&str> {
    blocks(row_inner, cell_open_re(), cell_close_re())
        .into_iter()
        .map(|b| b.inner)
        .collect()
}

/// Build an entry from a row's raw cells, or `None` if the row is too short.
pub fn entry_from_cells(cells: &[&str]) -> Option<RequirementEntry> {
    if cells.len() < constants::MIN_REQUIREMENT_CELLS {
        return None;
    }
    let raw = |column: Column| column_index(column).and_then(|i| cells.get(i).copied());
    let text = |column: Column| raw(column).map(clean_text);

    let distance_label = text(Column::Distance)?;
    Some(RequirementEntry {
        distance_mi: parse_distance(&distance_label),
        distance_label,
        required_pct: text(Column::RequiredPct).and_then(|t| parse_percent(&t)),
        weekly: text(Column::Weekly).unwrap_or_default(),
        long_run: text(Column::LongRun).unwrap_or_default(),
        achieved_pct: text(Column::AchievedPct).and_then(|t| parse_percent(&t)),
        achieved_ok: raw(Column::AchievedIcon)
            .map(AchievementMarker::classify)
            .is_some_and(AchievementMarker::achieved),
        prognosis_time: text(Column::PrognosisTime).and_then(non_placeholder),
        optimum_time: text(Column::OptimumTime).and_then(non_placeholder),
    })
}

// =============================================================================
// Parser
// =============================================================================

/// Locates the requirements table and extracts one entry per data row.
#[derive(Debug, Clone)]
pub struct RequirementsParser {
    locator: Locator,
    data_row: Regex,
}

impl RequirementsParser {
    pub fn new(markers: &Markers) -> Result<Self, MarkerError> {
        markers.validate()?;
        Ok(Self {
            locator: Locator::new("table_class", &markers.table_class)?,
            data_row: compile(
                "row_class",
                &format!(r"(?i)^<tr{}", class_tag_pattern(&markers.row_class)),
            )?,
        })
    }

    /// Extract and order requirement entries. Never fails: a missing table
    /// or unmarked rows yield an empty, not-found result.
    pub fn parse(&self, html: &str) -> ParseResult<RequirementEntry> {
        if html.trim().is_empty() {
            return ParseResult::empty();
        }

        let login = login_detected(html);
        let fragment = self.locator.locate(html);
        tracing::debug!(
            located = fragment.located,
            bytes = fragment.html.len(),
            head = preview(fragment.html),
            "Requirements fragment"
        );

        let mut entries = Vec::new();
        let mut unmarked = 0usize;
        let mut short = 0usize;
        for row in blocks(fragment.html, tr_open_re(), tr_close_re()) {
            if !self.data_row.is_match(row.open) {
                unmarked += 1;
                continue;
            }
            let row_cells = cells(row.inner);
            match entry_from_cells(&row_cells) {
                Some(entry) => entries.push(entry),
                None => {
                    short += 1;
                    tracing::debug!(cells = row_cells.len(), "Skipping short requirements row");
                }
            }
        }

        tracing::debug!(
            entries = entries.len(),
            unmarked_rows = unmarked,
            short_rows = short,
            login_detected = login,
            "Requirements extraction complete"
        );

        sequence(&mut entries);
        ParseResult::new(login, entries)
    }
}

/// Parse a requirements document with the built-in markers.
pub fn parse_requirements(html: &str) -> ParseResult<RequirementEntry> {
    static PARSER: OnceLock<RequirementsParser> = OnceLock::new();
    PARSER
        .get_or_init(|| {
            RequirementsParser::new(&Markers::default()).expect("built-in markers are valid")
        })
        .parse(html)
}
