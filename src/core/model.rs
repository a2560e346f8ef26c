// RunShape - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies. These are the shared vocabulary across layers.

use serde::{Deserialize, Serialize};

// =============================================================================
// Parse result
// =============================================================================

/// Outcome of one extraction call: metadata plus the ordered entries.
///
/// Serialises to exactly two top-level keys, `meta` and `entries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult<E> {
    pub meta: Meta,
    pub entries: Vec<E>,
}

/// Advisory metadata accompanying every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Authentication-page markers were found somewhere in the raw input.
    /// Independent of whether any entries were extracted.
    pub login_detected: bool,

    /// True iff `entries` is non-empty.
    pub found: bool,
}

impl<E> ParseResult<E> {
    /// Assemble a result, deriving `found` from the entries.
    pub fn new(login_detected: bool, entries: Vec<E>) -> Self {
        Self {
            meta: Meta {
                login_detected,
                found: !entries.is_empty(),
            },
            entries,
        }
    }

    /// The result for empty input: nothing detected, nothing found.
    pub fn empty() -> Self {
        Self::new(false, Vec::new())
    }
}

// =============================================================================
// Entries
// =============================================================================

/// One predicted race time from the prognosis panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrognosisEntry {
    /// Distance token as displayed, e.g. "1,86 mi".
    pub distance_label: String,
    /// Parsed miles; `None` if the label was not a number.
    pub distance_mi: Option<f64>,
    /// Predicted time as displayed, e.g. "13:13".
    pub time: Option<String>,
    /// Predicted pace as displayed, e.g. "7:05/mi".
    pub pace: Option<String>,
}

/// One row of the marathon-shape requirements table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementEntry {
    pub distance_label: String,
    pub distance_mi: Option<f64>,
    /// Target percentage.
    pub required_pct: Option<u32>,
    /// Weekly volume, free text.
    pub weekly: String,
    /// Long-run target, free text.
    pub long_run: String,
    pub achieved_pct: Option<u32>,
    /// Derived from the row's icon; `false` when the icon is not recognised.
    pub achieved_ok: bool,
    /// `None` when the cell showed a placeholder dash.
    pub prognosis_time: Option<String>,
    /// `None` when the cell showed a placeholder dash or was absent.
    pub optimum_time: Option<String>,
}

/// Access to the sort key shared by all entry kinds.
pub trait Distance {
    fn distance_mi(&self) -> Option<f64>;
}

impl Distance for PrognosisEntry {
    fn distance_mi(&self) -> Option<f64> {
        self.distance_mi
    }
}

impl Distance for RequirementEntry {
    fn distance_mi(&self) -> Option<f64> {
        self.distance_mi
    }
}

// =============================================================================
// Extraction kind
// =============================================================================

/// Which of the two known markup shapes a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Prognosis,
    Requirements,
}

impl Kind {
    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Prognosis => "prognosis",
            Kind::Requirements => "requirements",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
