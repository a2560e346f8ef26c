// RunShape - core/markers.rs
//
// The class tokens and unit suffix the extractors key on. Kept as data so
// upstream markup drift is a config change, not a code change.

use crate::util::constants;
use crate::util::error::MarkerError;
use serde::Deserialize;

/// Identifying markers for both markup shapes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Markers {
    /// Class token on the prognosis panel container.
    pub panel_class: String,
    /// Class token on the requirements table.
    pub table_class: String,
    /// Class token on requirement data rows.
    pub row_class: String,
    /// Class token on the right-aligned time/pace span.
    pub right_class: String,
    /// Unit suffix of distance and pace tokens.
    pub distance_unit: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            panel_class: constants::DEFAULT_PANEL_CLASS.to_string(),
            table_class: constants::DEFAULT_TABLE_CLASS.to_string(),
            row_class: constants::DEFAULT_ROW_CLASS.to_string(),
            right_class: constants::DEFAULT_RIGHT_CLASS.to_string(),
            distance_unit: constants::DEFAULT_DISTANCE_UNIT.to_string(),
        }
    }
}

impl Markers {
    /// Check every field: non-empty, bounded, and limited to characters
    /// that can appear in a class token (the unit may also hold `/` and `.`).
    pub fn validate(&self) -> Result<(), MarkerError> {
        check_field("panel_class", &self.panel_class, is_class_char)?;
        check_field("table_class", &self.table_class, is_class_char)?;
        check_field("row_class", &self.row_class, is_class_char)?;
        check_field("right_class", &self.right_class, is_class_char)?;
        check_field("distance_unit", &self.distance_unit, |c| {
            is_class_char(c) || c == '/' || c == '.'
        })?;
        Ok(())
    }
}

fn is_class_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn check_field(
    field: &'static str,
    value: &str,
    allowed: impl Fn(char) -> bool,
) -> Result<(), MarkerError> {
    if value.is_empty() {
        return Err(MarkerError::Empty { field });
    }
    let length = value.chars().count();
    if length > constants::MAX_MARKER_LENGTH {
        return Err(MarkerError::TooLong {
            field,
            length,
            max_length: constants::MAX_MARKER_LENGTH,
        });
    }
    if let Some(ch) = value.chars().find(|c| !allowed(*c)) {
        return Err(MarkerError::InvalidChar {
            field,
            value: value.to_string(),
            ch,
        });
    }
    Ok(())
}

/// Pattern fragment matching the rest of an opening tag, through its `>`,
/// whose `class` attribute contains `token` as a whole class name. Quoted
/// and unquoted attribute values are both accepted.
pub(crate) fn class_tag_pattern(token: &str) -> String {
    format!(
        r#"[^>]*?\bclass\s*=\s*(?:"(?:[^"]*?\s)?{t}(?:\s[^"]*)?"[^>]*|'(?:[^']*?\s)?{t}(?:\s[^']*)?'[^>]*|{t}(?:[\s/][^>]*)?)>"#,
        t = regex::escape(token)
    )
}

/// Compile a pattern built from a marker, tagging failures with the field.
pub(crate) fn compile(field: &'static str, pattern: &str) -> Result<regex::Regex, MarkerError> {
    regex::Regex::new(pattern).map_err(|source| MarkerError::Pattern { field, source })
}
