// RunShape - core/export.rs
//
// JSON and CSV export of parse results.
// Core layer: writes to any Write trait object; the path is for error
// messages only.

use crate::core::model::{ParseResult, PrognosisEntry, RequirementEntry};
use crate::util::error::ExportError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    /// Parse a format name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// Export a full result (`meta` + `entries`) as a JSON object.
///
/// Returns the number of entries written.
pub fn export_json<E: Serialize, W: Write>(
    result: &ParseResult<E>,
    mut writer: W,
    export_path: &Path,
    pretty: bool,
) -> Result<usize, ExportError> {
    let written = if pretty {
        serde_json::to_writer_pretty(&mut writer, result)
    } else {
        serde_json::to_writer(&mut writer, result)
    };
    written.map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| ExportError::Io {
            path: export_path.to_path_buf(),
            source: e,
        })?;

    Ok(result.entries.len())
}

/// An entry that can be flattened into one CSV row.
pub trait CsvRecord {
    /// Column names, in record order.
    fn header() -> &'static [&'static str];

    /// Field values; `None` fields are empty strings.
    fn record(&self) -> Vec<String>;
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl CsvRecord for PrognosisEntry {
    fn header() -> &'static [&'static str] {
        &["distance_label", "distance_mi", "time", "pace"]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.distance_label.clone(),
            opt(&self.distance_mi),
            opt(&self.time),
            opt(&self.pace),
        ]
    }
}

impl CsvRecord for RequirementEntry {
    fn header() -> &'static [&'static str] {
        &[
            "distance_label",
            "distance_mi",
            "required_pct",
            "weekly",
            "long_run",
            "achieved_pct",
            "achieved_ok",
            "prognosis_time",
            "optimum_time",
        ]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.distance_label.clone(),
            opt(&self.distance_mi),
            opt(&self.required_pct),
            self.weekly.clone(),
            self.long_run.clone(),
            opt(&self.achieved_pct),
            self.achieved_ok.to_string(),
            opt(&self.prognosis_time),
            opt(&self.optimum_time),
        ]
    }
}

/// Export entries as CSV with a header row.
pub fn export_csv<E: CsvRecord, W: Write>(
    entries: &[E],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(E::header())
        .map_err(|e| ExportError::Csv {
            path: export_path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for entry in entries {
        csv_writer
            .write_record(entry.record())
            .map_err(|e| ExportError::Csv {
                path: export_path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}
