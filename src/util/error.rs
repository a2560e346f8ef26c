// RunShape - util/error.rs
//
// Typed error hierarchy for the edges of the system (markers, input,
// export, configuration). The extraction engine itself never fails: every
// malformed document degrades to an empty result, so no engine error
// type exists here.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all RunShape operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum RunShapeError {
    /// A marker set failed validation.
    Markers(MarkerError),

    /// The input document could not be obtained.
    Input(InputError),

    /// Writing the result failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for RunShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markers(e) => write!(f, "Marker error: {e}"),
            Self::Input(e) => write!(f, "Input error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for RunShapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Markers(e) => Some(e),
            Self::Input(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Marker errors
// ---------------------------------------------------------------------------

/// Errors related to extraction marker validation.
#[derive(Debug)]
pub enum MarkerError {
    /// A marker field is empty.
    Empty { field: &'static str },

    /// A marker field exceeds the maximum allowed length.
    TooLong {
        field: &'static str,
        length: usize,
        max_length: usize,
    },

    /// A marker field contains a character outside the allowed set.
    InvalidChar {
        field: &'static str,
        value: String,
        ch: char,
    },

    /// A pattern built from the markers failed to compile.
    Pattern {
        field: &'static str,
        source: regex::Error,
    },
}

impl fmt::Display for MarkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "marker '{field}' must not be empty"),
            Self::TooLong {
                field,
                length,
                max_length,
            } => write!(
                f,
                "marker '{field}' is {length} chars, exceeds maximum of {max_length}"
            ),
            Self::InvalidChar { field, value, ch } => write!(
                f,
                "marker '{field}' = '{value}' contains invalid character '{ch}'"
            ),
            Self::Pattern { field, source } => {
                write!(f, "pattern for marker '{field}' failed to compile: {source}")
            }
        }
    }
}

impl std::error::Error for MarkerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<MarkerError> for RunShapeError {
    fn from(e: MarkerError) -> Self {
        Self::Markers(e)
    }
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

/// Errors related to reading the input document.
#[derive(Debug)]
pub enum InputError {
    /// I/O error reading an input file.
    Io { path: PathBuf, source: io::Error },

    /// I/O error reading standard input.
    Stdin { source: io::Error },

    /// The input exceeds the configured size bound.
    TooLarge { size: usize, max_size: usize },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read '{}': {source}", path.display())
            }
            Self::Stdin { source } => write!(f, "cannot read standard input: {source}"),
            Self::TooLarge { size, max_size } => write!(
                f,
                "input is {size} bytes, exceeds maximum of {max_size} bytes. \
                 Raise [input] max_input_bytes in config if this is expected."
            ),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Stdin { source } => Some(source),
            Self::TooLarge { .. } => None,
        }
    }
}

impl From<InputError> for RunShapeError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing results.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for RunShapeError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for RunShapeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for RunShape results.
pub type Result<T> = std::result::Result<T, RunShapeError>;
