// RunShape - platform/config.rs
//
// Platform-specific config directory resolution and config.toml loading
// with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::export::OutputFormat;
use crate::core::markers::Markers;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for RunShape configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/runshape/ or %APPDATA%\RunShape\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file still works
/// with an older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[logging]` section.
    pub logging: LoggingSection,
    /// `[input]` section.
    pub input: InputSection,
    /// `[output]` section.
    pub output: OutputSection,
    /// `[markers]` section.
    pub markers: Option<Markers>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Also append log output to this file.
    pub file: Option<String>,
}

/// `[input]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Reject input documents larger than this.
    pub max_input_bytes: Option<usize>,
    /// Recover HTML from JSON records written by the fetch step.
    pub unwrap_envelope: Option<bool>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Indented JSON.
    pub pretty: Option<bool>,
    /// "json" or "csv".
    pub format: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Input --
    pub max_input_bytes: usize,
    pub unwrap_envelope: bool,

    // -- Output --
    pub pretty: bool,
    pub format: OutputFormat,

    // -- Extraction --
    pub markers: Markers,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: constants::DEFAULT_MAX_INPUT_BYTES,
            unwrap_envelope: true,
            pretty: true,
            format: OutputFormat::Json,
            markers: Markers::default(),
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate config.toml at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// warnings. A missing file yields defaults with no warnings. An unreadable
/// or unparseable file yields defaults plus one warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let raw = match read_raw_config(config_path) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let (config, invalid) = validate(raw);
    warnings.extend(invalid.iter().map(InvalidValue::warning));

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Load an explicitly named config file.
///
/// Unlike [`load_config`], nothing falls back: a missing or unparseable
/// file, or any invalid value, is an error, since the user asked for this
/// file by name.
pub fn load_config_strict(config_path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = read_raw_config(config_path)?;
    let (config, invalid) = validate(raw);
    match invalid.into_iter().next() {
        Some(bad) => Err(bad.into_error()),
        None => Ok(config),
    }
}

fn read_raw_config(config_path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source: e,
    })
}

/// A config value that failed validation and was replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InvalidValue {
    field: &'static str,
    value: String,
    expected: String,
    fallback: String,
}

impl InvalidValue {
    fn warning(&self) -> String {
        format!(
            "{} = {} is out of range. Expected: {}. Using default ({}).",
            self.field, self.value, self.expected, self.fallback
        )
    }

    fn into_error(self) -> ConfigError {
        ConfigError::ValueOutOfRange {
            field: self.field.to_string(),
            value: self.value,
            expected: self.expected,
        }
    }
}

/// Validate each field against named constants. Invalid values keep their
/// default and are reported back.
fn validate(raw: RawConfig) -> (AppConfig, Vec<InvalidValue>) {
    let mut config = AppConfig::default();
    let mut invalid = Vec::new();

    // -- Input: max_input_bytes --
    if let Some(bytes) = raw.input.max_input_bytes {
        if (constants::MIN_MAX_INPUT_BYTES..=constants::ABSOLUTE_MAX_INPUT_BYTES).contains(&bytes) {
            config.max_input_bytes = bytes;
        } else {
            invalid.push(InvalidValue {
                field: "[input] max_input_bytes",
                value: bytes.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_MAX_INPUT_BYTES,
                    constants::ABSOLUTE_MAX_INPUT_BYTES
                ),
                fallback: constants::DEFAULT_MAX_INPUT_BYTES.to_string(),
            });
        }
    }

    if let Some(unwrap) = raw.input.unwrap_envelope {
        config.unwrap_envelope = unwrap;
    }

    // -- Output --
    if let Some(pretty) = raw.output.pretty {
        config.pretty = pretty;
    }

    if let Some(ref name) = raw.output.format {
        match OutputFormat::from_name(name) {
            Some(format) => config.format = format,
            None => invalid.push(InvalidValue {
                field: "[output] format",
                value: format!("\"{name}\""),
                expected: "\"json\" or \"csv\"".to_string(),
                fallback: "json".to_string(),
            }),
        }
    }

    // -- Markers --
    if let Some(markers) = raw.markers {
        match markers.validate() {
            Ok(()) => config.markers = markers,
            Err(e) => invalid.push(InvalidValue {
                field: "[markers]",
                value: e.to_string(),
                expected: "non-empty class tokens of A-Z, a-z, 0-9, '_' and '-'".to_string(),
                fallback: "built-in markers".to_string(),
            }),
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            invalid.push(InvalidValue {
                field: "[logging] level",
                value: format!("\"{level}\""),
                expected: "error, warn, info, debug, trace".to_string(),
                fallback: constants::DEFAULT_LOG_LEVEL.to_string(),
            });
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(PathBuf::from(file));
        }
    }

    (config, invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_gives_defaults_without_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("config.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_values_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[input]
max_input_bytes = 4096
unwrap_envelope = false

[output]
pretty = false
format = "CSV"

[markers]
distance_unit = "km"

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.max_input_bytes, 4096);
        assert!(!config.unwrap_envelope);
        assert!(!config.pretty);
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.markers.distance_unit, "km");
        assert_eq!(config.markers.panel_class, constants::DEFAULT_PANEL_CLASS);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[input]
max_input_bytes = 1

[output]
format = "xml"

[markers]
row_class = "a b"

[logging]
level = "loud"
"#,
        )
        .unwrap();

        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 4, "warnings: {warnings:?}");
        assert_eq!(config.max_input_bytes, constants::DEFAULT_MAX_INPUT_BYTES);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.markers, Markers::default());
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_unparseable_file_warns_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[input\nmax_input_bytes = ").unwrap();

        let (config, warnings) = load_config(&path);
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_strict_load_rejects_out_of_range_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[input]\nmax_input_bytes = 1\n").unwrap();

        match load_config_strict(&path) {
            Err(ConfigError::ValueOutOfRange { field, value, .. }) => {
                assert_eq!(field, "[input] max_input_bytes");
                assert_eq!(value, "1");
            }
            other => panic!("expected ValueOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_strict_load_accepts_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[logging]\nfile = \"runshape.log\"\n").unwrap();

        let config = load_config_strict(&path).unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("runshape.log")));
    }

    #[test]
    fn test_strict_load_errors_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_strict(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[future]\nflag = true\n[output]\npretty = false\n").unwrap();
        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty());
        assert!(!config.pretty);
    }
}
