// RunShape - util/constants.rs
//
// Single source of truth for named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "RunShape";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "RunShape";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Extraction markers
// =============================================================================

/// Class token that identifies the prognosis panel container.
pub const DEFAULT_PANEL_CLASS: &str = "panel-content";

/// Class token that identifies the marathon-shape requirements table.
pub const DEFAULT_TABLE_CLASS: &str = "zebra-style";

/// Class token carried by data rows of the requirements table.
/// Header and decoration rows do not carry it.
pub const DEFAULT_ROW_CLASS: &str = "r";

/// Class token of the right-aligned span wrapping time and pace in the
/// prognosis panel.
pub const DEFAULT_RIGHT_CLASS: &str = "right";

/// Unit suffix that ends every distance token and every pace token.
pub const DEFAULT_DISTANCE_UNIT: &str = "mi";

/// Maximum length of a single marker string.
pub const MAX_MARKER_LENGTH: usize = 64;

/// Case-insensitive tokens that identify an authentication page.
pub const LOGIN_MARKERS: &[&str] = &["login", "signin", "sign in", "two-factor", "2fa"];

// =============================================================================
// Requirements table layout
// =============================================================================

/// Rows with fewer cells than this are header remnants or malformed rows.
pub const MIN_REQUIREMENT_CELLS: usize = 7;

/// Cleaned cell text that stands for "no value".
pub const PLACEHOLDER_DASH: &str = "-";

/// Icon families (after prefix stripping) meaning "achieved". A token
/// belongs to a family if it equals it or extends it with `-`, so
/// `check-square-o` is a check.
pub const ICON_CHECK_FAMILIES: &[&str] = &["check", "ok"];

/// Icon families (after prefix stripping) meaning "not achieved".
pub const ICON_CROSS_FAMILIES: &[&str] = &["x", "times", "minus", "remove", "close"];

/// Icon-font prefixes stripped from class tokens before classification.
pub const ICON_CLASS_PREFIXES: &[&str] = &["fa-", "icon-", "glyphicon-"];

// =============================================================================
// Input limits
// =============================================================================

/// Default upper bound on the size of an input document.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 16 * 1024 * 1024; // 16 MB

/// Minimum user-configurable input bound.
pub const MIN_MAX_INPUT_BYTES: usize = 1024;

/// Hard upper bound on input size (prevents configuration mistakes).
pub const ABSOLUTE_MAX_INPUT_BYTES: usize = 256 * 1024 * 1024; // 256 MB

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum number of characters of raw input included in debug output.
pub const DEBUG_MAX_PREVIEW: usize = 120;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Path argument that selects stdin / stdout.
pub const STDIO_PATH: &str = "-";
