// RunShape - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// Output: stderr, plus [logging] file when configured. Stdout carries the
// JSON/CSV result and must stay clean.
// Raw page content is never logged beyond DEBUG_MAX_PREVIEW characters.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// `log_file`, when given, receives a copy of every event in addition to
/// stderr. If it cannot be opened, logging continues on stderr alone and
/// the failure is logged as a warning.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
pub fn init(debug_flag: bool, config_level: Option<&str>, log_file: Option<&Path>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .compact();

    let opened = log_file.map(|path| (path, open_log_file(path)));

    // try_init: a second call (e.g. from tests) keeps the first subscriber.
    let file_error = match opened {
        Some((_, Ok(file))) => {
            let _ = builder
                .with_ansi(false)
                .with_writer(io::stderr.and(Mutex::new(file)))
                .try_init();
            None
        }
        Some((path, Err(e))) => {
            let _ = builder.with_writer(io::stderr).try_init();
            Some((path, e))
        }
        None => {
            let _ = builder.with_writer(io::stderr).try_init();
            None
        }
    };

    if let Some((path, e)) = file_error {
        tracing::warn!(path = %path.display(), error = %e, "Cannot open log file; logging to stderr only");
    }

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        "Logging initialised"
    );
}

/// Open `path` for appending, creating it and its parent directory.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Truncate raw input for inclusion in debug output.
///
/// Cuts on a char boundary so multi-byte text never panics.
pub fn preview(s: &str) -> &str {
    match s.char_indices().nth(super::constants::DEBUG_MAX_PREVIEW) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
