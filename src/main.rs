// RunShape - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading (explicit --config or platform default)
// 3. Logging initialisation (debug mode support)
// 4. One extraction run, result to file or stdout

use clap::{Parser, ValueEnum};
use runshape::app::pipeline::{self, ExtractRequest, InputSource};
use runshape::core::export::OutputFormat;
use runshape::core::model::Kind;
use runshape::platform::config::{self, AppConfig, PlatformPaths};
use runshape::util;
use std::path::PathBuf;

/// Which page shape the input holds.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    /// Race-time prognosis panel.
    Prognosis,
    /// Marathon shape requirements table.
    Requirements,
}

impl From<KindArg> for Kind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Prognosis => Kind::Prognosis,
            KindArg::Requirements => Kind::Requirements,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

/// Extract structured records from saved Runalyze pages.
#[derive(Parser, Debug)]
#[command(name = "runshape", version, about)]
struct Cli {
    /// Page shape to extract.
    #[arg(value_enum)]
    kind: KindArg,

    /// Saved HTML page (or fetch-step JSON record). Reads stdin if omitted or `-`.
    input: Option<PathBuf>,

    /// Write the result here instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Output encoding (overrides config).
    #[arg(long = "format", value_enum)]
    format: Option<FormatArg>,

    /// Single-line JSON.
    #[arg(long = "compact")]
    compact: bool,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config first: its [logging] level feeds logging init. Warnings are
    // replayed once the subscriber exists.
    let (app_config, config_warnings) = match cli.config {
        Some(ref path) => match config::load_config_strict(path) {
            Ok(loaded) => (loaded, Vec::new()),
            Err(e) => {
                util::logging::init(cli.debug, None, None);
                let err = util::error::RunShapeError::from(e);
                tracing::error!(error = %err, "Cannot load config");
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        },
        None => config::load_config(&PlatformPaths::resolve().config_file()),
    };

    util::logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "RunShape starting"
    );

    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    let request = build_request(&cli, app_config);

    match pipeline::run(&request) {
        Ok(summary) => {
            if summary.login_detected && !summary.found {
                eprintln!("Warning: page looks like a login screen; refresh the saved session.");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Extraction failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Merge CLI flags over config values.
fn build_request(cli: &Cli, app_config: AppConfig) -> ExtractRequest {
    ExtractRequest {
        kind: cli.kind.into(),
        input: InputSource::from_arg(cli.input.as_deref()),
        output: cli.output.clone(),
        format: cli.format.map(Into::into).unwrap_or(app_config.format),
        pretty: app_config.pretty && !cli.compact,
        markers: app_config.markers,
        max_input_bytes: app_config.max_input_bytes,
        unwrap_envelope: app_config.unwrap_envelope,
    }
}
