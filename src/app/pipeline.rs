// RunShape - app/pipeline.rs
//
// One extraction run: read the saved page, recover the HTML, run the
// engine for the requested kind, write the result.
//
// Failure policy:
//   - Unreadable input, oversized input, invalid markers and output I/O
//     are errors.
//   - A page that yields nothing is not an error; it exports an empty,
//     not-found result.
//   - A stale session or an envelope error record is logged at WARN only.

use crate::core::envelope::unwrap_input;
use crate::core::export::{export_csv, export_json, CsvRecord, OutputFormat};
use crate::core::markers::Markers;
use crate::core::model::{Kind, Meta, ParseResult, PrognosisEntry, RequirementEntry};
use crate::core::prognosis::PrognosisParser;
use crate::core::requirements::RequirementsParser;
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::{ExportError, InputError, MarkerError, Result};
use serde::Serialize;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Shown in export error messages when the result goes to stdout.
const STDOUT_LABEL: &str = "<stdout>";

/// Where the input document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Path(PathBuf),
    Stdin,
}

impl InputSource {
    /// Interpret a CLI input argument: absent or `-` means stdin.
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            Some(p) if p.as_os_str() != constants::STDIO_PATH => Self::Path(p.to_path_buf()),
            _ => Self::Stdin,
        }
    }
}

/// Everything one run needs. CLI flags are merged over config before this
/// is built.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub kind: Kind,
    pub input: InputSource,
    /// `None` writes to stdout.
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub pretty: bool,
    pub markers: Markers,
    pub max_input_bytes: usize,
    pub unwrap_envelope: bool,
}

/// What a run produced, for the caller's own reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub entries: usize,
    pub found: bool,
    pub login_detected: bool,
    /// Error kind recorded by the fetch step, if the input was an error record.
    pub envelope_error: Option<String>,
}

/// Engine output for either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Prognosis(ParseResult<PrognosisEntry>),
    Requirements(ParseResult<RequirementEntry>),
}

impl Extraction {
    pub fn meta(&self) -> Meta {
        match self {
            Self::Prognosis(r) => r.meta,
            Self::Requirements(r) => r.meta,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Prognosis(r) => r.entries.len(),
            Self::Requirements(r) => r.entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the result in `format`. Returns the number of entries written.
    pub fn write<W: Write>(
        &self,
        writer: W,
        export_path: &Path,
        format: OutputFormat,
        pretty: bool,
    ) -> std::result::Result<usize, ExportError> {
        match self {
            Self::Prognosis(r) => write_result(r, writer, export_path, format, pretty),
            Self::Requirements(r) => write_result(r, writer, export_path, format, pretty),
        }
    }
}

fn write_result<E: Serialize + CsvRecord, W: Write>(
    result: &ParseResult<E>,
    writer: W,
    export_path: &Path,
    format: OutputFormat,
    pretty: bool,
) -> std::result::Result<usize, ExportError> {
    match format {
        OutputFormat::Json => export_json(result, writer, export_path, pretty),
        OutputFormat::Csv => export_csv(&result.entries, writer, export_path),
    }
}

/// Run the engine for `kind` over `html`. Fails only on invalid markers.
pub fn extract(kind: Kind, html: &str, markers: &Markers) -> std::result::Result<Extraction, MarkerError> {
    Ok(match kind {
        Kind::Prognosis => Extraction::Prognosis(PrognosisParser::new(markers)?.parse(html)),
        Kind::Requirements => {
            Extraction::Requirements(RequirementsParser::new(markers)?.parse(html))
        }
    })
}

/// Read the input document, enforcing the size bound.
pub fn read_input(source: &InputSource, max_bytes: usize) -> std::result::Result<String, InputError> {
    match source {
        InputSource::Path(path) => {
            let io_err = |e| InputError::Io {
                path: path.clone(),
                source: e,
            };
            let size = fs::file_size(path).map_err(io_err)?;
            if size > max_bytes as u64 {
                return Err(InputError::TooLarge {
                    size: usize::try_from(size).unwrap_or(usize::MAX),
                    max_size: max_bytes,
                });
            }
            fs::read_file_lossy(path).map_err(io_err)
        }
        InputSource::Stdin => {
            let (text, read) = fs::read_stream_lossy(io::stdin().lock(), max_bytes)
                .map_err(|e| InputError::Stdin { source: e })?;
            if read > max_bytes {
                return Err(InputError::TooLarge {
                    size: read,
                    max_size: max_bytes,
                });
            }
            Ok(text)
        }
    }
}

/// Execute one extraction run end to end.
pub fn run(request: &ExtractRequest) -> Result<RunSummary> {
    let raw = read_input(&request.input, request.max_input_bytes)?;
    tracing::debug!(
        kind = %request.kind,
        bytes = raw.len(),
        "Input read"
    );

    let (extraction, envelope_error) = extract_raw(request, &raw)?;

    let written = match request.output {
        Some(ref path) => {
            let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
                path: path.clone(),
                source: e,
            })?;
            extraction.write(BufWriter::new(file), path, request.format, request.pretty)?
        }
        None => {
            let stdout = io::stdout();
            extraction.write(
                stdout.lock(),
                Path::new(STDOUT_LABEL),
                request.format,
                request.pretty,
            )?
        }
    };

    let meta = extraction.meta();
    tracing::info!(
        kind = %request.kind,
        entries = written,
        found = meta.found,
        "Extraction written"
    );

    Ok(RunSummary {
        entries: written,
        found: meta.found,
        login_detected: meta.login_detected,
        envelope_error,
    })
}

/// Envelope and engine steps, shared by [`run`] and tests.
fn extract_raw(request: &ExtractRequest, raw: &str) -> Result<(Extraction, Option<String>)> {
    let (html, envelope_error) = if request.unwrap_envelope {
        let envelope = unwrap_input(raw);
        (envelope.html, envelope.error)
    } else {
        (std::borrow::Cow::Borrowed(raw), None)
    };

    if let Some(ref kind) = envelope_error {
        tracing::warn!(error = %kind, "Input is an error record from the fetch step");
    }

    let extraction = extract(request.kind, &html, &request.markers)?;

    if extraction.meta().login_detected {
        tracing::warn!(
            kind = %request.kind,
            found = !extraction.is_empty(),
            "Login markers present; the saved session may have expired"
        );
    }

    Ok((extraction, envelope_error))
}
