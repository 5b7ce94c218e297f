use std::fmt;
use std::io;
use std::path::Path;

use crate::HuffpackError;

/// Error reported by the command-line tools: a line for the user, plus the
/// underlying cause when there is one.
#[derive(Debug)]
pub struct CliError {
    message: String,
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    fn caused_by<E>(message: String, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message,
            cause: Some(Box::new(cause)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

fn io_suggestion(err: &io::Error) -> &'static str {
    match err.kind() {
        io::ErrorKind::NotFound => "Check the path; the file does not exist.",
        io::ErrorKind::PermissionDenied => "Check the file permissions.",
        io::ErrorKind::InvalidData => "Input must be UTF-8 text, one string per line.",
        io::ErrorKind::UnexpectedEof => "The file looks truncated.",
        io::ErrorKind::WriteZero => "The disk may be full.",
        _ if err.raw_os_error() == Some(28) => "The disk may be full.",
        _ => "Check the path and free disk space.",
    }
}

/// Describe a failed file operation together with a suggestion.
pub fn format_io_error(operation: &str, path: &Path, err: &io::Error) -> String {
    format!(
        "Error {operation} '{}': {err}. {}",
        path.display(),
        io_suggestion(err)
    )
}

pub fn io_cli_error(operation: &str, path: &Path, err: io::Error) -> CliError {
    CliError::caused_by(format_io_error(operation, path, &err), err)
}

pub fn simple_cli_error(msg: &str) -> CliError {
    CliError {
        message: msg.to_owned(),
        cause: None,
    }
}

/// Convert a library error into a CLI error with a hint.
pub fn huffpack_cli_error(context: &str, err: HuffpackError) -> CliError {
    CliError::caused_by(format!("{context}: {}", cli_hint(&err)), err)
}

/// Return an actionable hint for an error variant.
pub fn cli_hint(err: &HuffpackError) -> String {
    use HuffpackError::*;
    match err {
        EmptyAlphabet => "no training symbols. Provide a non-empty sample file.".into(),
        CodeTooLong { .. } => format!("{err}. Raise --max-length or shrink the vocabulary."),
        OutOfBits { .. } => format!("{err}. Input is truncated or --count is too large."),
        UnknownCode { .. } | InvalidLiteral(_) => {
            format!("{err}. Input was encoded with a different codebook or is corrupt.")
        }
        InvalidCodeTable(msg) => format!("{msg}. Regenerate the codebook."),
        Config(msg) => format!("{msg}. Invalid configuration."),
        Io(io) => format!("{io}"),
        Bincode(e) => format!("{e}. Codebook file is not readable."),
        Json(e) => format!("{e}. Check the JSON input."),
        UnflushedBits { .. } | InvalidBitCount(_) | SeekPastEnd { .. } | Unseekable => {
            format!("{err}. This is a bug.")
        }
    }
}

/// Install a `tracing` subscriber for the command-line tools. `RUST_LOG`
/// overrides the default `huffpack=info` filter.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("huffpack=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read a text file as one sample per line.
pub fn read_lines(path: &Path) -> Result<Vec<String>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| io_cli_error("reading", path, e))?;
    Ok(text.lines().map(str::to_owned).collect())
}
