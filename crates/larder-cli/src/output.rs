//! Shared output layer for human/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: human-readable text, or stable JSON when `--json` is set.

use larder_core::error::LarderError;
use serde::Serialize;
use std::io::{self, Write};

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON (one object per result, or a JSON array).
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    #[must_use]
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode, the value is serialized with `serde_json`. In human mode,
/// the provided `human_fn` closure produces the text output.
///
/// # Errors
///
/// Returns an error when serialization or writing fails.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

/// A rendered error: message plus optional remediation and stable code.
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Build from any failure, recovering the stable code and hint when a
    /// [`LarderError`] is anywhere in the chain.
    #[must_use]
    pub fn from_failure(err: &anyhow::Error) -> Self {
        err.downcast_ref::<LarderError>().map_or_else(
            || Self {
                message: format!("{err:#}"),
                suggestion: None,
                error_code: None,
            },
            |domain| Self {
                message: domain.to_string(),
                suggestion: domain.code().hint().map(str::to_owned),
                error_code: Some(domain.code().code().to_owned()),
            },
        )
    }
}

/// Render an error to stderr in the requested format.
///
/// # Errors
///
/// Returns an error when serialization or writing fails.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render a one-line success acknowledgement.
///
/// # Errors
///
/// Returns an error when serialization or writing fails.
pub fn render_success(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "ok": true,
                "message": message,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            writeln!(out, "✓ {message}")?;
        }
    }
    Ok(())
}
