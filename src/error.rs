//! Error type for the pdf2x library.
//!
//! Every failure is fatal for the conversion call that raised it: there are no
//! partial results and no retries, since a wrapped tool given the same input
//! fails the same way every time. Variants are grouped by where the failure
//! originates so callers can match on the group they care about:
//!
//! * configuration: the tool cannot be located or the options are invalid,
//! * process: the tool could not start, reported a non-success exit code, or
//!   was cancelled,
//! * I/O: temporary workspace or artifact handling failed.

use crate::outcome::ExitOutcome;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2x library.
#[derive(Debug, Error)]
pub enum Pdf2xError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The host operating system has no matching tool build.
    #[error("Unsupported platform '{os}': Xpdf tools ship for Windows, Linux and Mac only")]
    UnsupportedPlatform { os: String },

    /// Options or configuration failed validation.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// The application base directory could not be determined.
    #[error("Cannot determine the application base directory: {0}")]
    BaseDirectory(#[source] std::io::Error),

    // ── Process errors ────────────────────────────────────────────────────
    /// The wrapped tool could not be started (usually: binary missing).
    #[error("Failed to start '{tool}': {source}\nCheck that the Xpdf binaries are installed under the tool root.")]
    SpawnFailed {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The wrapped tool ran and reported a non-success exit code.
    #[error("Exit Code: [{outcome}] {}", outcome.description())]
    ToolFailed { outcome: ExitOutcome },

    /// The cancellation token fired before the tool exited.
    #[error("Conversion cancelled")]
    Cancelled,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Creating a temporary workspace (or the caller's output directory) failed.
    #[error("Workspace error at '{path}': {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A produced artifact could not be listed or read.
    #[error("Failed to read artifact '{path}': {source}")]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// In-memory document bytes could not be written to a temporary file.
    #[error("Failed to write temporary input '{path}': {source}")]
    WriteInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2xError {
    /// The exit outcome carried by [`Pdf2xError::ToolFailed`], if any.
    pub fn outcome(&self) -> Option<ExitOutcome> {
        match self {
            Pdf2xError::ToolFailed { outcome } => Some(*outcome),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failed_display() {
        let e = Pdf2xError::ToolFailed {
            outcome: ExitOutcome::InputAccessDenied,
        };
        let msg = e.to_string();
        assert!(msg.contains("InputAccessDenied"), "got: {msg}");
        assert!(msg.contains("Error opening a PDF file."), "got: {msg}");
    }

    #[test]
    fn tool_failed_keeps_raw_code() {
        let e = Pdf2xError::ToolFailed {
            outcome: ExitOutcome::Other(12),
        };
        assert!(e.to_string().contains("Other(12)"));
        assert_eq!(e.outcome(), Some(ExitOutcome::Other(12)));
    }

    #[test]
    fn outcome_absent_for_other_errors() {
        assert_eq!(Pdf2xError::Cancelled.outcome(), None);
    }

    #[test]
    fn spawn_failed_display() {
        let e = Pdf2xError::SpawnFailed {
            tool: PathBuf::from("Lib/Xpdf/Linux/x64/pdftotext.linux"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = e.to_string();
        assert!(msg.contains("pdftotext.linux"), "got: {msg}");
        assert!(msg.contains("no such file"), "got: {msg}");
    }
}
