//! Classification of the wrapped tool's exit code.
//!
//! Every Xpdf command-line tool reports its result through the same small set
//! of exit codes. [`ExitOutcome`] is the closed Rust view of that contract;
//! codes outside the documented set are kept verbatim in
//! [`ExitOutcome::Other`] so diagnostics never lose the raw value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The outcome of one run of a wrapped tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitOutcome {
    /// Exit code 0.
    Success,
    /// Exit code 1: the input PDF could not be opened.
    InputAccessDenied,
    /// Exit code 2: an output file could not be opened.
    OutputAccessDenied,
    /// Exit code 3: the PDF's permissions forbid the operation.
    PermissionDenied,
    /// Exit code 99, or any code the tool does not document.
    Other(i32),
}

impl ExitOutcome {
    /// Code the tools use for "other error", also reported when the input
    /// file is missing and the tool is never started.
    pub const OTHER_CODE: i32 = 99;

    /// Map a raw process exit code to its outcome.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ExitOutcome::Success,
            1 => ExitOutcome::InputAccessDenied,
            2 => ExitOutcome::OutputAccessDenied,
            3 => ExitOutcome::PermissionDenied,
            other => ExitOutcome::Other(other),
        }
    }

    /// The numeric exit code this outcome stands for.
    pub fn code(&self) -> i32 {
        match self {
            ExitOutcome::Success => 0,
            ExitOutcome::InputAccessDenied => 1,
            ExitOutcome::OutputAccessDenied => 2,
            ExitOutcome::PermissionDenied => 3,
            ExitOutcome::Other(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExitOutcome::Success)
    }

    /// Human-readable description, as documented by the Xpdf tools.
    pub fn description(&self) -> &'static str {
        match self {
            ExitOutcome::Success => "No error.",
            ExitOutcome::InputAccessDenied => "Error opening a PDF file.",
            ExitOutcome::OutputAccessDenied => "Error opening an output file.",
            ExitOutcome::PermissionDenied => "Error related to PDF permissions.",
            ExitOutcome::Other(_) => "Other error.",
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Other(code) => write!(f, "Other({code})"),
            named => write!(f, "{named:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_codes_map_to_named_outcomes() {
        assert_eq!(ExitOutcome::from_code(0), ExitOutcome::Success);
        assert_eq!(ExitOutcome::from_code(1), ExitOutcome::InputAccessDenied);
        assert_eq!(ExitOutcome::from_code(2), ExitOutcome::OutputAccessDenied);
        assert_eq!(ExitOutcome::from_code(3), ExitOutcome::PermissionDenied);
        assert_eq!(ExitOutcome::from_code(99), ExitOutcome::Other(99));
    }

    #[test]
    fn unknown_code_keeps_raw_value() {
        let outcome = ExitOutcome::from_code(42);
        assert_eq!(outcome, ExitOutcome::Other(42));
        assert_eq!(outcome.code(), 42);
        assert_eq!(outcome.description(), "Other error.");
    }

    #[test]
    fn display_names_outcome() {
        assert_eq!(ExitOutcome::PermissionDenied.to_string(), "PermissionDenied");
        assert_eq!(ExitOutcome::Other(7).to_string(), "Other(7)");
    }
}
