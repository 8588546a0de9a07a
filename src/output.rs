//! Result type returned by in-memory conversions.

use crate::pipeline::locate::ToolKind;
use serde::{Deserialize, Serialize};

/// A fully populated conversion result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Which tool produced the pages.
    pub kind: ToolKind,
    /// One entry per page, in page order:
    /// text pages, base64-encoded PNGs, or HTML documents.
    pub pages: Vec<String>,
    /// Wall-clock time of the whole call in milliseconds.
    pub duration_ms: u64,
}

impl ConversionOutput {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Consume the output, keeping only the pages.
    pub fn into_pages(self) -> Vec<String> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_kind_and_pages() {
        let out = ConversionOutput {
            kind: ToolKind::Text,
            pages: vec!["A".into(), "B".into()],
            duration_ms: 12,
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"kind\":\"Text\""), "got: {json}");
        assert_eq!(out.page_count(), 2);
        assert_eq!(out.into_pages(), vec!["A", "B"]);
    }
}
