//! One entry point for all three conversions.
//!
//! [`Pdf2x`] holds only a [`ToolConfig`]; each call builds the matching
//! [`Converter`] (locating the tool afresh) and delegates to it. There is no
//! shared state between calls, so a single `Pdf2x` can be cloned freely and
//! used from many tasks at once.

use crate::config::{ConversionOptions, ImageOptions, MarkupOptions, TextOptions, ToolConfig};
use crate::convert::Converter;
use crate::error::Pdf2xError;
use crate::output::ConversionOutput;
use crate::pipeline::locate::ToolKind;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Dispatches conversions to the converter for their kind.
///
/// # Example
/// ```rust,no_run
/// use pdf2x::{Pdf2x, TextOptions, ToolConfig};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pdf2x = Pdf2x::new(ToolConfig::from_current_exe()?);
/// let options = TextOptions::builder().no_page_breaks(true).build()?;
/// let pages = pdf2x
///     .convert_to_text(&options, "report.pdf", &CancellationToken::new())
///     .await?;
/// for (i, page) in pages.iter().enumerate() {
///     println!("--- page {} ---\n{}", i + 1, page);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pdf2x {
    config: ToolConfig,
}

impl Pdf2x {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// The converter for one kind.
    pub fn converter(&self, kind: ToolKind) -> Result<Converter, Pdf2xError> {
        Converter::new(kind, &self.config)
    }

    /// Extract text, one entry per page when page breaks are suppressed.
    pub async fn convert_to_text(
        &self,
        options: &TextOptions,
        input: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, Pdf2xError> {
        let options = ConversionOptions::Text(options.clone());
        Ok(self.convert(options, input, cancel).await?.pages)
    }

    /// Render pages to PNG, returned as base64 strings in page order.
    pub async fn convert_to_png(
        &self,
        options: &ImageOptions,
        input: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, Pdf2xError> {
        let options = ConversionOptions::Image(options.clone());
        Ok(self.convert(options, input, cancel).await?.pages)
    }

    /// Convert to HTML, one entry per generated HTML file.
    pub async fn convert_to_html(
        &self,
        options: &MarkupOptions,
        input: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, Pdf2xError> {
        let options = ConversionOptions::Markup(options.clone());
        Ok(self.convert(options, input, cancel).await?.pages)
    }

    /// Convert with any options and return the full output.
    pub async fn convert(
        &self,
        options: impl Into<ConversionOptions>,
        input: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<ConversionOutput, Pdf2xError> {
        let options = options.into();
        self.converter(options.kind())?
            .convert(&options, input.as_ref(), cancel)
            .await
    }

    /// Convert into a caller-owned directory.
    pub async fn convert_and_save(
        &self,
        options: impl Into<ConversionOptions>,
        input: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<(), Pdf2xError> {
        let options = options.into();
        self.converter(options.kind())?
            .convert_and_save(&options, input.as_ref(), output_dir.as_ref(), cancel)
            .await
    }

    /// Convert a document held in memory.
    pub async fn convert_bytes(
        &self,
        options: impl Into<ConversionOptions>,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<ConversionOutput, Pdf2xError> {
        let options = options.into();
        self.converter(options.kind())?
            .convert_bytes(&options, bytes, cancel)
            .await
    }

    /// Convert a document held in memory into a caller-owned directory.
    pub async fn convert_bytes_and_save(
        &self,
        options: impl Into<ConversionOptions>,
        bytes: &[u8],
        output_dir: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<(), Pdf2xError> {
        let options = options.into();
        self.converter(options.kind())?
            .convert_bytes_and_save(&options, bytes, output_dir.as_ref(), cancel)
            .await
    }

    /// Synchronous wrapper around [`Pdf2x::convert`].
    ///
    /// Creates a temporary tokio runtime internally; do not call from inside
    /// an async context.
    pub fn convert_sync(
        &self,
        options: impl Into<ConversionOptions>,
        input: impl AsRef<Path>,
    ) -> Result<ConversionOutput, Pdf2xError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| Pdf2xError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.convert(options, input, &CancellationToken::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converter_per_kind() {
        let pdf2x = Pdf2x::new(ToolConfig::new("/app"));
        for kind in [ToolKind::Text, ToolKind::Image, ToolKind::Markup] {
            let converter = pdf2x.converter(kind).unwrap();
            assert_eq!(converter.kind(), kind);
        }
    }

    #[test]
    fn convert_sync_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolConfig::builder(dir.path())
            .temp_root(dir.path().join("tmp"))
            .build()
            .unwrap();
        let err = Pdf2x::new(config)
            .convert_sync(MarkupOptions::default(), dir.path().join("nope.pdf"))
            .unwrap_err();
        assert_eq!(err.outcome(), Some(crate::ExitOutcome::Other(99)));
    }
}
