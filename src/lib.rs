//! # pdf2x
//!
//! Convert PDF documents to plain text, PNG images and HTML by driving the
//! Xpdf command-line tools (`pdftotext`, `pdftopng`, `pdftohtml`).
//!
//! ## Why shell out?
//!
//! The Xpdf tools are mature, fast and deterministic. This crate does not
//! parse or render PDFs itself; it turns a typed options struct into the
//! tools' flag grammar, runs the right binary for the host, and hands the
//! results back as Rust values, while making sure every temporary file it
//! created is gone when the call returns.
//!
//! ## Call Flow
//!
//! ```text
//! caller
//!  │
//!  ├─ Pdf2x        pick the converter for the options' kind
//!  ├─ Converter    build flags → workspace → run tool → read artifacts
//!  │   ├─ args       options → "-flag value" tokens → argv + paths
//!  │   ├─ workspace  <uuid>-<secs> temp dir/file, removed on every path
//!  │   ├─ locate     Lib/Xpdf/<OS>/<arch>/<tool>.<ext>
//!  │   ├─ process    spawn, await exit, kill on cancellation
//!  │   └─ artifacts  creation-ordered files → text / base64 / HTML
//!  └─ ConversionOutput (or a single Pdf2xError)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2x::{ImageOptions, Pdf2x, ToolConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Tools are looked up under <exe dir>/Lib/Xpdf/<OS>/<arch>/
//!     let pdf2x = Pdf2x::new(ToolConfig::from_current_exe()?);
//!     let options = ImageOptions::builder().resolution(300).build()?;
//!     let pngs = pdf2x
//!         .convert_to_png(&options, "document.pdf", &CancellationToken::new())
//!         .await?;
//!     eprintln!("{} pages rendered", pngs.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Cancellation and timeouts
//!
//! Every call takes a [`tokio_util::sync::CancellationToken`]. Cancelling it
//! kills that call's child process and nothing else. There is no built-in
//! timeout; wire a deadline into the token if you need one.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2x` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod facade;
pub mod outcome;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ConversionOptions, Eol, ImageOptions, ImageOptionsBuilder, MarkupOptions,
    MarkupOptionsBuilder, Rotation, TextOptions, TextOptionsBuilder, ToolConfig,
    ToolConfigBuilder,
};
pub use convert::Converter;
pub use error::Pdf2xError;
pub use facade::Pdf2x;
pub use outcome::ExitOutcome;
pub use output::ConversionOutput;
pub use pipeline::locate::ToolKind;
