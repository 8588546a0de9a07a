//! The per-kind conversion state machine.
//!
//! A [`Converter`] is bound to one [`ToolKind`] and drives a call through:
//!
//! ```text
//! Building ──▶ Running ──▶ ReadingResults ──▶ Cleanup ──▶ Done
//!    │            │              │               ▲
//!    └────────────┴──────────────┴── Failed ─────┘
//! ```
//!
//! * Building: options → flag tokens, then argv with the input and output paths.
//! * Running: acquire a [`Workspace`], locate and run the tool.
//! * A non-success exit code aborts with [`Pdf2xError::ToolFailed`]; there is
//!   never a partial result.
//! * ReadingResults: artifacts in creation order, decoded per kind.
//! * Cleanup: the workspace is released on every path, including errors.
//!   Dropping the future (cancellation from outside) still removes it via
//!   the workspace's `Drop`.
//!
//! Two call shapes exist for every kind. "Convert" keeps everything in a
//! private workspace and returns the pages; "convert and save" writes into a
//! caller-owned directory that is never cleaned up. Both also accept raw
//! document bytes, which are staged in a temporary input file that is always
//! deleted afterwards.

use crate::config::{ConversionOptions, ToolConfig};
use crate::error::Pdf2xError;
use crate::outcome::ExitOutcome;
use crate::output::ConversionOutput;
use crate::pipeline::locate::{self, ToolKind};
use crate::pipeline::workspace::Workspace;
use crate::pipeline::{args, artifacts, process};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs one Xpdf tool on behalf of callers.
///
/// Construction locates the tool afresh; nothing is cached between
/// converters, and a converter holds no per-call state, so one instance can
/// serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct Converter {
    kind: ToolKind,
    tool: PathBuf,
    config: ToolConfig,
}

impl Converter {
    /// Locate the tool for `kind` under the configured tool root.
    pub fn new(kind: ToolKind, config: &ToolConfig) -> Result<Self, Pdf2xError> {
        let tool = locate::locate(&config.resolved_tool_root(), kind)?;
        debug!("Located {} at {}", kind, tool.display());
        Ok(Self {
            kind,
            tool,
            config: config.clone(),
        })
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn tool_path(&self) -> &Path {
        &self.tool
    }

    /// Run the tool, writing artifacts into `output_dir`, and report the raw
    /// outcome.
    ///
    /// A missing input yields [`ExitOutcome::Other`] without starting the
    /// tool. `output_dir` is created if needed and is never removed.
    pub async fn run(
        &self,
        options: &ConversionOptions,
        input: &Path,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<ExitOutcome, Pdf2xError> {
        self.check_kind(options)?;
        let flags = args::build(options);
        let (outcome, _) = self.execute(&flags, input, output_dir, cancel).await?;
        Ok(outcome)
    }

    /// Convert into a caller-owned directory; non-success outcomes are errors.
    pub async fn convert_and_save(
        &self,
        options: &ConversionOptions,
        input: &Path,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), Pdf2xError> {
        info!(
            "Converting {} → {} with {}",
            input.display(),
            output_dir.display(),
            self.kind
        );
        ensure_success(self.run(options, input, output_dir, cancel).await?)
    }

    /// Convert and return the pages in memory.
    pub async fn convert(
        &self,
        options: &ConversionOptions,
        input: &Path,
        cancel: &CancellationToken,
    ) -> Result<ConversionOutput, Pdf2xError> {
        self.check_kind(options)?;
        let started = Instant::now();
        info!("Converting {} with {}", input.display(), self.kind);

        let flags = args::build(options);
        let workspace = Workspace::directory(&self.config.temp_dir_for(self.kind)).await?;
        let result = self
            .convert_in(options, &flags, input, workspace.path(), cancel)
            .await;
        workspace.release().await;
        let pages = result?;

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            "Converted {}: {} pages in {}ms",
            input.display(),
            pages.len(),
            duration_ms
        );
        Ok(ConversionOutput {
            kind: self.kind,
            pages,
            duration_ms,
        })
    }

    /// [`Converter::convert`] for a document held in memory.
    pub async fn convert_bytes(
        &self,
        options: &ConversionOptions,
        bytes: &[u8],
        cancel: &CancellationToken,
    ) -> Result<ConversionOutput, Pdf2xError> {
        self.check_kind(options)?;
        let input = self.stage_input(bytes).await?;
        let result = self.convert(options, input.path(), cancel).await;
        input.release().await;
        result
    }

    /// [`Converter::convert_and_save`] for a document held in memory.
    pub async fn convert_bytes_and_save(
        &self,
        options: &ConversionOptions,
        bytes: &[u8],
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), Pdf2xError> {
        self.check_kind(options)?;
        let input = self.stage_input(bytes).await?;
        let result = self
            .convert_and_save(options, input.path(), output_dir, cancel)
            .await;
        input.release().await;
        result
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn check_kind(&self, options: &ConversionOptions) -> Result<(), Pdf2xError> {
        if options.kind() == self.kind {
            Ok(())
        } else {
            Err(Pdf2xError::InvalidOptions(format!(
                "{:?} options given to the {} converter",
                options.kind(),
                self.kind
            )))
        }
    }

    /// Run the tool once; returns the outcome and the output target used.
    async fn execute(
        &self,
        flags: &[String],
        input: &Path,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<(ExitOutcome, PathBuf), Pdf2xError> {
        let input = absolute(input)?;
        let output_dir = absolute(output_dir)?;
        let stem = input
            .file_stem()
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| OsString::from("output"));
        let target = self.kind.output_target(&output_dir, &stem);

        if !is_file(&input).await {
            warn!(
                "Input '{}' does not exist; {} not started",
                input.display(),
                self.kind
            );
            return Ok((ExitOutcome::Other(ExitOutcome::OTHER_CODE), target));
        }

        tokio::fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| Pdf2xError::Workspace {
                path: output_dir.clone(),
                source: e,
            })?;

        debug!(
            "{} {}",
            self.kind,
            args::command_line(flags, &input, &target)
        );
        let argv = args::argv(flags, &input, &target);
        let output =
            process::run(&self.tool, &argv, &self.config.working_dir, cancel).await?;
        let outcome = ExitOutcome::from_code(output.code);

        if outcome.is_success() {
            if !output.stderr.is_empty() {
                debug!("{} stderr: {}", self.kind, output.stderr);
            }
        } else {
            warn!(
                "{} exited with {} ({}): {}",
                self.kind,
                outcome,
                outcome.description(),
                output.stderr
            );
        }
        Ok((outcome, target))
    }

    async fn convert_in(
        &self,
        options: &ConversionOptions,
        flags: &[String],
        input: &Path,
        dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, Pdf2xError> {
        let (outcome, target) = self.execute(flags, input, dir, cancel).await?;
        ensure_success(outcome)?;

        match options {
            ConversionOptions::Text(o) => {
                let bytes = tokio::fs::read(&target)
                    .await
                    .map_err(|e| Pdf2xError::ReadArtifact {
                        path: target.clone(),
                        source: e,
                    })?;
                let text = artifacts::decode_text(&bytes, &o.encoding);
                Ok(artifacts::split_pages(&text, o.no_page_breaks))
            }
            ConversionOptions::Image(_) | ConversionOptions::Markup(_) => {
                artifacts::read_all(dir, self.kind).await
            }
        }
    }

    async fn stage_input(&self, bytes: &[u8]) -> Result<Workspace, Pdf2xError> {
        Workspace::file(&self.config.temp_dir_for(self.kind), "pdf", bytes).await
    }
}

fn ensure_success(outcome: ExitOutcome) -> Result<(), Pdf2xError> {
    if outcome.is_success() {
        Ok(())
    } else {
        Err(Pdf2xError::ToolFailed { outcome })
    }
}

fn absolute(path: &Path) -> Result<PathBuf, Pdf2xError> {
    std::path::absolute(path)
        .map_err(|e| Pdf2xError::InvalidOptions(format!("invalid path '{}': {e}", path.display())))
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
