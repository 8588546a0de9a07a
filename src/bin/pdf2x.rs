//! CLI binary for pdf2x.
//!
//! A thin shim over the library crate that maps CLI flags to option structs,
//! runs one conversion per input, and prints or saves the results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use pdf2x::{
    ConversionOptions, ConversionOutput, Eol, ImageOptions, MarkupOptions, Pdf2x, Pdf2xError,
    Rotation, TextOptions, ToolConfig,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Text of every page, one block per page (stdout)
  pdf2x text --no-page-breaks report.pdf

  # Save PNGs at 300 DPI into ./pages
  pdf2x png --resolution 300 -o pages report.pdf

  # Convert a batch to HTML, four at a time, giving up after two minutes
  pdf2x html -j 4 --timeout 120 -o html *.pdf

  # Machine-readable output
  pdf2x png --json report.pdf > pages.json

TOOL LAYOUT:
  The Xpdf binaries are looked up under
    <working dir>/<tool root>/<Windows|Linux|Mac>/<x64|x86>/<tool>.<exe|linux|mac>
  with the tool root defaulting to Lib/Xpdf and the working directory to the
  directory containing pdf2x.

ENVIRONMENT VARIABLES:
  PDF2X_TOOL_ROOT     Override the tool root
  PDF2X_WORKING_DIR   Override the working (application base) directory
  PDF2X_TEMP_DIR      Root for temporary workspaces
  RUST_LOG            tracing filter, e.g. pdf2x=debug
"#;

/// Convert PDF files to text, PNG or HTML with the Xpdf tools.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2x",
    version,
    about = "Convert PDF files to text, PNG or HTML with the Xpdf tools",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Save artifacts into this directory instead of printing them.
    #[arg(short, long, global = true, env = "PDF2X_OUTPUT")]
    output: Option<PathBuf>,

    /// Root of the Xpdf tool layout (relative to the working directory).
    #[arg(long, global = true, env = "PDF2X_TOOL_ROOT")]
    tool_root: Option<PathBuf>,

    /// Directory the tools run in. Default: the directory of this executable.
    #[arg(long, global = true, env = "PDF2X_WORKING_DIR")]
    working_dir: Option<PathBuf>,

    /// Root for temporary workspaces.
    #[arg(long, global = true, env = "PDF2X_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Number of inputs converted concurrently.
    #[arg(short, long, global = true, env = "PDF2X_JOBS", default_value_t = 1,
          value_parser = clap::value_parser!(u16).range(1..))]
    jobs: u16,

    /// Cancel every conversion still running after this many seconds.
    #[arg(long, global = true, env = "PDF2X_TIMEOUT")]
    timeout: Option<u64>,

    /// Output structured JSON instead of raw pages.
    #[arg(long, global = true, env = "PDF2X_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "PDF2X_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2X_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2X_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract plain text with pdftotext.
    Text(TextArgs),
    /// Render pages to PNG with pdftopng.
    Png(PngArgs),
    /// Convert to HTML with pdftohtml.
    Html(HtmlArgs),
}

impl Command {
    fn inputs(&self) -> &[PathBuf] {
        match self {
            Command::Text(a) => &a.inputs,
            Command::Png(a) => &a.inputs,
            Command::Html(a) => &a.inputs,
        }
    }
}

#[derive(Args, Debug)]
struct PageArgs {
    /// First page to convert (1-based).
    #[arg(short, long, default_value_t = 0)]
    first: i32,

    /// Last page to convert (1-based).
    #[arg(short, long, default_value_t = 0)]
    last: i32,
}

#[derive(Args, Debug)]
struct PasswordArgs {
    /// Owner password for encrypted PDFs.
    #[arg(long)]
    owner_password: Option<String>,

    /// User password for encrypted PDFs.
    #[arg(long)]
    user_password: Option<String>,
}

#[derive(Args, Debug)]
struct TextArgs {
    /// PDF files to convert.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    #[command(flatten)]
    pages: PageArgs,

    #[command(flatten)]
    passwords: PasswordArgs,

    /// Keep the original physical layout.
    #[arg(long)]
    layout: bool,

    /// Optimise for simple one-column pages.
    #[arg(long)]
    simple: bool,

    /// Alternate simple-layout heuristic.
    #[arg(long)]
    simple2: bool,

    /// Table mode.
    #[arg(long)]
    table: bool,

    /// Line-printer mode.
    #[arg(long)]
    lineprinter: bool,

    /// Keep content-stream order.
    #[arg(long)]
    raw: bool,

    /// Output text encoding.
    #[arg(long, default_value = "Latin1")]
    enc: String,

    /// End-of-line convention. Default: native to this OS.
    #[arg(long, value_enum)]
    eol: Option<EolArg>,

    /// Insert a Unicode byte-order mark.
    #[arg(long)]
    bom: bool,

    /// Discard diagonal text.
    #[arg(long)]
    no_diag: bool,

    /// Separate clipped text.
    #[arg(long)]
    clip: bool,

    /// Suppress page breaks and return one entry per page.
    #[arg(long)]
    no_page_breaks: bool,

    /// Left margin in points.
    #[arg(long, default_value_t = 0.0)]
    margin_left: f64,

    /// Right margin in points.
    #[arg(long, default_value_t = 0.0)]
    margin_right: f64,

    /// Top margin in points.
    #[arg(long, default_value_t = 0.0)]
    margin_top: f64,

    /// Bottom margin in points.
    #[arg(long, default_value_t = 0.0)]
    margin_bottom: f64,
}

#[derive(Args, Debug)]
struct PngArgs {
    /// PDF files to convert.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    #[command(flatten)]
    pages: PageArgs,

    #[command(flatten)]
    passwords: PasswordArgs,

    /// Resolution in DPI.
    #[arg(short, long, default_value_t = ImageOptions::DEFAULT_RESOLUTION)]
    resolution: u32,

    /// Monochrome output.
    #[arg(long)]
    mono: bool,

    /// Grayscale output.
    #[arg(long)]
    gray: bool,

    /// Include an alpha channel (not with --mono).
    #[arg(long, conflicts_with = "mono")]
    alpha: bool,

    /// Rotate pages by 0, 90, 180 or 270 degrees.
    #[arg(long, default_value_t = 0)]
    rotate: u16,

    /// Disable the FreeType rasteriser.
    #[arg(long)]
    no_freetype: bool,

    /// Disable font anti-aliasing.
    #[arg(long)]
    no_aa: bool,

    /// Disable vector anti-aliasing.
    #[arg(long)]
    no_aa_vector: bool,
}

#[derive(Args, Debug)]
struct HtmlArgs {
    /// PDF files to convert.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    #[command(flatten)]
    pages: PageArgs,

    #[command(flatten)]
    passwords: PasswordArgs,

    /// Zoom factor.
    #[arg(short, long, default_value_t = 1.0)]
    zoom: f64,

    /// Background image resolution in DPI (0 = tool default).
    #[arg(short, long, default_value_t = 0)]
    resolution: u32,

    /// Vertical stretch factor.
    #[arg(long, default_value_t = 1.0)]
    vstretch: f64,

    /// Embed the background image.
    #[arg(long)]
    embed_background: bool,

    /// Do not extract fonts.
    #[arg(long)]
    no_fonts: bool,

    /// Embed fonts.
    #[arg(long)]
    embed_fonts: bool,

    /// Skip invisible text.
    #[arg(long)]
    skip_invisible: bool,

    /// Treat all text as invisible.
    #[arg(long)]
    all_invisible: bool,

    /// Convert form fields.
    #[arg(long)]
    form_fields: bool,

    /// Table mode.
    #[arg(long)]
    table: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EolArg {
    Unix,
    Dos,
    Mac,
}

impl From<EolArg> for Eol {
    fn from(v: EolArg) -> Self {
        match v {
            EolArg::Unix => Eol::Unix,
            EolArg::Dos => Eol::Dos,
            EolArg::Mac => Eol::Mac,
        }
    }
}

/// One line of `--json` output.
#[derive(Serialize)]
struct JsonResult<'a> {
    input: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a ConversionOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let inputs = cli.command.inputs().to_vec();
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && inputs.len() > 1;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config and options ─────────────────────────────────────────
    let config = build_config(&cli)?;
    let options = build_options(&cli.command)?;
    let pdf2x = Pdf2x::new(config);

    // ── Cancellation: Ctrl-C and --timeout ───────────────────────────────
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{}", red("Interrupted, cancelling conversions…"));
                cancel.cancel();
            }
        });
    }
    if let Some(secs) = cli.timeout {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            cancel.cancel();
        });
    }

    let bar = show_progress.then(|| progress_bar(inputs.len()));

    // ── Run conversions ──────────────────────────────────────────────────
    let mut results: Vec<(usize, Result<Option<ConversionOutput>, Pdf2xError>)> =
        stream::iter(inputs.iter().enumerate().map(|(idx, input)| {
            let pdf2x = &pdf2x;
            let options = options.clone();
            let cancel = &cancel;
            let output_dir = cli.output.as_deref();
            let bar = bar.as_ref();
            async move {
                let result = match output_dir {
                    Some(dir) => pdf2x
                        .convert_and_save(options, input, dir, cancel)
                        .await
                        .map(|()| None),
                    None => pdf2x.convert(options, input, cancel).await.map(Some),
                };
                if let Some(bar) = bar {
                    let mark = if result.is_ok() { green("✓") } else { red("✗") };
                    bar.println(format!("  {} {}", mark, input.display()));
                    bar.inc(1);
                }
                (idx, result)
            }
        }))
        .buffer_unordered(cli.jobs as usize)
        .collect()
        .await;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    results.sort_by_key(|(idx, _)| *idx);

    // ── Report ───────────────────────────────────────────────────────────
    let failed = if cli.json {
        print_json(&inputs, &results)?
    } else {
        print_pages(&inputs, &results, cli.quiet)?
    };

    if !cli.quiet && !cli.json {
        let ok = inputs.len() - failed;
        if let Some(ref dir) = cli.output {
            eprintln!(
                "{}  {}/{} converted  →  {}",
                if failed == 0 { green("✔") } else { red("✘") },
                ok,
                inputs.len(),
                bold(&dir.display().to_string()),
            );
        } else if inputs.len() > 1 {
            eprintln!("{}", dim(&format!("{ok}/{} converted", inputs.len())));
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} conversions failed", inputs.len());
    }
    Ok(())
}

/// Map CLI args to `ToolConfig`.
fn build_config(cli: &Cli) -> Result<ToolConfig> {
    let base = match cli.working_dir {
        Some(ref dir) => dir.clone(),
        None => {
            ToolConfig::from_current_exe()
                .context("Failed to locate the application directory")?
                .working_dir
        }
    };

    let mut builder = ToolConfig::builder(base);
    if let Some(ref root) = cli.tool_root {
        builder = builder.tool_root(root);
    }
    if let Some(ref dir) = cli.temp_dir {
        builder = builder.temp_root(dir);
    }
    builder.build().context("Invalid configuration")
}

/// Map the subcommand's flags to `ConversionOptions`.
fn build_options(command: &Command) -> Result<ConversionOptions> {
    let options = match command {
        Command::Text(a) => {
            let mut b = TextOptions::builder()
                .pages(a.pages.first, a.pages.last)
                .layout(a.layout)
                .simple(a.simple)
                .simple2(a.simple2)
                .table(a.table)
                .line_printer(a.lineprinter)
                .raw(a.raw)
                .encoding(&a.enc)
                .bom(a.bom)
                .no_diagonal(a.no_diag)
                .clip(a.clip)
                .no_page_breaks(a.no_page_breaks)
                .margins(a.margin_left, a.margin_right, a.margin_top, a.margin_bottom);
            if let Some(eol) = a.eol {
                b = b.eol(eol.into());
            }
            if let Some(ref pwd) = a.passwords.owner_password {
                b = b.owner_password(pwd);
            }
            if let Some(ref pwd) = a.passwords.user_password {
                b = b.user_password(pwd);
            }
            ConversionOptions::Text(b.build()?)
        }
        Command::Png(a) => {
            let mut b = ImageOptions::builder()
                .pages(a.pages.first, a.pages.last)
                .resolution(a.resolution)
                .mono(a.mono)
                .gray(a.gray)
                .alpha(a.alpha)
                .rotation(Rotation::from_degrees(a.rotate)?)
                .freetype(!a.no_freetype)
                .font_anti_aliasing(!a.no_aa)
                .vector_anti_aliasing(!a.no_aa_vector);
            if let Some(ref pwd) = a.passwords.owner_password {
                b = b.owner_password(pwd);
            }
            if let Some(ref pwd) = a.passwords.user_password {
                b = b.user_password(pwd);
            }
            ConversionOptions::Image(b.build()?)
        }
        Command::Html(a) => {
            let mut b = MarkupOptions::builder()
                .pages(a.pages.first, a.pages.last)
                .zoom(a.zoom)
                .resolution(a.resolution)
                .vstretch(a.vstretch)
                .embed_background(a.embed_background)
                .no_fonts(a.no_fonts)
                .embed_fonts(a.embed_fonts)
                .skip_invisible(a.skip_invisible)
                .all_invisible(a.all_invisible)
                .form_fields(a.form_fields)
                .table(a.table);
            if let Some(ref pwd) = a.passwords.owner_password {
                b = b.owner_password(pwd);
            }
            if let Some(ref pwd) = a.passwords.user_password {
                b = b.user_password(pwd);
            }
            ConversionOptions::Markup(b.build()?)
        }
    };
    Ok(options)
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    bar.set_prefix("Converting");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

type Results = [(usize, Result<Option<ConversionOutput>, Pdf2xError>)];

/// Print one JSON array entry per input; returns the failure count.
fn print_json(inputs: &[PathBuf], results: &Results) -> Result<usize> {
    let entries: Vec<JsonResult<'_>> = results
        .iter()
        .map(|(idx, result)| JsonResult {
            input: &inputs[*idx],
            output: result.as_ref().ok().and_then(Option::as_ref),
            error: result.as_ref().err().map(|e| e.to_string()),
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&entries).context("Failed to serialise output")?
    );
    Ok(results.iter().filter(|(_, r)| r.is_err()).count())
}

/// Write pages to stdout and errors to stderr; returns the failure count.
fn print_pages(inputs: &[PathBuf], results: &Results, quiet: bool) -> Result<usize> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let mut failed = 0;

    for (idx, result) in results {
        let input = &inputs[*idx];
        match result {
            Ok(Some(output)) => {
                if inputs.len() > 1 && !quiet {
                    eprintln!("{}", bold(&input.display().to_string()));
                }
                for page in &output.pages {
                    handle
                        .write_all(page.as_bytes())
                        .context("Failed to write to stdout")?;
                    if !page.ends_with('\n') {
                        handle.write_all(b"\n").ok();
                    }
                }
            }
            Ok(None) => {}
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", red("✗"), input.display(), e);
            }
        }
    }
    Ok(failed)
}
