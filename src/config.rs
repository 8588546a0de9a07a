//! Configuration and option types.
//!
//! Two kinds of settings drive a conversion:
//!
//! * [`ToolConfig`] says *where* things live: the root of the shipped Xpdf
//!   binaries, the working directory the tools run in, and the root for
//!   per-call temporary workspaces. It is passed explicitly instead of being
//!   read from process-wide state.
//! * [`TextOptions`], [`ImageOptions`] and [`MarkupOptions`] say *what* the
//!   tool should do. Each field maps to at most one command-line flag (see
//!   [`crate::pipeline::args`]). They are plain data with `Default` and a
//!   validating builder, and are wrapped in [`ConversionOptions`] to select
//!   the conversion kind.

use crate::error::Pdf2xError;
use crate::pipeline::locate::{Platform, ToolKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ── Tool configuration ───────────────────────────────────────────────────

/// Where the wrapped tools live and where they run.
///
/// # Example
/// ```rust
/// use pdf2x::ToolConfig;
///
/// let config = ToolConfig::builder("/opt/myapp")
///     .temp_root("/var/tmp/myapp")
///     .build()
///     .unwrap();
/// assert_eq!(config.working_dir, std::path::Path::new("/opt/myapp"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Root of the `<OS>/<arch>/<tool>.<ext>` layout. Default: `Lib/Xpdf`.
    ///
    /// A relative root is resolved against [`ToolConfig::working_dir`].
    pub tool_root: PathBuf,

    /// Directory the tools are started in: the host application's base
    /// directory, never the caller's file locations.
    pub working_dir: PathBuf,

    /// Root for temporary workspaces. Default: `<system temp>/pdf2x`.
    ///
    /// Each tool kind gets its own subfolder named after the tool.
    pub temp_root: PathBuf,
}

impl ToolConfig {
    /// Default tool root relative to the working directory.
    pub const DEFAULT_TOOL_ROOT: &'static str = "Lib/Xpdf";

    /// Configuration rooted at an explicit application base directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool_root: PathBuf::from(Self::DEFAULT_TOOL_ROOT),
            working_dir: base_dir.into(),
            temp_root: std::env::temp_dir().join("pdf2x"),
        }
    }

    /// Configuration rooted at the directory of the running executable.
    pub fn from_current_exe() -> Result<Self, Pdf2xError> {
        let exe = std::env::current_exe().map_err(Pdf2xError::BaseDirectory)?;
        let base = exe.parent().ok_or_else(|| {
            Pdf2xError::BaseDirectory(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("executable '{}' has no parent directory", exe.display()),
            ))
        })?;
        Ok(Self::new(base))
    }

    /// Create a new builder rooted at `base_dir`.
    pub fn builder(base_dir: impl Into<PathBuf>) -> ToolConfigBuilder {
        ToolConfigBuilder {
            config: Self::new(base_dir),
        }
    }

    /// Temporary folder used by one tool kind.
    pub fn temp_dir_for(&self, kind: ToolKind) -> PathBuf {
        self.temp_root.join(kind.tool_name())
    }

    /// The tool root, made absolute against the working directory.
    pub fn resolved_tool_root(&self) -> PathBuf {
        resolve_against(&self.working_dir, &self.tool_root)
    }
}

pub(crate) fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Builder for [`ToolConfig`].
#[derive(Debug)]
pub struct ToolConfigBuilder {
    config: ToolConfig,
}

impl ToolConfigBuilder {
    pub fn tool_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.tool_root = root.into();
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.working_dir = dir.into();
        self
    }

    pub fn temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_root = dir.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ToolConfig, Pdf2xError> {
        let c = &self.config;
        if c.working_dir.as_os_str().is_empty() {
            return Err(Pdf2xError::InvalidOptions(
                "working directory must not be empty".into(),
            ));
        }
        if c.temp_root.as_os_str().is_empty() {
            return Err(Pdf2xError::InvalidOptions(
                "temp root must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// End-of-line convention for text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eol {
    Unix,
    Dos,
    Mac,
}

impl Eol {
    /// Convention native to the running OS: Mac on macOS, Unix on Linux,
    /// Dos everywhere else.
    pub fn platform_default() -> Self {
        match Platform::current() {
            Ok(Platform::Mac) => Eol::Mac,
            Ok(Platform::Linux) => Eol::Unix,
            _ => Eol::Dos,
        }
    }

    /// Value of the `-eol` flag.
    pub fn as_flag(&self) -> &'static str {
        match self {
            Eol::Unix => "unix",
            Eol::Dos => "dos",
            Eol::Mac => "mac",
        }
    }
}

impl fmt::Display for Eol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

/// Page rotation for image output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Parse a rotation given in degrees.
    pub fn from_degrees(degrees: u16) -> Result<Self, Pdf2xError> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(Pdf2xError::InvalidOptions(format!(
                "rotation must be 0, 90, 180 or 270 degrees, got {other}"
            ))),
        }
    }
}

// ── Text options ─────────────────────────────────────────────────────────

/// Options for `pdftotext`.
///
/// `Default` resolves the end-of-line convention for the running OS once,
/// here, so argument building never depends on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    /// First page to convert (1-based). 0 means "from the start".
    pub first_page: i32,
    /// Last page to convert (1-based). 0 means "to the end".
    pub last_page: i32,
    /// Keep the original physical layout.
    pub layout: bool,
    /// Optimise for simple one-column pages.
    pub simple: bool,
    /// Like `simple`, with a different heuristic for multi-column text.
    pub simple2: bool,
    /// Table mode: keep columns aligned.
    pub table: bool,
    /// Line-printer mode: fixed-pitch, fixed-height lines.
    pub line_printer: bool,
    /// Keep text in content-stream order.
    pub raw: bool,
    /// Text encoding name. Always emitted. Default: `Latin1`.
    pub encoding: String,
    /// Insert a Unicode byte-order mark.
    pub bom: bool,
    /// End-of-line convention. Always emitted.
    pub eol: Eol,
    pub owner_password: Option<String>,
    pub user_password: Option<String>,
    /// Ask the tool not to insert page breaks; the result is then split on
    /// form feeds into one entry per page.
    pub no_page_breaks: bool,
    /// Separate clipped text.
    pub clip: bool,
    /// Discard diagonal text.
    pub no_diagonal: bool,
    /// Margins in points; 0 leaves the tool default.
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            first_page: 0,
            last_page: 0,
            layout: false,
            simple: false,
            simple2: false,
            table: false,
            line_printer: false,
            raw: false,
            encoding: "Latin1".to_string(),
            bom: false,
            eol: Eol::platform_default(),
            owner_password: None,
            user_password: None,
            no_page_breaks: false,
            clip: false,
            no_diagonal: false,
            margin_left: 0.0,
            margin_right: 0.0,
            margin_top: 0.0,
            margin_bottom: 0.0,
        }
    }
}

impl TextOptions {
    pub fn builder() -> TextOptionsBuilder {
        TextOptionsBuilder {
            options: Self::default(),
        }
    }
}

/// Builder for [`TextOptions`].
#[derive(Debug)]
pub struct TextOptionsBuilder {
    options: TextOptions,
}

impl TextOptionsBuilder {
    pub fn pages(mut self, first: i32, last: i32) -> Self {
        self.options.first_page = first;
        self.options.last_page = last;
        self
    }

    pub fn layout(mut self, v: bool) -> Self {
        self.options.layout = v;
        self
    }

    pub fn simple(mut self, v: bool) -> Self {
        self.options.simple = v;
        self
    }

    pub fn simple2(mut self, v: bool) -> Self {
        self.options.simple2 = v;
        self
    }

    pub fn table(mut self, v: bool) -> Self {
        self.options.table = v;
        self
    }

    pub fn line_printer(mut self, v: bool) -> Self {
        self.options.line_printer = v;
        self
    }

    pub fn raw(mut self, v: bool) -> Self {
        self.options.raw = v;
        self
    }

    pub fn encoding(mut self, name: impl Into<String>) -> Self {
        self.options.encoding = name.into();
        self
    }

    pub fn bom(mut self, v: bool) -> Self {
        self.options.bom = v;
        self
    }

    pub fn eol(mut self, eol: Eol) -> Self {
        self.options.eol = eol;
        self
    }

    pub fn owner_password(mut self, pwd: impl Into<String>) -> Self {
        self.options.owner_password = Some(pwd.into());
        self
    }

    pub fn user_password(mut self, pwd: impl Into<String>) -> Self {
        self.options.user_password = Some(pwd.into());
        self
    }

    pub fn no_page_breaks(mut self, v: bool) -> Self {
        self.options.no_page_breaks = v;
        self
    }

    pub fn clip(mut self, v: bool) -> Self {
        self.options.clip = v;
        self
    }

    pub fn no_diagonal(mut self, v: bool) -> Self {
        self.options.no_diagonal = v;
        self
    }

    /// Margins in points: left, right, top, bottom.
    pub fn margins(mut self, left: f64, right: f64, top: f64, bottom: f64) -> Self {
        self.options.margin_left = left;
        self.options.margin_right = right;
        self.options.margin_top = top;
        self.options.margin_bottom = bottom;
        self
    }

    pub fn build(self) -> Result<TextOptions, Pdf2xError> {
        let o = &self.options;
        validate_pages(o.first_page, o.last_page)?;
        if o.encoding.trim().is_empty() {
            return Err(Pdf2xError::InvalidOptions(
                "encoding name must not be empty".into(),
            ));
        }
        let margins = [o.margin_left, o.margin_right, o.margin_top, o.margin_bottom];
        if margins.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(Pdf2xError::InvalidOptions(
                "margins must be finite and non-negative".into(),
            ));
        }
        Ok(self.options)
    }
}

// ── Image options ────────────────────────────────────────────────────────

/// Options for `pdftopng`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOptions {
    pub first_page: i32,
    pub last_page: i32,
    /// Resolution in DPI. Default: 150.
    pub resolution: u32,
    /// Monochrome output.
    pub mono: bool,
    /// Grayscale output.
    pub gray: bool,
    /// Include an alpha channel. Not allowed together with `mono`.
    pub alpha: bool,
    pub rotation: Rotation,
    /// FreeType font rasteriser. Default: on.
    pub freetype: bool,
    /// Font anti-aliasing. Default: on.
    pub font_anti_aliasing: bool,
    /// Vector anti-aliasing. Default: on.
    pub vector_anti_aliasing: bool,
    pub owner_password: Option<String>,
    pub user_password: Option<String>,
}

impl ImageOptions {
    pub const DEFAULT_RESOLUTION: u32 = 150;

    pub fn builder() -> ImageOptionsBuilder {
        ImageOptionsBuilder {
            options: Self::default(),
        }
    }
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            first_page: 0,
            last_page: 0,
            resolution: Self::DEFAULT_RESOLUTION,
            mono: false,
            gray: false,
            alpha: false,
            rotation: Rotation::None,
            freetype: true,
            font_anti_aliasing: true,
            vector_anti_aliasing: true,
            owner_password: None,
            user_password: None,
        }
    }
}

/// Builder for [`ImageOptions`].
#[derive(Debug)]
pub struct ImageOptionsBuilder {
    options: ImageOptions,
}

impl ImageOptionsBuilder {
    pub fn pages(mut self, first: i32, last: i32) -> Self {
        self.options.first_page = first;
        self.options.last_page = last;
        self
    }

    pub fn resolution(mut self, dpi: u32) -> Self {
        self.options.resolution = dpi;
        self
    }

    pub fn mono(mut self, v: bool) -> Self {
        self.options.mono = v;
        self
    }

    pub fn gray(mut self, v: bool) -> Self {
        self.options.gray = v;
        self
    }

    pub fn alpha(mut self, v: bool) -> Self {
        self.options.alpha = v;
        self
    }

    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.options.rotation = rotation;
        self
    }

    pub fn freetype(mut self, v: bool) -> Self {
        self.options.freetype = v;
        self
    }

    pub fn font_anti_aliasing(mut self, v: bool) -> Self {
        self.options.font_anti_aliasing = v;
        self
    }

    pub fn vector_anti_aliasing(mut self, v: bool) -> Self {
        self.options.vector_anti_aliasing = v;
        self
    }

    pub fn owner_password(mut self, pwd: impl Into<String>) -> Self {
        self.options.owner_password = Some(pwd.into());
        self
    }

    pub fn user_password(mut self, pwd: impl Into<String>) -> Self {
        self.options.user_password = Some(pwd.into());
        self
    }

    pub fn build(self) -> Result<ImageOptions, Pdf2xError> {
        let o = &self.options;
        validate_pages(o.first_page, o.last_page)?;
        if o.resolution == 0 {
            return Err(Pdf2xError::InvalidOptions(
                "resolution must be > 0".into(),
            ));
        }
        if o.mono && o.alpha {
            return Err(Pdf2xError::InvalidOptions(
                "alpha cannot be combined with mono".into(),
            ));
        }
        Ok(self.options)
    }
}

// ── Markup options ───────────────────────────────────────────────────────

/// Options for `pdftohtml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkupOptions {
    pub first_page: i32,
    pub last_page: i32,
    /// Zoom factor. Default: 1.0.
    pub zoom: f64,
    /// Background image resolution in DPI; 0 leaves the tool default.
    pub resolution: u32,
    /// Vertical stretch factor. Default: 1.0.
    pub vstretch: f64,
    /// Embed background images as data URIs.
    pub embed_background: bool,
    /// Do not extract embedded fonts.
    pub no_fonts: bool,
    /// Embed fonts as data URIs.
    pub embed_fonts: bool,
    /// Skip invisible text.
    pub skip_invisible: bool,
    /// Treat all text as invisible.
    pub all_invisible: bool,
    /// Convert form fields to HTML controls.
    pub form_fields: bool,
    /// Table mode.
    pub table: bool,
    pub owner_password: Option<String>,
    pub user_password: Option<String>,
}

impl MarkupOptions {
    pub fn builder() -> MarkupOptionsBuilder {
        MarkupOptionsBuilder {
            options: Self::default(),
        }
    }
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self {
            first_page: 0,
            last_page: 0,
            zoom: 1.0,
            resolution: 0,
            vstretch: 1.0,
            embed_background: false,
            no_fonts: false,
            embed_fonts: false,
            skip_invisible: false,
            all_invisible: false,
            form_fields: false,
            table: false,
            owner_password: None,
            user_password: None,
        }
    }
}

/// Builder for [`MarkupOptions`].
#[derive(Debug)]
pub struct MarkupOptionsBuilder {
    options: MarkupOptions,
}

impl MarkupOptionsBuilder {
    pub fn pages(mut self, first: i32, last: i32) -> Self {
        self.options.first_page = first;
        self.options.last_page = last;
        self
    }

    pub fn zoom(mut self, zoom: f64) -> Self {
        self.options.zoom = zoom;
        self
    }

    pub fn resolution(mut self, dpi: u32) -> Self {
        self.options.resolution = dpi;
        self
    }

    pub fn vstretch(mut self, factor: f64) -> Self {
        self.options.vstretch = factor;
        self
    }

    pub fn embed_background(mut self, v: bool) -> Self {
        self.options.embed_background = v;
        self
    }

    pub fn no_fonts(mut self, v: bool) -> Self {
        self.options.no_fonts = v;
        self
    }

    pub fn embed_fonts(mut self, v: bool) -> Self {
        self.options.embed_fonts = v;
        self
    }

    pub fn skip_invisible(mut self, v: bool) -> Self {
        self.options.skip_invisible = v;
        self
    }

    pub fn all_invisible(mut self, v: bool) -> Self {
        self.options.all_invisible = v;
        self
    }

    pub fn form_fields(mut self, v: bool) -> Self {
        self.options.form_fields = v;
        self
    }

    pub fn table(mut self, v: bool) -> Self {
        self.options.table = v;
        self
    }

    pub fn owner_password(mut self, pwd: impl Into<String>) -> Self {
        self.options.owner_password = Some(pwd.into());
        self
    }

    pub fn user_password(mut self, pwd: impl Into<String>) -> Self {
        self.options.user_password = Some(pwd.into());
        self
    }

    pub fn build(self) -> Result<MarkupOptions, Pdf2xError> {
        let o = &self.options;
        validate_pages(o.first_page, o.last_page)?;
        if !(o.zoom.is_finite() && o.zoom > 0.0) {
            return Err(Pdf2xError::InvalidOptions(format!(
                "zoom must be > 0, got {}",
                o.zoom
            )));
        }
        if !(o.vstretch.is_finite() && o.vstretch > 0.0) {
            return Err(Pdf2xError::InvalidOptions(format!(
                "vstretch must be > 0, got {}",
                o.vstretch
            )));
        }
        Ok(self.options)
    }
}

fn validate_pages(first: i32, last: i32) -> Result<(), Pdf2xError> {
    if first > 0 && last > 0 && first > last {
        return Err(Pdf2xError::InvalidOptions(format!(
            "first page {first} is after last page {last}"
        )));
    }
    Ok(())
}

// ── Tagged options ───────────────────────────────────────────────────────

/// Options for any conversion kind; the variant selects the tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConversionOptions {
    Text(TextOptions),
    Image(ImageOptions),
    Markup(MarkupOptions),
}

impl ConversionOptions {
    pub fn kind(&self) -> ToolKind {
        match self {
            ConversionOptions::Text(_) => ToolKind::Text,
            ConversionOptions::Image(_) => ToolKind::Image,
            ConversionOptions::Markup(_) => ToolKind::Markup,
        }
    }
}

impl From<TextOptions> for ConversionOptions {
    fn from(o: TextOptions) -> Self {
        ConversionOptions::Text(o)
    }
}

impl From<ImageOptions> for ConversionOptions {
    fn from(o: ImageOptions) -> Self {
        ConversionOptions::Image(o)
    }
}

impl From<MarkupOptions> for ConversionOptions {
    fn from(o: MarkupOptions) -> Self {
        ConversionOptions::Markup(o)
    }
}
