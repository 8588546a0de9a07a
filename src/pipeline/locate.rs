//! Tool location: map a conversion kind to its platform-specific executable.
//!
//! The host application ships one build of each Xpdf tool per OS and
//! architecture under a fixed layout:
//!
//! ```text
//! <root>/<Windows|Linux|Mac>/<x64|x86>/<tool>.<exe|linux|mac>
//! ```
//!
//! The layout is an external contract with the shipped binaries, so it is
//! reproduced exactly. Locating is a pure path computation; a missing binary
//! surfaces later as [`crate::error::Pdf2xError::SpawnFailed`].

use crate::error::Pdf2xError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which output a conversion produces, and therefore which tool runs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// Plain text via `pdftotext`.
    Text,
    /// One PNG per page via `pdftopng`.
    Image,
    /// HTML via `pdftohtml`.
    Markup,
}

impl ToolKind {
    /// File name of the tool, without the platform extension.
    pub fn tool_name(&self) -> &'static str {
        match self {
            ToolKind::Text => "pdftotext",
            ToolKind::Image => "pdftopng",
            ToolKind::Markup => "pdftohtml",
        }
    }

    /// Extension of the artifacts the tool writes.
    pub fn artifact_extension(&self) -> &'static str {
        match self {
            ToolKind::Text => "txt",
            ToolKind::Image => "png",
            ToolKind::Markup => "html",
        }
    }

    /// The output token handed to the tool for a given output directory.
    ///
    /// `pdftotext` takes a file, `pdftopng` a file-name root that it suffixes
    /// with page numbers, and `pdftohtml` a directory it creates itself.
    pub fn output_target(&self, output_dir: &Path, stem: impl AsRef<OsStr>) -> PathBuf {
        match self {
            ToolKind::Text => {
                let mut name = stem.as_ref().to_os_string();
                name.push(".");
                name.push(self.artifact_extension());
                output_dir.join(name)
            }
            ToolKind::Image | ToolKind::Markup => output_dir.join(stem.as_ref()),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

/// Operating systems the tools are built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Mac,
}

impl Platform {
    /// Detect the platform this process was compiled for.
    pub fn current() -> Result<Self, Pdf2xError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a platform.
    pub fn from_os(os: &str) -> Result<Self, Pdf2xError> {
        match os {
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "macos" => Ok(Platform::Mac),
            other => Err(Pdf2xError::UnsupportedPlatform {
                os: other.to_string(),
            }),
        }
    }

    pub fn folder(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::Mac => "Mac",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Platform::Windows => "exe",
            Platform::Linux => "linux",
            Platform::Mac => "mac",
        }
    }
}

/// Process bitness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X64,
    X86,
}

impl Arch {
    pub fn current() -> Self {
        if cfg!(target_pointer_width = "64") {
            Arch::X64
        } else {
            Arch::X86
        }
    }

    pub fn folder(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::X86 => "x86",
        }
    }
}

/// Resolve the tool for `kind` under `root` for the running platform.
pub fn locate(root: &Path, kind: ToolKind) -> Result<PathBuf, Pdf2xError> {
    Ok(locate_for(root, Platform::current()?, Arch::current(), kind))
}

/// Resolve the tool for an explicit platform and architecture.
pub fn locate_for(root: &Path, platform: Platform, arch: Arch, kind: ToolKind) -> PathBuf {
    root.join(platform.folder())
        .join(arch.folder())
        .join(format!("{}.{}", kind.tool_name(), platform.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_per_platform() {
        let root = Path::new("Lib").join("Xpdf");
        assert_eq!(
            locate_for(&root, Platform::Windows, Arch::X64, ToolKind::Text),
            Path::new("Lib/Xpdf/Windows/x64/pdftotext.exe")
        );
        assert_eq!(
            locate_for(&root, Platform::Linux, Arch::X86, ToolKind::Image),
            Path::new("Lib/Xpdf/Linux/x86/pdftopng.linux")
        );
        assert_eq!(
            locate_for(&root, Platform::Mac, Arch::X64, ToolKind::Markup),
            Path::new("Lib/Xpdf/Mac/x64/pdftohtml.mac")
        );
    }

    #[test]
    fn unknown_os_is_unsupported() {
        let err = Platform::from_os("freebsd").unwrap_err();
        assert!(matches!(err, Pdf2xError::UnsupportedPlatform { ref os } if os == "freebsd"));
    }

    #[test]
    fn output_targets() {
        let dir = Path::new("/out");
        assert_eq!(
            ToolKind::Text.output_target(dir, "doc"),
            Path::new("/out/doc.txt")
        );
        assert_eq!(ToolKind::Image.output_target(dir, "doc"), Path::new("/out/doc"));
        assert_eq!(ToolKind::Markup.output_target(dir, "doc"), Path::new("/out/doc"));
        assert_eq!(
            ToolKind::Text.output_target(dir, "q3.report"),
            Path::new("/out/q3.report.txt")
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn locate_uses_running_platform() {
        let path = locate(Path::new("root"), ToolKind::Text).unwrap();
        assert!(path.starts_with("root/Linux"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("linux"));
    }
}
