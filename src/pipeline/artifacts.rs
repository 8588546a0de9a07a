//! Artifact reading: turn the files a tool wrote into in-memory results.
//!
//! Tool-generated file names are not guaranteed to sort by page, so artifacts
//! are ordered by creation time. Filesystems without birth time fall back to
//! modification time; ties are broken by path so the order is always
//! deterministic.

use crate::error::Pdf2xError;
use crate::pipeline::locate::ToolKind;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Form feed: the page separator in `pdftotext` output.
pub const PAGE_BREAK: char = '\u{000C}';

/// List files with `extension` below `dir`, oldest first.
pub async fn collect(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, Pdf2xError> {
    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&current)
            .await
            .map_err(|e| read_error(&current, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| read_error(&current, e))?
        {
            let path = entry.path();
            let meta = entry.metadata().await.map_err(|e| read_error(&path, e))?;
            if meta.is_dir() {
                pending.push(path);
            } else if has_extension(&path, extension) {
                let stamp = meta
                    .created()
                    .or_else(|_| meta.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                found.push((stamp, path));
            }
        }
    }

    found.sort();
    debug!("Found {} .{} artifacts in {}", found.len(), extension, dir.display());
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Read every artifact of `kind` under `dir` into one entry per file.
///
/// Images become base64 strings, markup is returned as text.
pub async fn read_all(dir: &Path, kind: ToolKind) -> Result<Vec<String>, Pdf2xError> {
    let files = collect(dir, kind.artifact_extension()).await?;
    let mut result = Vec::with_capacity(files.len());

    for file in files {
        let bytes = tokio::fs::read(&file)
            .await
            .map_err(|e| read_error(&file, e))?;
        result.push(match kind {
            ToolKind::Image => STANDARD.encode(&bytes),
            ToolKind::Text | ToolKind::Markup => String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    Ok(result)
}

/// Decode `pdftotext` output written with `encoding`.
///
/// Latin1 maps each byte to the code point of the same value; anything else
/// is treated as UTF-8. A leading byte-order mark is dropped.
pub fn decode_text(bytes: &[u8], encoding: &str) -> String {
    let text = if is_latin1(encoding) {
        bytes.iter().map(|&b| b as char).collect()
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };
    match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

fn is_latin1(encoding: &str) -> bool {
    let normalised = encoding.to_ascii_lowercase().replace(['-', '_'], "");
    matches!(normalised.as_str(), "latin1" | "iso88591")
}

/// Shape text output into pages.
///
/// When page breaks were suppressed on the tool side the text is split on
/// form feeds, dropping empty segments; otherwise it is one entry. Empty
/// text yields no entries.
pub fn split_pages(text: &str, no_page_breaks: bool) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if no_page_breaks {
        text.split(PAGE_BREAK)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        vec![text.to_string()]
    }
}

fn read_error(path: &Path, source: std::io::Error) -> Pdf2xError {
    Pdf2xError::ReadArtifact {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn split_on_form_feed_when_breaks_suppressed() {
        assert_eq!(split_pages("A\u{c}B\u{c}C", true), vec!["A", "B", "C"]);
        assert_eq!(split_pages("A\u{c}\u{c}B\u{c}", true), vec!["A", "B"]);
    }

    #[test]
    fn keep_whole_text_otherwise() {
        assert_eq!(split_pages("A\u{c}B\u{c}C", false), vec!["A\u{c}B\u{c}C"]);
        assert!(split_pages("", false).is_empty());
        assert!(split_pages("", true).is_empty());
    }

    #[test]
    fn latin1_bytes_map_to_code_points() {
        assert_eq!(decode_text(&[0x63, 0x61, 0x66, 0xE9], "Latin1"), "café");
        assert_eq!(decode_text(&[0xE9], "ISO-8859-1"), "é");
    }

    #[test]
    fn utf8_with_bom() {
        let bytes = "\u{FEFF}héllo".as_bytes();
        assert_eq!(decode_text(bytes, "UTF-8"), "héllo");
    }

    #[tokio::test]
    async fn collect_orders_by_creation_not_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-c.png", "page-a.png", "page-b.png"] {
            std::fs::write(dir.path().join(name), name).unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        std::fs::write(dir.path().join("notes.txt"), "skip").unwrap();

        let files = collect(dir.path(), "png").await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["page-c.png", "page-a.png", "page-b.png"]);
    }

    #[tokio::test]
    async fn read_all_descends_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("doc");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("page1.html"), "<p>1</p>").unwrap();

        let pages = read_all(dir.path(), ToolKind::Markup).await.unwrap();
        assert_eq!(pages, vec!["<p>1</p>"]);
    }

    #[tokio::test]
    async fn images_are_base64() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc-000001.png"), [0x89, b'P', b'N', b'G']).unwrap();

        let pages = read_all(dir.path(), ToolKind::Image).await.unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(STANDARD.decode(&pages[0]).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn missing_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect(&dir.path().join("absent"), "png").await.unwrap_err();
        assert!(matches!(err, Pdf2xError::ReadArtifact { .. }));
    }
}
