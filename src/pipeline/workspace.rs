//! Per-call temporary workspaces.
//!
//! A [`Workspace`] is a uniquely named file or directory owned by exactly one
//! conversion call. Names combine a random UUID with the current Unix time in
//! seconds (`<uuid>-<secs>`), so concurrent calls never collide and leftovers
//! can be matched to log lines by time.
//!
//! The entry is held as a `tempfile` guard. Release is explicit
//! ([`Workspace::release`], async) on the normal path; if the owning future
//! is dropped first (cancellation, panic) the guard removes the path itself.
//! Neither ever surfaces an error: cleanup must not mask the error that ended
//! the call.

use crate::error::Pdf2xError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir, TempPath};
use tracing::{debug, warn};

#[derive(Debug)]
enum Entry {
    Directory(TempDir),
    File(TempPath),
}

/// A scoped temporary path, removed on release or drop.
#[derive(Debug)]
pub struct Workspace {
    entry: Entry,
}

impl Workspace {
    /// Create a fresh, empty directory under `root`.
    pub async fn directory(root: &Path) -> Result<Self, Pdf2xError> {
        ensure_root(root).await?;
        let dir = Builder::new()
            .prefix(&unique_stem())
            .rand_bytes(0)
            .tempdir_in(root)
            .map_err(|e| Pdf2xError::Workspace {
                path: root.to_path_buf(),
                source: e,
            })?;
        debug!("Acquired workspace directory {}", dir.path().display());
        Ok(Self {
            entry: Entry::Directory(dir),
        })
    }

    /// Create a file under `root` holding `contents`, named with the given
    /// extension.
    ///
    /// The handle is closed on return so another process can open the file.
    pub async fn file(root: &Path, extension: &str, contents: &[u8]) -> Result<Self, Pdf2xError> {
        ensure_root(root).await?;
        let mut file = Builder::new()
            .prefix(&unique_stem())
            .suffix(&format!(".{extension}"))
            .rand_bytes(0)
            .tempfile_in(root)
            .map_err(|e| Pdf2xError::Workspace {
                path: root.to_path_buf(),
                source: e,
            })?;
        file.write_all(contents)
            .map_err(|e| Pdf2xError::WriteInput {
                path: file.path().to_path_buf(),
                source: e,
            })?;
        let path = file.into_temp_path();
        debug!("Staged {} bytes at {}", contents.len(), path.display());
        Ok(Self {
            entry: Entry::File(path),
        })
    }

    pub fn path(&self) -> &Path {
        match &self.entry {
            Entry::Directory(dir) => dir.path(),
            Entry::File(path) => &**path,
        }
    }

    /// Remove the workspace. Never fails; problems are logged.
    pub async fn release(self) {
        let (path, result): (PathBuf, std::io::Result<()>) = match self.entry {
            Entry::Directory(dir) => {
                let path = dir.keep();
                let result = tokio::fs::remove_dir_all(&path).await;
                (path, result)
            }
            Entry::File(file) => match file.keep() {
                Ok(path) => {
                    let result = tokio::fs::remove_file(&path).await;
                    (path, result)
                }
                // The guard inside the error still removes the file on drop.
                Err(e) => (e.path.to_path_buf(), Err(e.error)),
            },
        };
        match result {
            Ok(()) => debug!("Released workspace {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove workspace {}: {}", path.display(), e),
        }
    }
}

async fn ensure_root(root: &Path) -> Result<(), Pdf2xError> {
    tokio::fs::create_dir_all(root)
        .await
        .map_err(|e| Pdf2xError::Workspace {
            path: root.to_path_buf(),
            source: e,
        })
}

fn unique_stem() -> String {
    let id = uuid::Uuid::new_v4();
    let secs = chrono::Utc::now().timestamp();
    format!("{id}-{secs}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_name(ws: &Workspace) -> String {
        ws.path().file_name().unwrap().to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn names_are_unique_and_timestamped() {
        let root = tempfile::tempdir().unwrap();
        let a = Workspace::file(root.path(), "pdf", b"").await.unwrap();
        let b = Workspace::file(root.path(), "pdf", b"").await.unwrap();
        let (a, b) = (file_name(&a), file_name(&b));
        assert_ne!(a, b);
        assert!(a.ends_with(".pdf"));
        let secs = a.trim_end_matches(".pdf").rsplit('-').next().unwrap();
        assert!(secs.parse::<i64>().is_ok(), "got: {a}");
    }

    #[tokio::test]
    async fn directory_is_created_and_released() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        let ws = Workspace::directory(&nested).await.unwrap();
        let path = ws.path().to_path_buf();
        assert!(path.is_dir());
        assert!(path.starts_with(&nested));
        std::fs::write(path.join("page.png"), b"x").unwrap();
        ws.release().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn file_holds_contents_until_released() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::file(root.path(), "pdf", b"%PDF-1.4").await.unwrap();
        let path = ws.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
        ws.release().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn release_tolerates_already_removed_file() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::file(root.path(), "pdf", b"x").await.unwrap();
        let path = ws.path().to_path_buf();
        std::fs::remove_file(&path).unwrap();
        ws.release().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn drop_removes_unreleased_workspaces() {
        let root = tempfile::tempdir().unwrap();
        let (dir, file) = {
            let dir = Workspace::directory(root.path()).await.unwrap();
            std::fs::write(dir.path().join("page.html"), b"<p>").unwrap();
            let file = Workspace::file(root.path(), "pdf", b"%PDF").await.unwrap();
            (dir.path().to_path_buf(), file.path().to_path_buf())
        };
        assert!(!dir.exists());
        assert!(!file.exists());
    }
}
