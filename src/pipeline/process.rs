//! Process running: spawn one wrapped tool, await its exit, honour cancellation.
//!
//! ## Why capture output?
//!
//! Several conversions may run at once. Inheriting the parent's console would
//! interleave their progress chatter, so stdout and stderr are piped and
//! drained on background tasks (a full pipe would otherwise stall the child).
//! Stderr is kept for diagnostics only.
//!
//! ## Cancellation
//!
//! The token is checked before spawning and raced against the child's exit.
//! If it wins, the child is killed outright (the tools have no graceful
//! shutdown) and reaped before [`Pdf2xError::Cancelled`] is returned, so no
//! process outlives the call. `kill_on_drop` covers the case where the whole
//! future is dropped instead.
//!
//! Draining the pipes after exit is raced against the token as well: a
//! grandchild that inherited them can keep them open past the child's exit.

use crate::config::resolve_against;
use crate::error::Pdf2xError;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// What a finished child left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `-1` when the child was ended by a signal.
    pub code: i32,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
}

/// Run `program` with `args`, inside `working_dir`.
///
/// A relative `program` is resolved against `working_dir`.
pub async fn run(
    program: &Path,
    args: &[OsString],
    working_dir: &Path,
    cancel: &CancellationToken,
) -> Result<ProcessOutput, Pdf2xError> {
    if cancel.is_cancelled() {
        return Err(Pdf2xError::Cancelled);
    }

    let program = resolve_against(working_dir, program);
    debug!("Running {} {:?}", program.display(), args);

    let mut child = Command::new(&program)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Pdf2xError::SpawnFailed {
            tool: program.clone(),
            source: e,
        })?;

    let stdout = tokio::spawn(drain(child.stdout.take()));
    let stderr = tokio::spawn(drain(child.stderr.take()));

    let status = tokio::select! {
        status = child.wait() => Some(status),
        _ = cancel.cancelled() => None,
    };

    let Some(status) = status else {
        info!("Cancelling {} (pid {:?})", program.display(), child.id());
        // Already-exited children make start_kill fail; that is fine.
        let _ = child.start_kill();
        let _ = child.wait().await;
        return Err(Pdf2xError::Cancelled);
    };

    let status = status.map_err(|e| Pdf2xError::Internal(format!("waiting for child: {e}")))?;

    let abort_stdout = stdout.abort_handle();
    let abort_stderr = stderr.abort_handle();
    let (stdout, stderr) = tokio::select! {
        drained = async { tokio::join!(stdout, stderr) } => drained,
        _ = cancel.cancelled() => {
            info!("Cancelled while draining output of {}", program.display());
            abort_stdout.abort();
            abort_stderr.abort();
            return Err(Pdf2xError::Cancelled);
        }
    };
    let stdout = stdout.unwrap_or_default();
    let stderr = stderr.unwrap_or_default();
    if !stdout.is_empty() {
        debug!("{} wrote {} bytes to stdout", program.display(), stdout.len());
    }

    Ok(ProcessOutput {
        code: status.code().unwrap_or(-1),
        stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
    })
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    buf
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn sh() -> &'static Path {
        Path::new("/bin/sh")
    }

    fn script(body: &str) -> Vec<OsString> {
        vec!["-c".into(), body.into()]
    }

    #[tokio::test]
    async fn returns_exit_code_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let out = run(
            sh(),
            &script("echo oops >&2; exit 3"),
            dir.path(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(out.code, 3);
        assert_eq!(out.stderr, "oops");
    }

    #[tokio::test]
    async fn runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = run(
            sh(),
            &script("touch here"),
            dir.path(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(out.code, 0);
        assert!(dir.path().join("here").exists());
    }

    #[tokio::test]
    async fn missing_program_is_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            Path::new("Lib/Xpdf/Linux/x64/pdftotext.linux"),
            &[],
            dir.path(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        match err {
            Pdf2xError::SpawnFailed { tool, .. } => assert!(tool.starts_with(dir.path())),
            other => panic!("expected SpawnFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_before_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let err = run(sh(), &script("touch ran"), dir.path(), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2xError::Cancelled));
        assert!(!dir.path().join("ran").exists());
    }

    #[tokio::test]
    async fn cancellation_kills_running_child() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
            // A second signal must be harmless.
            trigger.cancel();
        });

        let started = Instant::now();
        let err = run(sh(), &script("sleep 30"), dir.path(), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2xError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn arguments_reach_the_child_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = script(r#"printf '%s\n' "$@" >&2"#);
        args.extend(["sh", r#"pa"ss"#, "two words"].map(OsString::from));
        let out = run(sh(), &args, dir.path(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out.stderr, "pa\"ss\ntwo words");
    }

    #[tokio::test]
    async fn cancellation_while_a_grandchild_holds_the_pipes() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = run(sh(), &script("sleep 5 & exit 0"), dir.path(), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2xError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
