use std::io;
use std::path::Path;
use std::process::Stdio;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::Config;

/// Failure causes of a single converter invocation. Mapped onto the
/// external taxonomy in `error.rs`.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Empty content provided")]
    EmptyContent,
    #[error("Content too large: {actual} bytes (max: {limit} bytes)")]
    TooLarge { actual: usize, limit: usize },
    #[error("converter I/O error: {0}")]
    Io(io::Error),
    #[error("pandoc unavailable: {0}")]
    NotFound(io::Error),
    #[error("pandoc invocation failed (exit {exit_code:?}): {stderr}")]
    Cli {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("conversion timed out after {secs}s")]
    Timeout { secs: u64 },
    #[error("failed to read converted document: {0}")]
    Read(io::Error),
    #[error("converter produced empty output")]
    EmptyOutput,
}

/// Escape literal `<script` / `</script>` markup so embedded HTML cannot
/// smuggle script tags through the converter. All other Markdown is left
/// untouched.
fn sanitize_markup(content: &str) -> String {
    content
        .replace("<script", "&lt;script")
        .replace("</script>", "&lt;/script&gt;")
}

/// Convert Markdown content to DOCX bytes via the configured Pandoc binary.
///
/// Input is re-validated here so the function is safe to call outside the
/// HTTP layer. The converter writes into a uniquely named temporary file
/// which is removed on every exit path (success, converter failure,
/// timeout, or cancellation) before control returns to the caller. Every
/// call performs a full, independent conversion; nothing is cached.
pub async fn markdown_to_docx(config: &Config, content: &str) -> Result<Vec<u8>, ConvertError> {
    if content.trim().is_empty() {
        return Err(ConvertError::EmptyContent);
    }
    let actual = content.len();
    if actual > config.max_content_size_bytes {
        return Err(ConvertError::TooLarge {
            actual,
            limit: config.max_content_size_bytes,
        });
    }

    let sanitized = sanitize_markup(content);

    // The NamedTempFile guard owns cleanup: dropping it removes the file,
    // including on panics and cancelled futures.
    let output_file = tempfile::Builder::new()
        .prefix("md2docx-")
        .suffix(".docx")
        .tempfile()
        .map_err(ConvertError::Io)?;
    let output_path = output_file.path().to_path_buf();

    debug!(
        content_size_bytes = actual,
        output_path = %output_path.display(),
        "starting conversion"
    );

    let result = run_pandoc(config, &sanitized, &output_path).await;

    let bytes = match result {
        Ok(()) => tokio::fs::read(&output_path).await.map_err(ConvertError::Read),
        Err(err) => Err(err),
    };

    // Removal failures are logged, never propagated.
    if let Err(err) = output_file.close() {
        warn!(error = %err, "failed to remove temporary output file");
    }

    let bytes = bytes?;
    if bytes.is_empty() {
        return Err(ConvertError::EmptyOutput);
    }
    Ok(bytes)
}

/// Spawn Pandoc with the sanitized content on stdin, bounded by the
/// configured timeout. `kill_on_drop` terminates the child if the wait is
/// abandoned, whether by timeout or by the caller being cancelled.
async fn run_pandoc(
    config: &Config,
    content: &str,
    output_path: &Path,
) -> Result<(), ConvertError> {
    let mut cmd = Command::new(&config.pandoc_bin);
    cmd.arg("--from")
        .arg("markdown")
        .arg("--to")
        .arg("docx")
        .arg("--output")
        .arg(output_path)
        .arg("--quiet")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Existence is checked per call: the template may appear or disappear
    // while the service is running, and its absence is not an error.
    if config.reference_docx_path.exists() {
        cmd.arg("--reference-doc").arg(&config.reference_docx_path);
        debug!(
            reference_doc = %config.reference_docx_path.display(),
            "using reference document"
        );
    }

    let mut child = cmd.spawn().map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            ConvertError::NotFound(err)
        } else {
            ConvertError::Io(err)
        }
    })?;

    let stdin = child.stdin.take();
    let wait = async move {
        if let Some(mut stdin) = stdin {
            // A converter that fails fast may close stdin before reading all
            // input; the exit status and stderr are what matter then.
            match stdin.write_all(content.as_bytes()).await {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
                Err(err) => return Err(err),
            }
            drop(stdin);
        }
        child.wait_with_output().await
    };

    let output = match tokio::time::timeout(config.conversion_timeout, wait).await {
        Ok(res) => res.map_err(ConvertError::Io)?,
        Err(_) => {
            return Err(ConvertError::Timeout {
                secs: config.conversion_timeout.as_secs(),
            })
        }
    };

    if !output.status.success() {
        return Err(ConvertError::Cli {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(())
}

/// Probe the converter by asking for its version string. Used by the health
/// endpoint and the startup log; failures indicate the service cannot
/// convert anything.
pub async fn pandoc_version(config: &Config) -> Result<String, ConvertError> {
    let mut cmd = Command::new(&config.pandoc_bin);
    cmd.arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(config.conversion_timeout, cmd.output()).await {
        Ok(res) => res.map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                ConvertError::NotFound(err)
            } else {
                ConvertError::Io(err)
            }
        })?,
        Err(_) => {
            return Err(ConvertError::Timeout {
                secs: config.conversion_timeout.as_secs(),
            })
        }
    };

    if !output.status.success() {
        return Err(ConvertError::Cli {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    // First line is "pandoc X.Y.Z"; report just the version number.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next().unwrap_or("").trim();
    let version = first
        .strip_prefix("pandoc")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(first);
    Ok(version.to_string())
}
