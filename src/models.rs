use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ApiError;

/// Accepted output filenames: letters, digits, spaces, `_`, `.`, `-`, and a
/// mandatory `.docx` extension. Path separators and quotes are excluded, so
/// an accepted name is safe both on disk and inside a
/// `Content-Disposition` header.
static FILENAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9 _.\-]+\.docx$").unwrap());

fn default_filename() -> String {
    "export.docx".into()
}

/// Body of `POST /api/v1/convert/docx`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertRequest {
    /// Markdown content to convert.
    pub content: String,
    /// Output filename reported to the client. Defaults to `export.docx`.
    #[serde(default = "default_filename")]
    pub filename: String,
}

impl ConvertRequest {
    /// Enforce the request contract before any domain logic runs: non-empty
    /// content, content within the configured byte limit, filename matching
    /// the accepted pattern. A filename that fails the pattern is a client
    /// error, never silently substituted.
    pub fn validate(&self, config: &Config) -> Result<(), ApiError> {
        if self.content.trim().is_empty() {
            return Err(ApiError::BadInput("Empty content provided".into()));
        }

        // Encoded byte length, not code points.
        let actual = self.content.len();
        if actual > config.max_content_size_bytes {
            return Err(ApiError::BadInput(format!(
                "Content too large: {actual} bytes (max: {} bytes)",
                config.max_content_size_bytes
            )));
        }

        if !FILENAME_PATTERN.is_match(&self.filename) {
            return Err(ApiError::BadInput(format!(
                "Invalid filename: {:?} (expected a name matching [A-Za-z0-9 _.-]+.docx)",
                self.filename
            )));
        }

        Ok(())
    }
}

/// Body of a successful `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}
