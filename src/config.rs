use std::path::PathBuf;
use std::time::Duration;

/// Immutable service configuration, resolved from the environment once at
/// startup and shared by every request handler. Nothing here is mutated
/// after construction, so handlers share it without locking.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret expected in `Authorization: Bearer <token>`.
    pub api_key: String,
    /// Upper bound on request content, measured in encoded UTF-8 bytes.
    pub max_content_size_bytes: usize,
    /// Ordered list of origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Style reference passed to the converter when the file exists.
    /// Existence is checked at call time, not here.
    pub reference_docx_path: PathBuf,
    /// Wall-clock bound on a single converter invocation.
    pub conversion_timeout: Duration,
    /// Converter binary to invoke.
    pub pandoc_bin: PathBuf,
}

const DEFAULT_ALLOWED_ORIGINS: &str =
    "http://localhost:3000,http://localhost:3001,http://localhost:3002,http://localhost:3003";

impl Config {
    /// Build the configuration from environment variables, applying the
    /// documented defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let api_key = std::env::var("EXPORT_SERVICE_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "dev-secret-key-12345".into());

        let max_content_size_mb = std::env::var("MAX_CONTENT_SIZE_MB")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(5);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_origins(&v))
            .unwrap_or_else(|| parse_origins(DEFAULT_ALLOWED_ORIGINS));

        let conversion_timeout_seconds = std::env::var("CONVERSION_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(30);

        let reference_docx_path = std::env::var("REFERENCE_DOCX_PATH")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("templates/reference.docx"));

        let pandoc_bin = std::env::var("PANDOC_BIN")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("pandoc"));

        Self {
            api_key,
            max_content_size_bytes: max_content_size_mb * 1024 * 1024,
            allowed_origins,
            reference_docx_path,
            conversion_timeout: Duration::from_secs(conversion_timeout_seconds),
            pandoc_bin,
        }
    }
}

/// Split a comma-separated origin list, preserving order and dropping empty
/// entries.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_split_in_order() {
        let origins = parse_origins("https://a.example, https://b.example ,https://c.example");
        assert_eq!(
            origins,
            vec![
                "https://a.example".to_string(),
                "https://b.example".to_string(),
                "https://c.example".to_string(),
            ]
        );
    }

    #[test]
    fn origins_drop_empty_entries() {
        let origins = parse_origins("https://a.example,, ,https://b.example");
        assert_eq!(origins.len(), 2);
    }
}
