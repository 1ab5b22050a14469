#![forbid(unsafe_code)]
#![doc = r#"
md2docx

Convert Markdown content to DOCX documents over HTTP by orchestrating a
Pandoc subprocess.

Crate highlights
- Library: direct conversion via `markdown_to_docx(&Config, &str)`.
- HTTP server (in `server`): `/health` and `/api/v1/convert/docx` with bearer
  authentication, CORS, and structured request logging.
- Safety envelope: input size limits, markup sanitization, timeout-bounded
  converter invocation, guaranteed temporary-file cleanup.

Modules
- `config`: Environment-sourced immutable service configuration.
- `auth`: Bearer credential verification (timing-safe comparison).
- `models`: Request/response payloads and input validation.
- `convert`: Pandoc invocation, output read-back, version probe.
- `error`: External error taxonomy and HTTP mapping.
- `server`: Axum router, handlers, middleware.
- `util`: Shared helpers (tracing, env).

Note: the converter is treated as a black box; this crate never implements
document layout or styling itself.
"#]

pub mod auth;
pub mod config;
pub mod convert;
pub mod error;
pub mod models;
pub mod server;
pub mod util;

// Re-export the primary conversion entry points for ergonomic library use.
pub use crate::convert::{markdown_to_docx, pandoc_version, ConvertError};

pub use crate::config::Config;
pub use crate::error::ApiError;
pub use crate::server::build_router;

// Re-export request/response models for downstream users.
pub use crate::models::{ConvertRequest, HealthResponse};
