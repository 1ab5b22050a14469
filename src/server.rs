use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::verify_bearer;
use crate::config::Config;
use crate::convert::{markdown_to_docx, pandoc_version};
use crate::error::ApiError;
use crate::models::{ConvertRequest, HealthResponse};

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Request-scoped correlation context, inserted by the logging middleware
/// and discarded once the response is written.
#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

/// Build the Axum router with `/health` and `/api/v1/convert/docx`.
pub fn build_router(config: Arc<Config>) -> Router {
    let cors = cors_layer(&config);

    // Panic containment sits inside the logger so an escaped panic is still
    // recorded as a completed 500.
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/convert/docx", post(convert_docx))
        .with_state(config)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
}

/// CORS policy from configuration: GET/POST only, Authorization and
/// Content-Type only, origins as configured, no credentials.
fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

/// Tag every request with a correlation id and emit start/completion records.
/// Health-check traffic is excluded from INFO-level noise.
async fn log_requests(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestContext {
        request_id: request_id.clone(),
    });

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let quiet = path == "/health";

    if !quiet {
        info!(request_id, method = %method, path = %path, "request started");
    }

    let start = Instant::now();
    let response = next.run(request).await;

    if !quiet {
        info!(
            request_id,
            method = %method,
            path = %path,
            duration_ms = start.elapsed().as_millis() as u64,
            status_code = response.status().as_u16(),
            "request completed"
        );
    }

    response
}

/// Reduce an escaped panic to the generic internal-error envelope. The
/// panic detail is logged, never sent to the client.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(error = %detail, "request handler panicked");
    ApiError::Internal.into_response()
}

/// Probe converter availability and report service health. A probe failure
/// becomes a 503, never a propagated error.
async fn health(State(config): State<Arc<Config>>) -> Response {
    match pandoc_version(&config).await {
        Ok(version) => {
            let timestamp = OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default();
            Json(HealthResponse {
                status: "healthy".into(),
                version,
                timestamp,
            })
            .into_response()
        }
        Err(err) => {
            error!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "error": err.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// Convert Markdown content to a DOCX attachment.
///
/// Pipeline: bearer auth, body parse, validation, conversion, response.
/// Each stage returns a typed failure that `ApiError::into_response` turns
/// into the external envelope.
async fn convert_docx(
    State(config): State<Arc<Config>>,
    Extension(ctx): Extension<RequestContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    verify_bearer(authorization, &config.api_key)?;

    let request: ConvertRequest = serde_json::from_slice(&body)
        .map_err(|err| ApiError::BadInput(format!("Invalid request body: {err}")))?;
    request.validate(&config)?;

    let content_size = request.content.len();
    info!(
        request_id = %ctx.request_id,
        content_size_bytes = content_size,
        filename = %request.filename,
        "starting conversion"
    );

    let start = Instant::now();
    let docx = markdown_to_docx(&config, &request.content).await?;

    info!(
        request_id = %ctx.request_id,
        duration_ms = start.elapsed().as_millis() as u64,
        content_size_bytes = content_size,
        output_size_bytes = docx.len(),
        "conversion successful"
    );

    // The filename pattern excludes quotes and control characters, so the
    // header value is always well-formed.
    let disposition = format!("attachment; filename=\"{}\"", request.filename);
    let disposition = HeaderValue::from_str(&disposition).map_err(|_| ApiError::Internal)?;

    let mut response = (StatusCode::OK, docx).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(DOCX_MIME));
    response.headers_mut().insert(CONTENT_DISPOSITION, disposition);
    Ok(response)
}
