use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::convert::ConvertError;

/// External error taxonomy surfaced to clients.
///
/// Every failure in the pipeline is reduced to one of these kinds; the
/// `IntoResponse` impl below is the single place where results become HTTP
/// responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, or incorrect credential.
    #[error("{0}")]
    Unauthorized(String),

    /// Empty or oversized content, schema-invalid filename, malformed JSON.
    #[error("{0}")]
    BadInput(String),

    /// Converter nonzero exit, timeout, or unreadable/empty output.
    #[error("{0}")]
    Conversion(String),

    /// Anything unclassified. The client-facing message is generic; the
    /// real cause is logged where it happened.
    #[error("internal server error")]
    Internal,
}

/// JSON body for every failure response: `{error, details?}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Conversion(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Unauthorized(msg) => ErrorBody {
                error: msg.clone(),
                details: None,
            },
            ApiError::BadInput(msg) => ErrorBody {
                error: "Invalid request".into(),
                details: Some(msg.clone()),
            },
            ApiError::Conversion(msg) => ErrorBody {
                error: "Conversion failed".into(),
                details: Some(msg.clone()),
            },
            ApiError::Internal => ErrorBody {
                error: "Internal server error".into(),
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Classify orchestrator failures into the external taxonomy. Input-shaped
/// causes are client errors; everything else is a conversion failure whose
/// diagnostic is preserved for operators.
impl From<ConvertError> for ApiError {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::EmptyContent | ConvertError::TooLarge { .. } => {
                ApiError::BadInput(err.to_string())
            }
            other => ApiError::Conversion(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Unauthorized("missing".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::BadInput("empty".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conversion("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn input_causes_classify_as_bad_input() {
        let err: ApiError = ConvertError::EmptyContent.into();
        assert!(matches!(err, ApiError::BadInput(_)));

        let err: ApiError = ConvertError::TooLarge {
            actual: 10,
            limit: 5,
        }
        .into();
        match err {
            ApiError::BadInput(msg) => {
                assert!(msg.contains("10"), "actual bytes missing: {msg}");
                assert!(msg.contains("5"), "limit bytes missing: {msg}");
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn converter_causes_classify_as_conversion() {
        let err: ApiError = ConvertError::Cli {
            exit_code: Some(64),
            stderr: "pandoc: unknown option".into(),
        }
        .into();
        match err {
            ApiError::Conversion(msg) => assert!(msg.contains("unknown option")),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn internal_body_is_generic() {
        let body = ApiError::Internal.body();
        assert_eq!(body.error, "Internal server error");
        assert!(body.details.is_none());
    }
}
