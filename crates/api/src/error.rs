use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use passgate_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses:
///
/// ```text
/// { "error": "<message>", "code": "<STABLE_CODE>", "data": [{ "field", "message" }]? }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `passgate_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The request body could not be parsed.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// HTTP status for each domain error.
pub fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        CoreError::DuplicateUsername => StatusCode::CONFLICT,
        CoreError::InvalidCredentials
        | CoreError::InvalidToken(_)
        | CoreError::TokenExpired
        | CoreError::WrongTokenType { .. } => StatusCode::UNAUTHORIZED,
        CoreError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Core(core) => {
                let status = status_for(core);
                let message = match core {
                    CoreError::InvalidCredentials => "Invalid username or password".to_string(),
                    CoreError::StoreUnavailable(detail) => {
                        tracing::warn!(error = %detail, "Credential store unavailable");
                        "Service temporarily unavailable, retry later".to_string()
                    }
                    CoreError::Internal(detail) => {
                        tracing::error!(error = %detail, "Internal error");
                        "An internal error occurred".to_string()
                    }
                    CoreError::InvalidInput { message, .. } => message.clone(),
                    other => other.to_string(),
                };

                let mut body = json!({
                    "error": message,
                    "code": core.code(),
                });
                if let CoreError::InvalidInput { fields, .. } = core {
                    if !fields.is_empty() {
                        body["data"] = json!(fields);
                    }
                }
                (status, body)
            }

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": msg,
                    "code": "INVALID_INPUT",
                }),
            ),
        };

        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        }
        response
    }
}
