use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use earnings_core::error::EarningsError;

// ---------------------------------------------------------------------------
// Internal sentinels for explicit statuses
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 400 through the `anyhow::Error` chain for
/// request problems that are not domain errors (e.g. a missing body).
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }

    pub fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<BadRequestError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        if self.0.downcast_ref::<NotFoundError>().is_some() {
            return StatusCode::NOT_FOUND;
        }
        match self.0.downcast_ref::<EarningsError>() {
            Some(e) => status_for(e),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn status_for(e: &EarningsError) -> StatusCode {
    match e {
        EarningsError::InvalidTicker(_)
        | EarningsError::InvalidUrl(_)
        | EarningsError::InvalidBaselineKind(_) => StatusCode::BAD_REQUEST,
        EarningsError::NoRawData(_)
        | EarningsError::NoHtmlFiles(_)
        | EarningsError::BaselineNotFound { .. } => StatusCode::NOT_FOUND,
        EarningsError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        EarningsError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        EarningsError::MissingHeadline => StatusCode::UNPROCESSABLE_ENTITY,
        EarningsError::UpstreamStatus { .. } | EarningsError::Request(_) => {
            StatusCode::BAD_GATEWAY
        }
        EarningsError::Io(_) | EarningsError::Yaml(_) | EarningsError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), %status, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
