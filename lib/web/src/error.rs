use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rdf_sink_core::SourceError;

#[derive(Debug, thiserror::Error)]
pub enum SinkServerError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("upstream failure: {0}")]
    Upstream(String),
    #[error("internal server error: {0}")]
    Internal(anyhow::Error),
}

impl From<SourceError> for SinkServerError {
    fn from(error: SourceError) -> Self {
        Self::Upstream(error.to_string())
    }
}

impl IntoResponse for SinkServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SinkServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            SinkServerError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            SinkServerError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        (status, message).into_response()
    }
}
