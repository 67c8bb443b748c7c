use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::warn;
use serde_json::json;
use thiserror::Error;

/// Request-level failures. These never become 4xx/5xx: the site's front end
/// expects a JSON body it can show, so every variant renders as a `200` with
/// `status: "error"`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        warn!("{self}");
        let body = json!({ "status": "error", "message": self.to_string() });
        (StatusCode::OK, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_as_ok() {
        let resp = AppError::MalformedPayload("missing field".into()).into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = AppError::InternalError("handler panicked".into()).into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
