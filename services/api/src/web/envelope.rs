//! services/api/src/web/envelope.rs
//!
//! The JSON envelope every data endpoint responds with:
//! `{"success": true, "data": ...}` on success and
//! `{"success": false, "error": {"code", "message"}}` on failure.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use cardex_core::ports::PortError;

/// The error half of the envelope, paired with its HTTP status.
pub type ApiFailure = (StatusCode, Json<Value>);

pub fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

pub fn failure(status: StatusCode, code: &str, message: impl Into<String>) -> ApiFailure {
    (
        status,
        Json(json!({
            "success": false,
            "error": { "code": code, "message": message.into() }
        })),
    )
}

/// Maps a port error onto the envelope. Unexpected errors are logged in
/// full but surface to the client as a generic message.
pub fn from_port_error(err: PortError) -> ApiFailure {
    match err {
        PortError::NotFound(m) => failure(StatusCode::NOT_FOUND, "NOT_FOUND", m),
        PortError::Validation(m) => failure(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", m),
        PortError::Conflict(m) => failure(StatusCode::CONFLICT, "CONFLICT", m),
        PortError::Unauthorized => {
            failure(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unauthorized")
        }
        PortError::Unexpected(m) => {
            error!("Unexpected port error: {}", m);
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Something went wrong",
            )
        }
    }
}
