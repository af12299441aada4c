//! services/api/src/web/upload.rs
//!
//! Photo upload for the public submission form. The stored path is later
//! carried on the contact as its `photoUrl` and embedded in vCards.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use cardex_core::ports::PortError;

use crate::web::envelope::{failure, ok, ApiFailure};
use crate::web::state::AppState;

const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

fn content_type_for(path: &str) -> &'static str {
    let extension = path.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// POST /upload/photo - Store a selfie and return its path
#[utoipa::path(
    post,
    path = "/upload/photo",
    request_body(content_type = "multipart/form-data", description = "A single image part."),
    responses(
        (status = 201, description = "Photo stored; response carries its path"),
        (status = 400, description = "Missing part, unsupported type, or too large"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_photo_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiFailure> {
    let Some(field) = multipart.next_field().await.map_err(|e| {
        failure(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Failed to read multipart data: {}", e),
        )
    })?
    else {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Multipart form must include an image",
        ));
    };

    let content_type = field.content_type().unwrap_or("").to_string();
    let Some(extension) = extension_for(&content_type) else {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Unsupported image type: {}", content_type),
        ));
    };

    let data = field.bytes().await.map_err(|e| {
        failure(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Failed to read image bytes: {}", e),
        )
    })?;
    if data.len() > MAX_PHOTO_BYTES {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Image exceeds the 5MB limit",
        ));
    }
    if data.is_empty() {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Uploaded image is empty",
        ));
    }

    let path = format!("contacts/{}.{}", Uuid::new_v4(), extension);
    state.files.write(&path, &data).await.map_err(|e| {
        error!("Failed to store photo: {}", e);
        failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Failed to store photo",
        )
    })?;

    Ok((StatusCode::CREATED, ok(json!({ "path": path }))))
}

/// GET /uploads/{*path} - Serve a stored upload (photos, the welcome PDF)
///
/// The card page embeds stored `photoUrl` paths through this route.
#[utoipa::path(
    get,
    path = "/uploads/{path}",
    params(("path" = String, Path, description = "Path of the stored file")),
    responses(
        (status = 200, description = "The file contents"),
        (status = 400, description = "Malformed path"),
        (status = 404, description = "No such file")
    )
)]
pub async fn serve_upload_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let bytes = state.files.read(&path).await.map_err(|e| match e {
        PortError::NotFound(m) => (StatusCode::NOT_FOUND, m),
        PortError::Validation(m) => (StatusCode::BAD_REQUEST, m),
        other => {
            error!("Failed to serve upload {}: {}", path, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read file".to_string(),
            )
        }
    })?;

    Ok((
        [(header::CONTENT_TYPE, content_type_for(&path))],
        bytes,
    ))
}
