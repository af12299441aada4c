//! services/api/src/web/templates.rs
//!
//! Read-only access to the canned message template catalog.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::IntoParams;

use cardex_core::domain::CommunicationKind;
use cardex_core::template::{templates_by_kind, MESSAGE_TEMPLATES};

use crate::web::envelope::{failure, ok, ApiFailure};
use crate::web::state::AppState;

#[derive(Deserialize, IntoParams)]
pub struct TemplateQuery {
    /// Restrict to one channel (SMS or EMAIL).
    pub kind: Option<String>,
}

/// GET /templates - The template catalog, optionally filtered by channel
#[utoipa::path(
    get,
    path = "/templates",
    params(TemplateQuery),
    responses(
        (status = 200, description = "The available templates"),
        (status = 400, description = "Unknown kind value"),
    )
)]
pub async fn list_templates_handler(
    State(_state): State<Arc<AppState>>,
    Query(query): Query<TemplateQuery>,
) -> Result<impl IntoResponse, ApiFailure> {
    let templates = match query.kind.as_deref() {
        Some(raw) => {
            let kind = CommunicationKind::parse(raw).ok_or_else(|| {
                failure(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("Unknown kind: {}", raw),
                )
            })?;
            templates_by_kind(kind)
        }
        None => MESSAGE_TEMPLATES.iter().collect(),
    };

    Ok(ok(json!({ "templates": templates })))
}
