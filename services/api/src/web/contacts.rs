//! services/api/src/web/contacts.rs
//!
//! The public submission endpoints and the admin contact management API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use cardex_core::domain::{ContactPatch, ContactStatus};
use cardex_core::ports::{ContactFilter, ContactOrder};
use cardex_core::validate::SubmissionInput;

use crate::web::envelope::{failure, from_port_error, ok, ApiFailure};
use crate::web::state::AppState;

//=========================================================================================
// Request Types
//=========================================================================================

/// The public submission body. Mirrors the card page form.
#[derive(Deserialize, ToSchema)]
pub struct SubmitContactRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "photoUrl")]
    pub photo_url: Option<String>,
    pub conference: Option<String>,
}

impl SubmitContactRequest {
    fn into_input(self) -> SubmissionInput {
        SubmissionInput {
            name: self.name,
            email: self.email,
            phone: self.phone,
            linkedin: self.linkedin,
            company: self.company,
            title: self.title,
            photo_url: self.photo_url,
            conference: self.conference,
        }
    }
}

/// A partial admin update; absent fields are left untouched.
#[derive(Deserialize, ToSchema)]
pub struct UpdateContactRequest {
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

//=========================================================================================
// Public Submission Handlers
//=========================================================================================

/// POST /contacts/submit - Submit a contact to the default (legacy) card page
#[utoipa::path(
    post,
    path = "/contacts/submit",
    request_body = SubmitContactRequest,
    responses(
        (status = 201, description = "Contact created; notifications dispatched in the background"),
        (status = 400, description = "Validation failure"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitContactRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let contact_id = state
        .pipeline
        .submit(None, req.into_input())
        .await
        .map_err(from_port_error)?;

    Ok((StatusCode::CREATED, ok(json!({ "contactId": contact_id }))))
}

/// POST /u/{slug}/submit - Submit a contact to a specific user's card page
#[utoipa::path(
    post,
    path = "/u/{slug}/submit",
    params(("slug" = String, Path, description = "The profile slug")),
    request_body = SubmitContactRequest,
    responses(
        (status = 201, description = "Contact created; notifications dispatched in the background"),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "No active profile with this slug"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn submit_for_slug_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(req): Json<SubmitContactRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let owner = state
        .users
        .get_user_by_slug(&slug)
        .await
        .map_err(from_port_error)?;
    if !owner.active {
        return Err(failure(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Profile not found",
        ));
    }

    let contact_id = state
        .pipeline
        .submit(Some(&owner), req.into_input())
        .await
        .map_err(from_port_error)?;

    Ok((StatusCode::CREATED, ok(json!({ "contactId": contact_id }))))
}

//=========================================================================================
// Admin Contact Management Handlers
//=========================================================================================

/// GET /contacts - List all contacts, newest first
#[utoipa::path(
    get,
    path = "/contacts",
    responses(
        (status = 200, description = "All contacts, newest first"),
        (status = 401, description = "Missing or wrong admin credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_contacts_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiFailure> {
    let contacts = state
        .contacts
        .list(ContactFilter::default(), ContactOrder::SubmittedDesc)
        .await
        .map_err(from_port_error)?;

    Ok(ok(json!({ "contacts": contacts })))
}

/// GET /contacts/{id} - One contact with its communication history
#[utoipa::path(
    get,
    path = "/contacts/{id}",
    params(("id" = Uuid, Path, description = "The contact id")),
    responses(
        (status = 200, description = "The contact and its communications"),
        (status = 404, description = "Contact not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_contact_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiFailure> {
    let contact = state.contacts.get(id).await.map_err(from_port_error)?;
    let communications = state
        .contacts
        .list_communications(id)
        .await
        .map_err(from_port_error)?;

    Ok(ok(json!({
        "contact": contact,
        "communications": communications,
    })))
}

/// PATCH /contacts/{id} - Update status, priority or notes
#[utoipa::path(
    patch,
    path = "/contacts/{id}",
    params(("id" = Uuid, Path, description = "The contact id")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "The updated contact"),
        (status = 400, description = "Unknown status value"),
        (status = 404, description = "Contact not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_contact_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateContactRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let status = match req.status.as_deref() {
        Some(s) => Some(ContactStatus::parse(s).ok_or_else(|| {
            failure(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Unknown status: {}", s),
            )
        })?),
        None => None,
    };

    let contact = state
        .contacts
        .update(
            id,
            ContactPatch {
                status,
                priority: req.priority,
                notes: req.notes,
            },
        )
        .await
        .map_err(from_port_error)?;

    Ok(ok(json!({ "contact": contact })))
}

/// PATCH /contacts/{id}/status - Update just the lifecycle status
#[utoipa::path(
    patch,
    path = "/contacts/{id}/status",
    params(("id" = Uuid, Path, description = "The contact id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "The updated contact"),
        (status = 400, description = "Unknown status value"),
        (status = 404, description = "Contact not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let status = ContactStatus::parse(&req.status).ok_or_else(|| {
        failure(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Unknown status: {}", req.status),
        )
    })?;

    let contact = state
        .contacts
        .update(
            id,
            ContactPatch {
                status: Some(status),
                ..ContactPatch::default()
            },
        )
        .await
        .map_err(from_port_error)?;

    Ok(ok(json!({ "contact": contact })))
}

/// DELETE /contacts/{id} - Delete a contact and its communications
#[utoipa::path(
    delete,
    path = "/contacts/{id}",
    params(("id" = Uuid, Path, description = "The contact id")),
    responses(
        (status = 200, description = "Contact deleted"),
        (status = 404, description = "Contact not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_contact_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiFailure> {
    state.contacts.delete(id).await.map_err(from_port_error)?;
    Ok(ok(json!({ "deleted": true })))
}

/// GET /contacts/{id}/communications - The message history for a contact
#[utoipa::path(
    get,
    path = "/contacts/{id}/communications",
    params(("id" = Uuid, Path, description = "The contact id")),
    responses(
        (status = 200, description = "Communications, newest first"),
        (status = 404, description = "Contact not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_communications_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiFailure> {
    // Surface a 404 for a missing contact instead of an empty list
    state.contacts.get(id).await.map_err(from_port_error)?;
    let communications = state
        .contacts
        .list_communications(id)
        .await
        .map_err(from_port_error)?;

    Ok(ok(json!({ "communications": communications })))
}

//=========================================================================================
// Owner Dashboard Handler
//=========================================================================================

/// GET /me/contacts - The logged-in user's contacts with summary counts
#[utoipa::path(
    get,
    path = "/me/contacts",
    responses(
        (status = 200, description = "The user's contacts with summary analytics"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn my_contacts_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, ApiFailure> {
    let contacts = state
        .contacts
        .list(
            ContactFilter {
                user_id: Some(user_id),
            },
            ContactOrder::SubmittedDesc,
        )
        .await
        .map_err(from_port_error)?;

    let day_ago = Utc::now() - Duration::hours(24);
    let total = contacts.len();
    let recent = contacts
        .iter()
        .filter(|c| c.submitted_at > day_ago)
        .count();

    Ok(ok(json!({
        "contacts": contacts,
        "analytics": {
            "totalContacts": total,
            "recentContacts": recent,
        }
    })))
}

/// DELETE /me - Delete the logged-in user's account and all of its data
#[utoipa::path(
    delete,
    path = "/me",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, ApiFailure> {
    state
        .users
        .delete_user(user_id)
        .await
        .map_err(from_port_error)?;

    Ok(ok(json!({ "deleted": true })))
}
