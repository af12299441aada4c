//! services/api/src/web/accounts.rs
//!
//! The logged-in owner's profile settings, plus the admin views over all
//! accounts and their contact lists.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use cardex_core::domain::UserPatch;
use cardex_core::ports::{ContactFilter, ContactOrder};

use crate::web::envelope::{failure, from_port_error, ok, ApiFailure};
use crate::web::state::AppState;

//=========================================================================================
// Request Types
//=========================================================================================

/// A partial settings update; absent fields are left untouched.
#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub linkedin: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "photoUrl")]
    pub photo_url: Option<String>,
}

//=========================================================================================
// Owner Settings Handlers
//=========================================================================================

/// GET /me - The logged-in user's own profile
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "The user's profile"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, ApiFailure> {
    let user = state
        .users
        .get_user(user_id)
        .await
        .map_err(from_port_error)?;
    Ok(ok(json!({ "user": user })))
}

/// PATCH /me - Update the logged-in user's profile settings
#[utoipa::path(
    patch,
    path = "/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "The updated profile"),
        (status = 400, description = "Empty name"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let name = match req.name {
        Some(name) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(failure(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "Name cannot be empty",
                ));
            }
            Some(name)
        }
        None => None,
    };

    let user = state
        .users
        .update_user(
            user_id,
            UserPatch {
                name,
                phone: req.phone,
                company: req.company,
                title: req.title,
                linkedin: req.linkedin,
                bio: req.bio,
                photo_url: req.photo_url,
            },
        )
        .await
        .map_err(from_port_error)?;

    Ok(ok(json!({ "user": user })))
}

//=========================================================================================
// Admin Account Handlers
//=========================================================================================

/// GET /users - All accounts, newest first
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All accounts"),
        (status = 401, description = "Missing or wrong admin credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiFailure> {
    let users = state.users.list_users().await.map_err(from_port_error)?;
    Ok(ok(json!({ "users": users })))
}

/// GET /users/{id}/contacts - One account's contacts, newest first
#[utoipa::path(
    get,
    path = "/users/{id}/contacts",
    params(("id" = Uuid, Path, description = "The account id")),
    responses(
        (status = 200, description = "The account and its contacts"),
        (status = 404, description = "Account not found"),
        (status = 401, description = "Missing or wrong admin credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn user_contacts_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiFailure> {
    let user = state.users.get_user(id).await.map_err(from_port_error)?;
    let contacts = state
        .contacts
        .list(
            ContactFilter { user_id: Some(id) },
            ContactOrder::SubmittedDesc,
        )
        .await
        .map_err(from_port_error)?;

    Ok(ok(json!({ "user": user, "contacts": contacts })))
}
