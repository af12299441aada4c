//! services/api/src/web/vcard.rs
//!
//! vCard download endpoints: the default owner card, per-user cards by
//! slug, and cards generated from stored contacts.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use cardex_core::domain::{User, VCard};
use cardex_core::ports::PortError;
use cardex_core::vcard::{encode, vcard_filename};

use crate::config::OwnerProfile;
use crate::web::state::AppState;

fn card_from_owner(owner: &OwnerProfile) -> VCard {
    VCard {
        name: owner.name.clone(),
        email: Some(owner.email.clone()),
        phone: Some(owner.phone.clone()),
        company: Some(owner.company.clone()),
        title: Some(owner.title.clone()),
        linkedin: Some(owner.linkedin.clone()),
    }
}

fn card_from_user(user: &User) -> VCard {
    VCard {
        name: user.name.clone(),
        email: Some(user.email.clone()),
        phone: user.phone.clone(),
        company: user.company.clone(),
        title: user.title.clone(),
        linkedin: user.linkedin.clone(),
    }
}

/// Reads photo bytes for a card. Any failure downgrades to a card without
/// a PHOTO property rather than failing the download.
async fn load_photo(state: &AppState, photo_url: Option<&str>) -> Option<Vec<u8>> {
    let path = photo_url?;
    match state.files.read(path).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("Omitting vCard photo {}: {}", path, e);
            None
        }
    }
}

/// Builds the text/vcard download response.
fn vcard_response(card: &VCard, photo: Option<&[u8]>) -> impl IntoResponse {
    let body = encode(card, photo);
    let disposition = format!("attachment; filename=\"{}\"", vcard_filename(&card.name));
    (
        [
            (header::CONTENT_TYPE, "text/vcard".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /vcard - The default owner's card (legacy single-tenant page)
#[utoipa::path(
    get,
    path = "/vcard",
    responses(
        (status = 200, description = "The owner's vCard", content_type = "text/vcard"),
    )
)]
pub async fn owner_vcard_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let card = card_from_owner(&state.config.owner);
    vcard_response(&card, None)
}

/// GET /u/{slug}/vcard - A user's card by profile slug
#[utoipa::path(
    get,
    path = "/u/{slug}/vcard",
    params(("slug" = String, Path, description = "The profile slug")),
    responses(
        (status = 200, description = "The user's vCard", content_type = "text/vcard"),
        (status = 404, description = "No active profile with this slug")
    )
)]
pub async fn user_vcard_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = state.users.get_user_by_slug(&slug).await.map_err(|e| match e {
        PortError::NotFound(m) => (StatusCode::NOT_FOUND, m),
        other => {
            error!("Failed to load user for vCard: {:?}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load vCard".to_string(),
            )
        }
    })?;
    if !user.active {
        return Err((StatusCode::NOT_FOUND, "Profile not found".to_string()));
    }

    let card = card_from_user(&user);
    let photo = load_photo(&state, user.photo_url.as_deref()).await;
    Ok(vcard_response(&card, photo.as_deref()))
}

/// GET /contacts/{id}/vcard - A card generated from a stored contact
#[utoipa::path(
    get,
    path = "/contacts/{id}/vcard",
    params(("id" = Uuid, Path, description = "The contact id")),
    responses(
        (status = 200, description = "The contact's vCard", content_type = "text/vcard"),
        (status = 404, description = "Contact not found")
    )
)]
pub async fn contact_vcard_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let contact = state.contacts.get(id).await.map_err(|e| match e {
        PortError::NotFound(m) => (StatusCode::NOT_FOUND, m),
        other => {
            error!("Failed to load contact for vCard: {:?}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load vCard".to_string(),
            )
        }
    })?;

    let card = VCard {
        name: contact.name.clone(),
        email: Some(contact.email.clone()),
        phone: contact.phone.clone(),
        company: contact.company.clone(),
        title: contact.title.clone(),
        linkedin: contact.linkedin.clone(),
    };
    let photo = load_photo(&state, contact.photo_url.as_deref()).await;
    Ok(vcard_response(&card, photo.as_deref()))
}
