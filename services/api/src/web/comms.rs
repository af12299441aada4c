//! services/api/src/web/comms.rs
//!
//! Admin endpoints for sending manual follow-up SMS and email to a contact.
//! Each successful send is recorded against the contact's history and
//! refreshes its last-contact timestamp.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use cardex_core::domain::{
    CommunicationKind, Contact, Direction, MessageTemplate, NewCommunication,
};
use cardex_core::template::{fill, template_by_id};

use crate::pipeline::template_variables;
use crate::web::envelope::{failure, from_port_error, ok, ApiFailure};
use crate::web::state::AppState;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SendMessageRequest {
    #[serde(rename = "contactId")]
    pub contact_id: Uuid,
    /// Free-form body; ignored when `templateId` is given.
    pub message: Option<String>,
    /// Email subject; ignored when `templateId` is given.
    pub subject: Option<String>,
    #[serde(rename = "templateId")]
    pub template_id: Option<String>,
}

//=========================================================================================
// Shared Helpers
//=========================================================================================

/// Resolves the message body (and subject) from either the explicit fields
/// or a filled template.
fn resolve_content(
    state: &AppState,
    contact: &Contact,
    req: &SendMessageRequest,
) -> Result<(String, Option<String>), ApiFailure> {
    if let Some(template_id) = req.template_id.as_deref() {
        let template: &MessageTemplate = template_by_id(template_id).ok_or_else(|| {
            failure(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Unknown template: {}", template_id),
            )
        })?;

        let owner = &state.config.owner;
        let vars = template_variables(&contact.name, &owner.name, owner);
        let body = fill(template.body, &vars);
        let subject = template.subject.map(|s| fill(s, &vars));
        return Ok((body, subject));
    }

    let body = req
        .message
        .clone()
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| {
            failure(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Either message or templateId is required",
            )
        })?;
    Ok((body, req.subject.clone()))
}

/// Records the sent message and advances the contact's follow-up state.
/// Bookkeeping failures are logged, not surfaced: the message already went out.
async fn record_sent(
    state: &AppState,
    contact: &Contact,
    kind: CommunicationKind,
    subject: Option<String>,
    body: String,
    message_id: Option<String>,
) -> Option<cardex_core::domain::Communication> {
    let recorded = state
        .contacts
        .create_communication(NewCommunication {
            contact_id: contact.id,
            kind,
            direction: Direction::Outbound,
            subject,
            message: body,
            status: "SENT".to_string(),
            metadata: message_id,
        })
        .await;

    if let Err(e) = state.contacts.touch_last_contact(contact.id).await {
        warn!("Failed to touch last_contact for {}: {}", contact.id, e);
    }

    match recorded {
        Ok(c) => Some(c),
        Err(e) => {
            warn!("Failed to record communication for {}: {}", contact.id, e);
            None
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /communications/sms - Send an SMS to a contact
#[utoipa::path(
    post,
    path = "/communications/sms",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "SMS sent and recorded"),
        (status = 400, description = "Contact has no phone number, or no message given"),
        (status = 404, description = "Contact or template not found"),
        (status = 500, description = "Provider rejected the send"),
    )
)]
pub async fn send_sms_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let contact = state
        .contacts
        .get(req.contact_id)
        .await
        .map_err(from_port_error)?;

    let Some(phone) = contact.phone.clone() else {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Contact has no phone number",
        ));
    };

    let (body, _) = resolve_content(&state, &contact, &req)?;

    let outcome = state.sms.send_sms(&phone, &body).await;
    if !outcome.success {
        return Err(failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "SEND_FAILED",
            outcome.error.unwrap_or_else(|| "SMS send failed".to_string()),
        ));
    }

    let message_id = outcome.message_id.clone();
    let communication = record_sent(
        &state,
        &contact,
        CommunicationKind::Sms,
        None,
        body,
        outcome.message_id,
    )
    .await;

    Ok(ok(json!({
        "communication": communication,
        "messageId": message_id,
    })))
}

/// POST /communications/email - Send an email to a contact
#[utoipa::path(
    post,
    path = "/communications/email",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Email sent and recorded"),
        (status = 400, description = "No message given"),
        (status = 404, description = "Contact or template not found"),
        (status = 500, description = "Provider rejected the send"),
    )
)]
pub async fn send_email_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let contact = state
        .contacts
        .get(req.contact_id)
        .await
        .map_err(from_port_error)?;

    let (body, subject) = resolve_content(&state, &contact, &req)?;
    let subject = subject.unwrap_or_else(|| format!("Following up, {}", contact.name));

    let outcome = state
        .email
        .send_email(&contact.email, &subject, None, Some(&body), &[])
        .await;
    if !outcome.success {
        return Err(failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "SEND_FAILED",
            outcome
                .error
                .unwrap_or_else(|| "Email send failed".to_string()),
        ));
    }

    let message_id = outcome.message_id.clone();
    let communication = record_sent(
        &state,
        &contact,
        CommunicationKind::Email,
        Some(subject),
        body,
        outcome.message_id,
    )
    .await;

    Ok(ok(json!({
        "communication": communication,
        "messageId": message_id,
    })))
}
