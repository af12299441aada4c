//! crates/cardex_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or
//! third-party messaging providers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Communication, Contact, ContactPatch, NewCommunication, NewContact, NewUser, User,
    UserCredentials, UserPatch,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Notification Outcome
//=========================================================================================

/// The uniform result of one SMS or email send attempt.
///
/// A failed send is a value, not an `Err`: callers treat it as a soft
/// failure and must never let it abort the pipeline that triggered it.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub success: bool,
    /// Provider message id (e.g. Twilio SID, Resend id) when known.
    pub message_id: Option<String>,
    /// Provider-reported delivery status, if any.
    pub provider_status: Option<String>,
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn sent(message_id: Option<String>, provider_status: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            provider_status,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            provider_status: None,
            error: Some(error.into()),
        }
    }

    pub fn not_configured(provider: &str) -> Self {
        Self::failed(format!("{} not configured", provider))
    }
}

/// One email attachment (filename plus raw bytes).
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// How contacts are ordered when listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOrder {
    SubmittedDesc,
    SubmittedAsc,
}

/// Which contacts a list call returns.
#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    /// Restrict to one owner's contacts; `None` lists across owners.
    pub user_id: Option<Uuid>,
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Creates a contact, stamping `submitted_at = now()` and status NEW.
    async fn create(&self, data: NewContact) -> PortResult<Contact>;

    /// Applies a partial admin update. Never touches `submitted_at`.
    async fn update(&self, id: Uuid, patch: ContactPatch) -> PortResult<Contact>;

    /// Deletes a contact and all of its communications.
    async fn delete(&self, id: Uuid) -> PortResult<()>;

    async fn get(&self, id: Uuid) -> PortResult<Contact>;

    async fn list(&self, filter: ContactFilter, order: ContactOrder) -> PortResult<Vec<Contact>>;

    async fn list_communications(&self, contact_id: Uuid) -> PortResult<Vec<Communication>>;

    async fn create_communication(&self, data: NewCommunication) -> PortResult<Communication>;

    /// Refreshes `last_contact` and advances status NEW -> CONTACTED after
    /// an outbound message. A status already past NEW is left alone.
    async fn touch_last_contact(&self, id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates an account. Fails with `Conflict` on a duplicate email or slug.
    async fn create_user(&self, data: NewUser) -> PortResult<User>;

    async fn get_user(&self, id: Uuid) -> PortResult<User>;

    /// Applies a partial settings update to a profile.
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> PortResult<User>;

    /// All accounts, newest first. Admin-only surface.
    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn get_user_by_slug(&self, slug: &str) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn slug_taken(&self, slug: &str) -> PortResult<bool>;

    /// Deletes an account and, through the store's cascade, its contacts.
    async fn delete_user(&self, id: Uuid) -> PortResult<()>;

    // --- Auth sessions (browser login cookies) ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Whether the underlying provider has credentials. Checked once by
    /// callers instead of re-deriving it from the environment everywhere.
    fn is_configured(&self) -> bool;

    /// Sends one SMS. Never errors: provider failures come back inside
    /// the [`SendOutcome`].
    async fn send_sms(&self, to: &str, body: &str) -> SendOutcome;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    fn is_configured(&self) -> bool;

    /// Sends one email. Either `html` or `text` must be given.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html: Option<&str>,
        text: Option<&str>,
        attachments: &[EmailAttachment],
    ) -> SendOutcome;
}

/// Read access to uploaded photos and static assets (the welcome PDF).
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn read(&self, path: &str) -> PortResult<Vec<u8>>;

    async fn write(&self, path: &str, bytes: &[u8]) -> PortResult<()>;
}
