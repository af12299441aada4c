//! crates/cardex_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The admin-managed lifecycle stage of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactStatus {
    New,
    Contacted,
    Responded,
    MeetingSet,
    Client,
    Cold,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "NEW",
            ContactStatus::Contacted => "CONTACTED",
            ContactStatus::Responded => "RESPONDED",
            ContactStatus::MeetingSet => "MEETING_SET",
            ContactStatus::Client => "CLIENT",
            ContactStatus::Cold => "COLD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(ContactStatus::New),
            "CONTACTED" => Some(ContactStatus::Contacted),
            "RESPONDED" => Some(ContactStatus::Responded),
            "MEETING_SET" => Some(ContactStatus::MeetingSet),
            "CLIENT" => Some(ContactStatus::Client),
            "COLD" => Some(ContactStatus::Cold),
            _ => None,
        }
    }
}

/// The channel a communication went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommunicationKind {
    Sms,
    Email,
    Linkedin,
    Phone,
    InPerson,
}

impl CommunicationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommunicationKind::Sms => "SMS",
            CommunicationKind::Email => "EMAIL",
            CommunicationKind::Linkedin => "LINKEDIN",
            CommunicationKind::Phone => "PHONE",
            CommunicationKind::InPerson => "IN_PERSON",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SMS" => Some(CommunicationKind::Sms),
            "EMAIL" => Some(CommunicationKind::Email),
            "LINKEDIN" => Some(CommunicationKind::Linkedin),
            "PHONE" => Some(CommunicationKind::Phone),
            "IN_PERSON" => Some(CommunicationKind::InPerson),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outbound => "OUTBOUND",
            Direction::Inbound => "INBOUND",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OUTBOUND" => Some(Direction::Outbound),
            "INBOUND" => Some(Direction::Inbound),
            _ => None,
        }
    }
}

/// A person who submitted their details through a profile page.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub id: Uuid,
    /// Owning account in multi-tenant mode; `None` for legacy global contacts.
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub photo_url: Option<String>,
    pub conference: Option<String>,
    pub notes: Option<String>,
    pub status: ContactStatus,
    /// 0 = normal, nonzero = flagged.
    pub priority: i32,
    pub submitted_at: DateTime<Utc>,
    pub last_contact: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// The fields a new contact row is created from. `submitted_at`, `status`
/// and `priority` are stamped by the store, not supplied by callers.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub photo_url: Option<String>,
    pub conference: Option<String>,
}

/// A partial update applied by an admin. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub status: Option<ContactStatus>,
    pub priority: Option<i32>,
    pub notes: Option<String>,
}

/// One outbound (or inbound) message tied to a contact.
#[derive(Debug, Clone, Serialize)]
pub struct Communication {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub kind: CommunicationKind,
    pub direction: Direction,
    pub subject: Option<String>,
    pub message: String,
    /// SENT, DELIVERED, FAILED or READ. Only SENT is produced today;
    /// the rest are reserved for a delivery webhook.
    pub status: String,
    pub sent_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    /// Opaque provider metadata (e.g. the Twilio message SID).
    pub metadata: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCommunication {
    pub contact_id: Uuid,
    pub kind: CommunicationKind,
    pub direction: Direction,
    pub subject: Option<String>,
    pub message: String,
    pub status: String,
    pub metadata: Option<String>,
}

/// An account owning a public profile page and a collection of contacts.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub linkedin: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub slug: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub linkedin: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub slug: String,
    pub hashed_password: String,
}

/// A partial profile update from the settings page. `None` fields are
/// left untouched. Email, slug and password changes go through their own
/// flows, not this patch.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub linkedin: Option<String>,
    pub bio: Option<String>,
    pub photo_url: Option<String>,
}

/// A static catalog entry used to pre-fill outbound message content.
/// Not persisted; see [`crate::template::MESSAGE_TEMPLATES`].
#[derive(Debug, Clone, Serialize)]
pub struct MessageTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: CommunicationKind,
    pub subject: Option<&'static str>,
    pub body: &'static str,
}

/// The fields the vCard encoder renders. Built either from an owner's
/// profile or from a stored contact.
#[derive(Debug, Clone, Default)]
pub struct VCard {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub linkedin: Option<String>,
}
