//! services/api/src/web/testutil.rs
//!
//! In-memory port implementations and an `AppState` builder shared by the
//! handler tests. `MemUsers` mirrors the store's session semantics,
//! including the expired-session sweep on validation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use cardex_core::domain::{
    Communication, Contact, ContactPatch, ContactStatus, NewCommunication, NewContact, NewUser,
    User, UserCredentials, UserPatch,
};
use cardex_core::ports::{
    ContactFilter, ContactOrder, ContactStore, EmailAttachment, EmailSender, FileStore,
    PortError, PortResult, SendOutcome, SmsSender, UserStore,
};

use crate::config::{Config, OwnerProfile};
use crate::pipeline::{NotifyConfig, SubmissionPipeline};
use crate::web::state::AppState;

//=========================================================================================
// In-memory Stores
//=========================================================================================

#[derive(Default)]
pub struct MemUsers {
    /// Each entry is the profile plus its hashed password.
    pub users: Mutex<Vec<(User, String)>>,
    pub sessions: Mutex<Vec<(String, Uuid, DateTime<Utc>)>>,
    /// When set, every lookup fails as if the database were down.
    pub fail_lookup: AtomicBool,
}

#[async_trait]
impl UserStore for MemUsers {
    async fn create_user(&self, data: NewUser) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|(u, _)| u.email == data.email || u.slug == data.slug)
        {
            return Err(PortError::Conflict("User already exists".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            phone: data.phone,
            company: data.company,
            title: data.title,
            linkedin: data.linkedin,
            bio: data.bio,
            photo_url: data.photo_url,
            slug: data.slug,
            active: true,
            created_at: Utc::now(),
        };
        users.push((user.clone(), data.hashed_password));
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> PortResult<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| PortError::NotFound("User not found".to_string()))
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        let (user, _) = users
            .iter_mut()
            .find(|(u, _)| u.id == id)
            .ok_or_else(|| PortError::NotFound("User not found".to_string()))?;
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(phone) = patch.phone {
            user.phone = Some(phone);
        }
        if let Some(company) = patch.company {
            user.company = Some(company);
        }
        if let Some(title) = patch.title {
            user.title = Some(title);
        }
        if let Some(linkedin) = patch.linkedin {
            user.linkedin = Some(linkedin);
        }
        if let Some(bio) = patch.bio {
            user.bio = Some(bio);
        }
        if let Some(photo_url) = patch.photo_url {
            user.photo_url = Some(photo_url);
        }
        Ok(user.clone())
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .map(|(u, _)| u.clone())
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn get_user_by_slug(&self, slug: &str) -> PortResult<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.slug == slug && u.active)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| PortError::NotFound("User not found".to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("store down".to_string()));
        }
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.email == email)
            .map(|(u, password)| UserCredentials {
                user_id: u.id,
                email: u.email.clone(),
                hashed_password: password.clone(),
            })
            .ok_or_else(|| PortError::NotFound("User not found".to_string()))
    }

    async fn slug_taken(&self, slug: &str) -> PortResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|(u, _)| u.slug == slug))
    }

    async fn delete_user(&self, id: Uuid) -> PortResult<()> {
        self.sessions.lock().unwrap().retain(|(_, uid, _)| *uid != id);
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|(u, _)| u.id != id);
        if users.len() == before {
            return Err(PortError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .push((session_id.to_string(), user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().unwrap();
        sessions.retain(|(_, _, expires_at)| *expires_at > now);
        sessions
            .iter()
            .find(|(id, _, _)| id == session_id)
            .map(|(_, user_id, _)| *user_id)
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .retain(|(id, _, _)| id != session_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemContacts {
    pub contacts: Mutex<Vec<Contact>>,
    pub communications: Mutex<Vec<Communication>>,
}

#[async_trait]
impl ContactStore for MemContacts {
    async fn create(&self, data: NewContact) -> PortResult<Contact> {
        let now = Utc::now();
        let contact = Contact {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            name: data.name,
            email: data.email,
            phone: data.phone,
            linkedin: data.linkedin,
            company: data.company,
            title: data.title,
            photo_url: data.photo_url,
            conference: data.conference,
            notes: None,
            status: ContactStatus::New,
            priority: 0,
            submitted_at: now,
            last_contact: None,
            updated_at: now,
        };
        self.contacts.lock().unwrap().push(contact.clone());
        Ok(contact)
    }

    async fn update(&self, id: Uuid, patch: ContactPatch) -> PortResult<Contact> {
        let mut contacts = self.contacts.lock().unwrap();
        let contact = contacts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PortError::NotFound("Contact not found".to_string()))?;
        if let Some(status) = patch.status {
            contact.status = status;
        }
        if let Some(priority) = patch.priority {
            contact.priority = priority;
        }
        if let Some(notes) = patch.notes {
            contact.notes = Some(notes);
        }
        contact.updated_at = Utc::now();
        Ok(contact.clone())
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        self.communications
            .lock()
            .unwrap()
            .retain(|c| c.contact_id != id);
        let mut contacts = self.contacts.lock().unwrap();
        let before = contacts.len();
        contacts.retain(|c| c.id != id);
        if contacts.len() == before {
            return Err(PortError::NotFound("Contact not found".to_string()));
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> PortResult<Contact> {
        self.contacts
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Contact not found".to_string()))
    }

    async fn list(&self, filter: ContactFilter, order: ContactOrder) -> PortResult<Vec<Contact>> {
        let mut contacts: Vec<Contact> = self
            .contacts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.user_id.is_none() || c.user_id == filter.user_id)
            .cloned()
            .collect();
        match order {
            ContactOrder::SubmittedDesc => {
                contacts.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at))
            }
            ContactOrder::SubmittedAsc => {
                contacts.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at))
            }
        }
        Ok(contacts)
    }

    async fn list_communications(&self, contact_id: Uuid) -> PortResult<Vec<Communication>> {
        Ok(self
            .communications
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.contact_id == contact_id)
            .cloned()
            .collect())
    }

    async fn create_communication(&self, data: NewCommunication) -> PortResult<Communication> {
        let communication = Communication {
            id: Uuid::new_v4(),
            contact_id: data.contact_id,
            kind: data.kind,
            direction: data.direction,
            subject: data.subject,
            message: data.message,
            status: data.status,
            sent_at: Utc::now(),
            delivered_at: None,
            metadata: data.metadata,
        };
        self.communications
            .lock()
            .unwrap()
            .push(communication.clone());
        Ok(communication)
    }

    async fn touch_last_contact(&self, id: Uuid) -> PortResult<()> {
        let mut contacts = self.contacts.lock().unwrap();
        let contact = contacts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PortError::NotFound("Contact not found".to_string()))?;
        contact.last_contact = Some(Utc::now());
        if contact.status == ContactStatus::New {
            contact.status = ContactStatus::Contacted;
        }
        Ok(())
    }
}

//=========================================================================================
// Null Providers
//=========================================================================================

pub struct NullSms;

#[async_trait]
impl SmsSender for NullSms {
    fn is_configured(&self) -> bool {
        false
    }

    async fn send_sms(&self, _to: &str, _body: &str) -> SendOutcome {
        SendOutcome::not_configured("Twilio")
    }
}

pub struct NullEmail;

#[async_trait]
impl EmailSender for NullEmail {
    fn is_configured(&self) -> bool {
        false
    }

    async fn send_email(
        &self,
        _to: &str,
        _subject: &str,
        _html: Option<&str>,
        _text: Option<&str>,
        _attachments: &[EmailAttachment],
    ) -> SendOutcome {
        SendOutcome::not_configured("Resend")
    }
}

pub struct NullFiles;

#[async_trait]
impl FileStore for NullFiles {
    async fn read(&self, path: &str) -> PortResult<Vec<u8>> {
        Err(PortError::NotFound(format!("File not found: {}", path)))
    }

    async fn write(&self, _path: &str, _bytes: &[u8]) -> PortResult<()> {
        Ok(())
    }
}

//=========================================================================================
// State Builder
//=========================================================================================

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        app_url: "https://cards.example.com".to_string(),
        uploads_dir: PathBuf::from("/tmp/cardex-test-uploads"),
        welcome_pdf_path: None,
        admin_password: Some("secret".to_string()),
        admin_phone: None,
        twilio_account_sid: None,
        twilio_auth_token: None,
        twilio_phone_number: None,
        resend_api_key: None,
        resend_from_email: "contact@example.com".to_string(),
        owner: OwnerProfile {
            name: "Hayden Smith".to_string(),
            title: "Director".to_string(),
            company: "Idea Networks".to_string(),
            email: "hayden@example.com".to_string(),
            phone: "+16475550000".to_string(),
            linkedin: "https://linkedin.com/in/hayden".to_string(),
            bio: "Looking forward to connecting.".to_string(),
        },
    }
}

/// Builds an `AppState` over fresh in-memory stores and null providers.
pub fn mem_state() -> (Arc<AppState>, Arc<MemUsers>, Arc<MemContacts>) {
    let config = Arc::new(test_config());
    let users = Arc::new(MemUsers::default());
    let contacts = Arc::new(MemContacts::default());
    let sms = Arc::new(NullSms);
    let email = Arc::new(NullEmail);
    let files = Arc::new(NullFiles);

    let pipeline = SubmissionPipeline::new(
        contacts.clone(),
        sms.clone(),
        email.clone(),
        files.clone(),
        NotifyConfig {
            app_url: config.app_url.clone(),
            admin_phone: None,
            welcome_pdf: None,
            default_sender: config.owner.clone(),
        },
    );

    let state = Arc::new(AppState {
        config,
        contacts: contacts.clone(),
        users: users.clone(),
        sms,
        email,
        files,
        pipeline,
    });
    (state, users, contacts)
}

/// Seeds one active account and returns it.
pub async fn seed_user(users: &MemUsers, name: &str, slug: &str) -> User {
    users
        .create_user(NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", slug),
            phone: None,
            company: None,
            title: Some("Director".to_string()),
            linkedin: None,
            bio: None,
            photo_url: None,
            slug: slug.to_string(),
            hashed_password: "$argon2id$unused".to_string(),
        })
        .await
        .unwrap()
}
