//! services/api/src/pipeline.rs
//!
//! The submission pipeline: validate an incoming contact submission, persist
//! it, then kick off the follow-up notifications in the background.
//!
//! Only validation and persistence can fail the caller-visible operation.
//! The notification sends run in spawned tasks after the contact row is
//! durably created; their failures are logged and never propagated.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use cardex_core::domain::{
    CommunicationKind, Contact, Direction, NewCommunication, NewContact, User,
};
use cardex_core::ports::{
    ContactStore, EmailAttachment, EmailSender, FileStore, PortError, PortResult, SmsSender,
};
use cardex_core::validate::{validate, SubmissionInput};

use crate::config::OwnerProfile;

//=========================================================================================
// Notification Settings and Sender Identity
//=========================================================================================

/// Everything the pipeline needs to address its notifications, passed in at
/// construction instead of read from process-wide state.
#[derive(Clone)]
pub struct NotifyConfig {
    /// Public base URL, used to build profile and vCard links.
    pub app_url: String,
    /// Recipient of the admin "new connection" SMS, when set.
    pub admin_phone: Option<String>,
    /// Path (inside the file store) of the PDF attached to welcome emails.
    pub welcome_pdf: Option<String>,
    /// Fallback sender identity for contacts without an owning user.
    pub default_sender: OwnerProfile,
}

/// The identity outbound messages are written as: either the owning user's
/// profile or the configured default owner.
#[derive(Clone, Debug)]
struct SenderIdentity {
    name: String,
    title: String,
    company: String,
    email: String,
    phone: String,
    linkedin: String,
    bio: String,
    slug: Option<String>,
}

impl SenderIdentity {
    fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            title: user.title.clone().unwrap_or_default(),
            company: user.company.clone().unwrap_or_default(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            linkedin: user.linkedin.clone().unwrap_or_default(),
            bio: user.bio.clone().unwrap_or_default(),
            slug: Some(user.slug.clone()),
        }
    }

    fn from_profile(profile: &OwnerProfile) -> Self {
        Self {
            name: profile.name.clone(),
            title: profile.title.clone(),
            company: profile.company.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            linkedin: profile.linkedin.clone(),
            bio: profile.bio.clone(),
            slug: None,
        }
    }
}

/// The standard variable set for template filling: the contact's name plus
/// the sender's profile fields.
pub fn template_variables(contact_name: &str, sender_name: &str, profile: &OwnerProfile) -> HashMap<String, String> {
    HashMap::from([
        ("name".to_string(), contact_name.to_string()),
        ("bio".to_string(), profile.bio.clone()),
        ("sender_name".to_string(), sender_name.to_string()),
        ("sender_title".to_string(), profile.title.clone()),
        ("sender_company".to_string(), profile.company.clone()),
        ("sender_phone".to_string(), profile.phone.clone()),
        ("sender_email".to_string(), profile.email.clone()),
        ("sender_linkedin".to_string(), profile.linkedin.clone()),
    ])
}

//=========================================================================================
// The Pipeline
//=========================================================================================

/// Orchestrates one public contact submission end to end.
#[derive(Clone)]
pub struct SubmissionPipeline {
    store: Arc<dyn ContactStore>,
    sms: Arc<dyn SmsSender>,
    email: Arc<dyn EmailSender>,
    files: Arc<dyn FileStore>,
    notify: NotifyConfig,
}

impl SubmissionPipeline {
    pub fn new(
        store: Arc<dyn ContactStore>,
        sms: Arc<dyn SmsSender>,
        email: Arc<dyn EmailSender>,
        files: Arc<dyn FileStore>,
        notify: NotifyConfig,
    ) -> Self {
        Self {
            store,
            sms,
            email,
            files,
            notify,
        }
    }

    /// Validates and persists one submission, then dispatches the follow-up
    /// notifications without blocking the caller.
    ///
    /// Returns the new contact's id as soon as the row is durably created.
    pub async fn submit(&self, owner: Option<&User>, input: SubmissionInput) -> PortResult<Uuid> {
        // 1. Validate. Nothing is persisted on failure.
        let submission = validate(input).map_err(|e| PortError::Validation(e.message))?;

        // 2. Persist. This is the only step whose failure the caller sees.
        let contact = self
            .store
            .create(NewContact {
                user_id: owner.map(|u| u.id),
                name: submission.name,
                email: submission.email,
                phone: submission.phone,
                linkedin: submission.linkedin,
                company: submission.company,
                title: submission.title,
                photo_url: submission.photo_url,
                conference: submission.conference,
            })
            .await?;

        info!("Contact {} submitted by '{}'", contact.id, contact.name);

        // 3. Fire-and-forget notifications. The response does not wait for
        //    these, and their failures never roll the contact back.
        let sender = match owner {
            Some(user) => SenderIdentity::from_user(user),
            None => SenderIdentity::from_profile(&self.notify.default_sender),
        };
        let contact_id = contact.id;
        let pipeline = self.clone();
        tokio::spawn(async move {
            pipeline.notify_new_contact(&contact, &sender).await;
        });

        Ok(contact_id)
    }

    /// Runs the full notification fan-out for a freshly created contact:
    /// SMS and email to the contact, then the admin summary SMS.
    async fn notify_new_contact(&self, contact: &Contact, sender: &SenderIdentity) {
        if let Some(phone) = contact.phone.as_deref() {
            self.send_contact_sms(contact, phone, sender).await;
        }
        self.send_welcome_email(contact, sender).await;
        self.notify_admin(contact, sender).await;
    }

    /// SMS to the contact with the sender's identity and vCard link.
    async fn send_contact_sms(&self, contact: &Contact, phone: &str, sender: &SenderIdentity) {
        let vcard_url = self.vcard_url(sender);
        let meeting_place = contact
            .conference
            .as_deref()
            .map(|c| format!(" at {}", c))
            .unwrap_or_default();
        let body = format!(
            "Hi {}, great connecting{}! Save my contact card here: {}\n\n- {}",
            first_name(&contact.name),
            meeting_place,
            vcard_url,
            sender.name
        );

        let outcome = self.sms.send_sms(phone, &body).await;
        if outcome.success {
            self.record_outbound(contact, CommunicationKind::Sms, None, body, &outcome.message_id)
                .await;
        } else {
            warn!(
                "Welcome SMS to contact {} failed: {}",
                contact.id,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    /// HTML welcome email to the contact, with the PDF attached when the
    /// asset can be read. A missing PDF downgrades to a plain email.
    async fn send_welcome_email(&self, contact: &Contact, sender: &SenderIdentity) {
        let subject = format!("Great meeting you, {}!", first_name(&contact.name));
        let (html, text) = welcome_email_bodies(contact, sender, &self.vcard_url(sender));

        let mut attachments = Vec::new();
        if let Some(pdf_path) = self.notify.welcome_pdf.as_deref() {
            match self.files.read(pdf_path).await {
                Ok(bytes) => attachments.push(EmailAttachment {
                    filename: "company-overview.pdf".to_string(),
                    content: bytes,
                }),
                Err(e) => warn!("Skipping welcome PDF attachment: {}", e),
            }
        }

        let outcome = self
            .email
            .send_email(&contact.email, &subject, Some(&html), Some(&text), &attachments)
            .await;
        if outcome.success {
            self.record_outbound(
                contact,
                CommunicationKind::Email,
                Some(subject),
                text,
                &outcome.message_id,
            )
            .await;
        } else {
            warn!(
                "Welcome email to contact {} failed: {}",
                contact.id,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    /// Short summary SMS to the configured admin number.
    async fn notify_admin(&self, contact: &Contact, sender: &SenderIdentity) {
        let Some(admin_phone) = self.notify.admin_phone.as_deref() else {
            return;
        };
        if !self.sms.is_configured() {
            return;
        }

        let message = format!(
            "NEW CONNECTION!\n\n{} connected with {}\n\nContact Info:\nName: {}\nEmail: {}\nPhone: {}\nCompany: {}",
            contact.name,
            sender.name,
            contact.name,
            contact.email,
            contact.phone.as_deref().unwrap_or("Not provided"),
            contact.company.as_deref().unwrap_or("Not provided"),
        );

        let outcome = self.sms.send_sms(admin_phone, &message).await;
        if outcome.success {
            info!("Admin notified of new contact {}", contact.id);
        } else {
            warn!(
                "Admin notification for contact {} failed: {}",
                contact.id,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    /// Records a successful outbound message and refreshes the contact's
    /// last_contact/status. Bookkeeping failures are logged only.
    async fn record_outbound(
        &self,
        contact: &Contact,
        kind: CommunicationKind,
        subject: Option<String>,
        message: String,
        provider_id: &Option<String>,
    ) {
        let result = self
            .store
            .create_communication(NewCommunication {
                contact_id: contact.id,
                kind,
                direction: Direction::Outbound,
                subject,
                message,
                status: "SENT".to_string(),
                metadata: provider_id.clone(),
            })
            .await;
        if let Err(e) = result {
            error!("Failed to record communication for contact {}: {}", contact.id, e);
            return;
        }
        if let Err(e) = self.store.touch_last_contact(contact.id).await {
            error!("Failed to touch last_contact for contact {}: {}", contact.id, e);
        }
    }

    fn vcard_url(&self, sender: &SenderIdentity) -> String {
        match sender.slug.as_deref() {
            Some(slug) => format!("{}/u/{}/vcard", self.notify.app_url, slug),
            None => format!("{}/vcard", self.notify.app_url),
        }
    }
}

fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}

/// Builds the HTML and plain-text welcome email bodies.
fn welcome_email_bodies(
    contact: &Contact,
    sender: &SenderIdentity,
    vcard_url: &str,
) -> (String, String) {
    let meeting_place = contact.conference.as_deref().unwrap_or("the conference");
    let text = format!(
        "Hi {},\n\nIt was fantastic connecting with you at {}! {}\n\nSave my contact card: {}\n\nBest regards,\n{}\n{}\n{}",
        contact.name,
        meeting_place,
        sender.bio,
        vcard_url,
        sender.name,
        sender.title,
        sender.company,
    );
    let html = format!(
        concat!(
            "<html><body style=\"font-family: Arial, sans-serif;\">",
            "<h1>Great Meeting You, {first_name}!</h1>",
            "<p>Hi <strong>{name}</strong>,</p>",
            "<p>It was fantastic connecting with you at <strong>{place}</strong>! {bio}</p>",
            "<p><a href=\"{vcard_url}\">Save my contact card</a></p>",
            "<p>Best regards,<br>{sender}<br>{title}<br>{company}</p>",
            "</body></html>"
        ),
        first_name = first_name(&contact.name),
        name = contact.name,
        place = meeting_place,
        bio = sender.bio,
        vcard_url = vcard_url,
        sender = sender.name,
        title = sender.title,
        company = sender.company,
    );
    (html, text)
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cardex_core::domain::{Communication, Contact, ContactPatch, ContactStatus};
    use cardex_core::ports::{ContactFilter, ContactOrder, SendOutcome};
    use cardex_core::template;
    use chrono::Utc;
    use std::sync::Mutex;

    fn owner_profile() -> OwnerProfile {
        OwnerProfile {
            name: "Hayden Smith".to_string(),
            title: "Director".to_string(),
            company: "Idea Networks".to_string(),
            email: "hayden@example.com".to_string(),
            phone: "+16475550000".to_string(),
            linkedin: "https://linkedin.com/in/hayden".to_string(),
            bio: "Looking forward to connecting.".to_string(),
        }
    }

    fn notify_config() -> NotifyConfig {
        NotifyConfig {
            app_url: "https://cards.example.com".to_string(),
            admin_phone: Some("+16476242735".to_string()),
            welcome_pdf: None,
            default_sender: owner_profile(),
        }
    }

    //--- In-memory ContactStore -----------------------------------------------------------

    #[derive(Default)]
    struct MemStore {
        contacts: Mutex<Vec<Contact>>,
        communications: Mutex<Vec<Communication>>,
        fail_create: bool,
    }

    #[async_trait]
    impl ContactStore for MemStore {
        async fn create(&self, data: NewContact) -> PortResult<Contact> {
            if self.fail_create {
                return Err(PortError::Unexpected("store down".to_string()));
            }
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

        async fn list(
            &self,
            filter: ContactFilter,
            order: ContactOrder,
        ) -> PortResult<Vec<Contact>> {
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

        async fn create_communication(
            &self,
            data: NewCommunication,
        ) -> PortResult<Communication> {
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

    //--- Recording senders ----------------------------------------------------------------

    #[derive(Default)]
    struct MemSms {
        configured: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SmsSender for MemSms {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn send_sms(&self, to: &str, body: &str) -> SendOutcome {
            if !self.configured {
                return SendOutcome::not_configured("Twilio");
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            SendOutcome::sent(Some("SM123".to_string()), Some("queued".to_string()))
        }
    }

    #[derive(Default)]
    struct MemEmail {
        configured: bool,
        sent: Mutex<Vec<(String, String, usize)>>,
    }

    #[async_trait]
    impl EmailSender for MemEmail {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn send_email(
            &self,
            to: &str,
            subject: &str,
            _html: Option<&str>,
            _text: Option<&str>,
            attachments: &[EmailAttachment],
        ) -> SendOutcome {
            if !self.configured {
                return SendOutcome::not_configured("Resend");
            }
            self.sent.lock().unwrap().push((
                to.to_string(),
                subject.to_string(),
                attachments.len(),
            ));
            SendOutcome::sent(Some("em_1".to_string()), None)
        }
    }

    struct MemFiles {
        pdf: Option<Vec<u8>>,
    }

    #[async_trait]
    impl FileStore for MemFiles {
        async fn read(&self, path: &str) -> PortResult<Vec<u8>> {
            self.pdf
                .clone()
                .ok_or_else(|| PortError::NotFound(format!("File not found: {}", path)))
        }

        async fn write(&self, _path: &str, _bytes: &[u8]) -> PortResult<()> {
            Ok(())
        }
    }

    //--- Helpers --------------------------------------------------------------------------

    struct Fixture {
        store: Arc<MemStore>,
        sms: Arc<MemSms>,
        email: Arc<MemEmail>,
        pipeline: SubmissionPipeline,
    }

    fn fixture(sms_configured: bool, email_configured: bool) -> Fixture {
        fixture_with(sms_configured, email_configured, notify_config(), false)
    }

    fn fixture_with(
        sms_configured: bool,
        email_configured: bool,
        notify: NotifyConfig,
        fail_create: bool,
    ) -> Fixture {
        let store = Arc::new(MemStore {
            fail_create,
            ..Default::default()
        });
        let sms = Arc::new(MemSms {
            configured: sms_configured,
            ..Default::default()
        });
        let email = Arc::new(MemEmail {
            configured: email_configured,
            ..Default::default()
        });
        let files = Arc::new(MemFiles { pdf: None });
        let pipeline = SubmissionPipeline::new(
            store.clone(),
            sms.clone(),
            email.clone(),
            files,
            notify,
        );
        Fixture {
            store,
            sms,
            email,
            pipeline,
        }
    }

    fn jane() -> SubmissionInput {
        SubmissionInput {
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            phone: Some("+15550001111".to_string()),
            conference: Some("DevCon".to_string()),
            ..Default::default()
        }
    }

    /// Persists Jane directly, bypassing `submit` so no background task is
    /// spawned and the notification fan-out can be driven deterministically.
    async fn create_jane(store: &MemStore, user_id: Option<Uuid>) -> Contact {
        store
            .create(NewContact {
                user_id,
                name: "Jane Doe".to_string(),
                email: "jane@x.com".to_string(),
                phone: Some("+15550001111".to_string()),
                linkedin: None,
                company: None,
                title: None,
                photo_url: None,
                conference: Some("DevCon".to_string()),
            })
            .await
            .unwrap()
    }

    //--- Tests ----------------------------------------------------------------------------

    #[tokio::test]
    async fn valid_submission_persists_one_new_contact() {
        let f = fixture(false, false);
        let id = f.pipeline.submit(None, jane()).await.unwrap();

        let contacts = f.store.contacts.lock().unwrap().clone();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].id, id);
        assert_eq!(contacts[0].status, ContactStatus::New);
    }

    #[tokio::test]
    async fn invalid_submission_never_touches_the_store() {
        let f = fixture(true, true);

        let mut input = jane();
        input.name = String::new();
        let err = f.pipeline.submit(None, input).await.unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));

        let mut input = jane();
        input.email = "not-an-email".to_string();
        let err = f.pipeline.submit(None, input).await.unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));

        assert!(f.store.contacts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_the_only_user_visible_failure() {
        let f = fixture_with(true, true, notify_config(), true);
        let err = f.pipeline.submit(None, jane()).await.unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
    }

    #[tokio::test]
    async fn sms_echoes_conference_and_advances_status() {
        let f = fixture(true, false);
        let contact = create_jane(&f.store, None).await;
        let id = contact.id;
        let sender = SenderIdentity::from_profile(&owner_profile());
        f.pipeline.notify_new_contact(&contact, &sender).await;

        let sent = f.sms.sent.lock().unwrap().clone();
        let contact_sms = sent
            .iter()
            .find(|(to, _)| to == "+15550001111")
            .expect("SMS to the contact");
        assert!(contact_sms.1.contains("DevCon"));
        assert!(contact_sms.1.contains("https://cards.example.com/vcard"));

        let contact = f.store.get(id).await.unwrap();
        assert_eq!(contact.status, ContactStatus::Contacted);
        assert!(contact.last_contact.is_some());

        let communications = f.store.list_communications(id).await.unwrap();
        assert_eq!(communications.len(), 1);
        assert_eq!(communications[0].kind, CommunicationKind::Sms);
        assert_eq!(communications[0].status, "SENT");
        assert_eq!(communications[0].metadata.as_deref(), Some("SM123"));
    }

    #[tokio::test]
    async fn admin_summary_goes_to_the_configured_number() {
        let f = fixture(true, false);
        let contact = create_jane(&f.store, None).await;
        let sender = SenderIdentity::from_profile(&owner_profile());
        f.pipeline.notify_new_contact(&contact, &sender).await;

        let sent = f.sms.sent.lock().unwrap().clone();
        let admin_sms = sent
            .iter()
            .find(|(to, _)| to == "+16476242735")
            .expect("admin SMS");
        assert!(admin_sms.1.contains("Jane Doe"));
        assert!(admin_sms.1.contains("jane@x.com"));
    }

    #[tokio::test]
    async fn unconfigured_providers_do_not_fail_the_pipeline() {
        let f = fixture(false, false);
        let id = f.pipeline.submit(None, jane()).await.unwrap();
        let contact = f.store.get(id).await.unwrap();
        assert_eq!(contact.id, id);
        let sender = SenderIdentity::from_profile(&owner_profile());

        // Completes without panicking, sends nothing, records nothing.
        f.pipeline.notify_new_contact(&contact, &sender).await;
        assert!(f.sms.sent.lock().unwrap().is_empty());
        assert!(f.email.sent.lock().unwrap().is_empty());
        assert!(f.store.list_communications(id).await.unwrap().is_empty());

        let contact = f.store.get(id).await.unwrap();
        assert_eq!(contact.status, ContactStatus::New);
        assert!(contact.last_contact.is_none());
    }

    #[tokio::test]
    async fn welcome_email_attaches_pdf_when_readable() {
        let store = Arc::new(MemStore::default());
        let sms = Arc::new(MemSms::default());
        let email = Arc::new(MemEmail {
            configured: true,
            ..Default::default()
        });
        let files = Arc::new(MemFiles {
            pdf: Some(b"%PDF-1.4".to_vec()),
        });
        let mut notify = notify_config();
        notify.welcome_pdf = Some("assets/overview.pdf".to_string());
        let pipeline =
            SubmissionPipeline::new(store.clone(), sms, email.clone(), files, notify);

        let contact = create_jane(&store, None).await;
        let sender = SenderIdentity::from_profile(&owner_profile());
        pipeline.notify_new_contact(&contact, &sender).await;

        let sent = email.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "jane@x.com");
        assert_eq!(sent[0].2, 1, "PDF should be attached");
    }

    #[tokio::test]
    async fn missing_pdf_downgrades_to_plain_email() {
        let store = Arc::new(MemStore::default());
        let sms = Arc::new(MemSms::default());
        let email = Arc::new(MemEmail {
            configured: true,
            ..Default::default()
        });
        let files = Arc::new(MemFiles { pdf: None });
        let mut notify = notify_config();
        notify.welcome_pdf = Some("assets/overview.pdf".to_string());
        let pipeline =
            SubmissionPipeline::new(store.clone(), sms, email.clone(), files, notify);

        let contact = create_jane(&store, None).await;
        let sender = SenderIdentity::from_profile(&owner_profile());
        pipeline.notify_new_contact(&contact, &sender).await;

        let sent = email.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].2, 0, "email still goes out without the PDF");
    }

    #[tokio::test]
    async fn owned_submission_links_the_owners_vcard() {
        let f = fixture(true, false);
        let owner = User {
            id: Uuid::new_v4(),
            name: "Ann Chen".to_string(),
            email: "ann@example.com".to_string(),
            phone: Some("+15550009999".to_string()),
            company: None,
            title: None,
            linkedin: None,
            bio: None,
            photo_url: None,
            slug: "ann-chen".to_string(),
            active: true,
            created_at: Utc::now(),
        };
        let contact = create_jane(&f.store, Some(owner.id)).await;
        assert_eq!(contact.user_id, Some(owner.id));

        let sender = SenderIdentity::from_user(&owner);
        f.pipeline.notify_new_contact(&contact, &sender).await;
        let sent = f.sms.sent.lock().unwrap().clone();
        let contact_sms = sent.iter().find(|(to, _)| to == "+15550001111").unwrap();
        assert!(contact_sms.1.contains("/u/ann-chen/vcard"));
    }

    #[tokio::test]
    async fn delete_cascades_communications() {
        let f = fixture(true, false);
        let contact = create_jane(&f.store, None).await;
        let id = contact.id;
        let sender = SenderIdentity::from_profile(&owner_profile());
        f.pipeline.notify_new_contact(&contact, &sender).await;
        assert!(!f.store.list_communications(id).await.unwrap().is_empty());

        f.store.delete(id).await.unwrap();
        assert!(f.store.list_communications(id).await.unwrap().is_empty());
        assert!(matches!(
            f.store.get(id).await.unwrap_err(),
            PortError::NotFound(_)
        ));
    }

    #[test]
    fn template_variables_cover_the_standard_set() {
        let vars = template_variables("Bob", "Ann", &owner_profile());
        assert_eq!(vars.get("name").unwrap(), "Bob");
        assert_eq!(vars.get("sender_name").unwrap(), "Ann");
        let out = template::fill("Hi {{name}}, thanks! - {{sender_name}}", &vars);
        assert_eq!(out, "Hi Bob, thanks! - Ann");
    }
}
