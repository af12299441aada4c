//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ContactStore` and `UserStore` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use cardex_core::domain::{
    Communication, CommunicationKind, Contact, ContactPatch, ContactStatus, Direction,
    NewCommunication, NewContact, NewUser, User, UserCredentials, UserPatch,
};
use cardex_core::ports::{
    ContactFilter, ContactOrder, ContactStore, PortError, PortResult, UserStore,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ContactStore` and `UserStore` ports.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps a sqlx error to the port taxonomy. Unique constraint violations
/// become `Conflict`; a missing row becomes `NotFound`.
fn map_db_err(e: sqlx::Error, what: &str) -> PortError {
    match &e {
        sqlx::Error::RowNotFound => PortError::NotFound(format!("{} not found", what)),
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            PortError::Conflict(format!("{} already exists", what))
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ContactRecord {
    id: Uuid,
    user_id: Option<Uuid>,
    name: String,
    email: String,
    phone: Option<String>,
    linkedin: Option<String>,
    company: Option<String>,
    title: Option<String>,
    photo_url: Option<String>,
    conference: Option<String>,
    notes: Option<String>,
    status: String,
    priority: i32,
    submitted_at: DateTime<Utc>,
    last_contact: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl ContactRecord {
    fn to_domain(self) -> Contact {
        Contact {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            linkedin: self.linkedin,
            company: self.company,
            title: self.title,
            photo_url: self.photo_url,
            conference: self.conference,
            notes: self.notes,
            status: ContactStatus::parse(&self.status).unwrap_or(ContactStatus::New),
            priority: self.priority,
            submitted_at: self.submitted_at,
            last_contact: self.last_contact,
            updated_at: self.updated_at,
        }
    }
}

const CONTACT_COLUMNS: &str = "id, user_id, name, email, phone, linkedin, company, title, \
     photo_url, conference, notes, status, priority, submitted_at, last_contact, updated_at";

#[derive(FromRow)]
struct CommunicationRecord {
    id: Uuid,
    contact_id: Uuid,
    kind: String,
    direction: String,
    subject: Option<String>,
    message: String,
    status: String,
    sent_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
    metadata: Option<String>,
}

impl CommunicationRecord {
    fn to_domain(self) -> Communication {
        Communication {
            id: self.id,
            contact_id: self.contact_id,
            kind: CommunicationKind::parse(&self.kind).unwrap_or(CommunicationKind::Sms),
            direction: Direction::parse(&self.direction).unwrap_or(Direction::Outbound),
            subject: self.subject,
            message: self.message,
            status: self.status,
            sent_at: self.sent_at,
            delivered_at: self.delivered_at,
            metadata: self.metadata,
        }
    }
}

const COMMUNICATION_COLUMNS: &str =
    "id, contact_id, kind, direction, subject, message, status, sent_at, delivered_at, metadata";

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    company: Option<String>,
    title: Option<String>,
    linkedin: Option<String>,
    bio: Option<String>,
    photo_url: Option<String>,
    slug: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            title: self.title,
            linkedin: self.linkedin,
            bio: self.bio,
            photo_url: self.photo_url,
            slug: self.slug,
            active: self.active,
            created_at: self.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, name, email, phone, company, title, linkedin, bio, photo_url, slug, active, created_at";

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    password: String,
}

//=========================================================================================
// `ContactStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContactStore for PgStore {
    async fn create(&self, data: NewContact) -> PortResult<Contact> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO contacts \
             (id, user_id, name, email, phone, linkedin, company, title, photo_url, conference, \
              status, priority, submitted_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'NEW', 0, $11, $11) \
             RETURNING {}",
            CONTACT_COLUMNS
        );
        let record = sqlx::query_as::<_, ContactRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(data.user_id)
            .bind(&data.name)
            .bind(&data.email)
            .bind(&data.phone)
            .bind(&data.linkedin)
            .bind(&data.company)
            .bind(&data.title)
            .bind(&data.photo_url)
            .bind(&data.conference)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "Contact"))?;
        Ok(record.to_domain())
    }

    async fn update(&self, id: Uuid, patch: ContactPatch) -> PortResult<Contact> {
        // COALESCE leaves columns alone when the patch field is None.
        // submitted_at is never part of the SET list.
        let sql = format!(
            "UPDATE contacts SET \
             status = COALESCE($2, status), \
             priority = COALESCE($3, priority), \
             notes = COALESCE($4, notes), \
             updated_at = $5 \
             WHERE id = $1 \
             RETURNING {}",
            CONTACT_COLUMNS
        );
        let record = sqlx::query_as::<_, ContactRecord>(&sql)
            .bind(id)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.priority)
            .bind(&patch.notes)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "Contact"))?;
        Ok(record.to_domain())
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        // Communications go first so no dangling references survive even
        // without relying on the FK cascade.
        sqlx::query("DELETE FROM communications WHERE contact_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "Communication"))?;

        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "Contact"))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Contact {} not found", id)));
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> PortResult<Contact> {
        let sql = format!("SELECT {} FROM contacts WHERE id = $1", CONTACT_COLUMNS);
        let record = sqlx::query_as::<_, ContactRecord>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "Contact"))?;
        Ok(record.to_domain())
    }

    async fn list(&self, filter: ContactFilter, order: ContactOrder) -> PortResult<Vec<Contact>> {
        let order_sql = match order {
            ContactOrder::SubmittedDesc => "ORDER BY submitted_at DESC",
            ContactOrder::SubmittedAsc => "ORDER BY submitted_at ASC",
        };
        let records = match filter.user_id {
            Some(user_id) => {
                let sql = format!(
                    "SELECT {} FROM contacts WHERE user_id = $1 {}",
                    CONTACT_COLUMNS, order_sql
                );
                sqlx::query_as::<_, ContactRecord>(&sql)
                    .bind(user_id)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("SELECT {} FROM contacts {}", CONTACT_COLUMNS, order_sql);
                sqlx::query_as::<_, ContactRecord>(&sql).fetch_all(&self.pool).await
            }
        }
        .map_err(|e| map_db_err(e, "Contact"))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_communications(&self, contact_id: Uuid) -> PortResult<Vec<Communication>> {
        let sql = format!(
            "SELECT {} FROM communications WHERE contact_id = $1 ORDER BY sent_at DESC",
            COMMUNICATION_COLUMNS
        );
        let records = sqlx::query_as::<_, CommunicationRecord>(&sql)
            .bind(contact_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "Communication"))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_communication(&self, data: NewCommunication) -> PortResult<Communication> {
        let sql = format!(
            "INSERT INTO communications \
             (id, contact_id, kind, direction, subject, message, status, sent_at, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {}",
            COMMUNICATION_COLUMNS
        );
        let record = sqlx::query_as::<_, CommunicationRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(data.contact_id)
            .bind(data.kind.as_str())
            .bind(data.direction.as_str())
            .bind(&data.subject)
            .bind(&data.message)
            .bind(&data.status)
            .bind(Utc::now())
            .bind(&data.metadata)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "Communication"))?;
        Ok(record.to_domain())
    }

    async fn touch_last_contact(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE contacts SET \
             last_contact = $2, \
             status = CASE WHEN status = 'NEW' THEN 'CONTACTED' ELSE status END, \
             updated_at = $2 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "Contact"))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Contact {} not found", id)));
        }
        Ok(())
    }
}

//=========================================================================================
// `UserStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: NewUser) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users \
             (id, name, email, phone, company, title, linkedin, bio, photo_url, slug, password, \
              active, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, TRUE, $12) \
             RETURNING {}",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(&data.name)
            .bind(&data.email)
            .bind(&data.phone)
            .bind(&data.company)
            .bind(&data.title)
            .bind(&data.linkedin)
            .bind(&data.bio)
            .bind(&data.photo_url)
            .bind(&data.slug)
            .bind(&data.hashed_password)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "User"))?;
        Ok(record.to_domain())
    }

    async fn get_user(&self, id: Uuid) -> PortResult<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "User"))?;
        Ok(record.to_domain())
    }

    async fn update_user(&self, id: Uuid, patch: UserPatch) -> PortResult<User> {
        let sql = format!(
            "UPDATE users SET \
             name = COALESCE($2, name), \
             phone = COALESCE($3, phone), \
             company = COALESCE($4, company), \
             title = COALESCE($5, title), \
             linkedin = COALESCE($6, linkedin), \
             bio = COALESCE($7, bio), \
             photo_url = COALESCE($8, photo_url) \
             WHERE id = $1 \
             RETURNING {}",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.phone)
            .bind(&patch.company)
            .bind(&patch.title)
            .bind(&patch.linkedin)
            .bind(&patch.bio)
            .bind(&patch.photo_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "User"))?;
        Ok(record.to_domain())
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at DESC",
            USER_COLUMNS
        );
        let records = sqlx::query_as::<_, UserRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "User"))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_user_by_slug(&self, slug: &str) -> PortResult<User> {
        let sql = format!(
            "SELECT {} FROM users WHERE slug = $1 AND active = TRUE",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "User"))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "User"))?;
        Ok(UserCredentials {
            user_id: record.id,
            email: record.email,
            hashed_password: record.password,
        })
    }

    async fn slug_taken(&self, slug: &str) -> PortResult<bool> {
        let taken: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| map_db_err(e, "User"))?;
        Ok(taken.0)
    }

    async fn delete_user(&self, id: Uuid) -> PortResult<()> {
        // Cascade by hand: communications of owned contacts, then contacts,
        // then auth sessions, then the account row.
        sqlx::query(
            "DELETE FROM communications WHERE contact_id IN \
             (SELECT id FROM contacts WHERE user_id = $1)",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_err(e, "Communication"))?;

        sqlx::query("DELETE FROM contacts WHERE user_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "Contact"))?;

        sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "AuthSession"))?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "User"))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "AuthSession"))?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        // Expired rows are dead weight; sweep them on every validation so
        // the table stays bounded by the number of live sessions.
        sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "AuthSession"))?;

        let row: (Uuid,) = sqlx::query_as(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(row.0)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_err(e, "AuthSession"))?;
        Ok(())
    }
}
