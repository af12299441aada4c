//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Provider credentials are optional:
//! an absent credential disables that provider rather than failing startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// The profile shown on the legacy single-tenant page and used as the
/// sender identity in outbound messages.
#[derive(Clone, Debug)]
pub struct OwnerProfile {
    pub name: String,
    pub title: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub bio: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// Public base URL of the app, used in profile links and SMS bodies.
    pub app_url: String,
    pub uploads_dir: PathBuf,
    /// Optional PDF attached to the welcome email when present on disk.
    pub welcome_pdf_path: Option<PathBuf>,
    pub admin_password: Option<String>,
    /// Phone number that receives admin notification SMS.
    pub admin_phone: Option<String>,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_phone_number: Option<String>,
    pub resend_api_key: Option<String>,
    pub resend_from_email: String,
    pub owner: OwnerProfile,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let app_url =
            std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let uploads_dir = std::env::var("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));

        let welcome_pdf_path = std::env::var("WELCOME_PDF_PATH").map(PathBuf::from).ok();

        // --- Load Provider Credentials (as optional) ---
        let admin_password = std::env::var("ADMIN_PASSWORD").ok();
        let admin_phone = std::env::var("ADMIN_PHONE").ok();
        let twilio_account_sid = std::env::var("TWILIO_ACCOUNT_SID").ok();
        let twilio_auth_token = std::env::var("TWILIO_AUTH_TOKEN").ok();
        let twilio_phone_number = std::env::var("TWILIO_PHONE_NUMBER").ok();
        let resend_api_key = std::env::var("RESEND_API_KEY").ok();
        let resend_from_email = std::env::var("RESEND_FROM_EMAIL")
            .unwrap_or_else(|_| "contact@example.com".to_string());

        // --- Load the Owner Profile (sender identity) ---
        let owner = OwnerProfile {
            name: std::env::var("OWNER_NAME").unwrap_or_else(|_| "Your Name".to_string()),
            title: std::env::var("OWNER_TITLE").unwrap_or_default(),
            company: std::env::var("OWNER_COMPANY").unwrap_or_default(),
            email: std::env::var("OWNER_EMAIL").unwrap_or_default(),
            phone: std::env::var("OWNER_PHONE").unwrap_or_default(),
            linkedin: std::env::var("OWNER_LINKEDIN").unwrap_or_default(),
            bio: std::env::var("OWNER_BIO").unwrap_or_else(|_| {
                "Looking forward to connecting with you and exploring how we can work together."
                    .to_string()
            }),
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            app_url,
            uploads_dir,
            welcome_pdf_path,
            admin_password,
            admin_phone,
            twilio_account_sid,
            twilio_auth_token,
            twilio_phone_number,
            resend_api_key,
            resend_from_email,
            owner,
        })
    }
}
