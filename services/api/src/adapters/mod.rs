pub mod db;
pub mod files;
pub mod resend;
pub mod twilio;

pub use db::PgStore;
pub use files::FsFileStore;
pub use resend::ResendEmailAdapter;
pub use twilio::TwilioSmsAdapter;
