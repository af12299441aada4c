//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use cardex_core::ports::{ContactStore, EmailSender, FileStore, SmsSender, UserStore};

use crate::config::Config;
use crate::pipeline::SubmissionPipeline;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub contacts: Arc<dyn ContactStore>,
    pub users: Arc<dyn UserStore>,
    pub sms: Arc<dyn SmsSender>,
    pub email: Arc<dyn EmailSender>,
    pub files: Arc<dyn FileStore>,
    pub pipeline: SubmissionPipeline,
}
