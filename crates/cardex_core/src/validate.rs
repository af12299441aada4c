//! crates/cardex_core/src/validate.rs
//!
//! Boundary validation for incoming contact submissions. Input is checked
//! once here; everything downstream treats a `ValidatedSubmission` as
//! already well-formed.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// A failed validation, carrying a message naming the first bad field.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// The raw JSON body of a public submission, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "photoUrl")]
    pub photo_url: Option<String>,
    pub conference: Option<String>,
}

/// A submission that passed all shape checks. Empty optional strings are
/// normalised to `None` so the rest of the system never sees `Some("")`.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub photo_url: Option<String>,
    pub conference: Option<String>,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
    })
}

/// A URL is accepted if it parses as `scheme://host[...]` with a non-empty
/// host. This mirrors the loose syntactic check the submission form needs;
/// it does not resolve anything.
fn is_valid_url(s: &str) -> bool {
    let Some((scheme, rest)) = s.split_once("://") else {
        return false;
    };
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
        return false;
    }
    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    !host.is_empty() && !host.contains(char::is_whitespace)
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Checks the shape of an incoming submission.
///
/// Rules: `name` non-empty and at most 100 chars; `email` must match a
/// standard email grammar; `linkedin` must be empty or a valid URL;
/// `company`/`title` at most 100 chars; `conference` at most 200 chars.
/// `phone` and `photo_url` are carried through as opaque strings.
pub fn validate(input: SubmissionInput) -> Result<ValidatedSubmission, ValidationError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::new("name", "Name is required"));
    }
    if name.chars().count() > 100 {
        return Err(ValidationError::new("name", "Name too long"));
    }

    let email = input.email.trim().to_string();
    if !email_regex().is_match(&email) {
        return Err(ValidationError::new("email", "Invalid email address"));
    }

    if let Some(linkedin) = input.linkedin.as_deref() {
        if !linkedin.is_empty() && !is_valid_url(linkedin) {
            return Err(ValidationError::new("linkedin", "Invalid LinkedIn URL"));
        }
    }

    if let Some(company) = input.company.as_deref() {
        if company.chars().count() > 100 {
            return Err(ValidationError::new("company", "Company name too long"));
        }
    }

    if let Some(title) = input.title.as_deref() {
        if title.chars().count() > 100 {
            return Err(ValidationError::new("title", "Title too long"));
        }
    }

    if let Some(conference) = input.conference.as_deref() {
        if conference.chars().count() > 200 {
            return Err(ValidationError::new("conference", "Conference name too long"));
        }
    }

    Ok(ValidatedSubmission {
        name,
        email,
        phone: none_if_empty(input.phone),
        linkedin: none_if_empty(input.linkedin),
        company: none_if_empty(input.company),
        title: none_if_empty(input.title),
        photo_url: none_if_empty(input.photo_url),
        conference: none_if_empty(input.conference),
    })
}
