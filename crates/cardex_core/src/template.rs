//! crates/cardex_core/src/template.rs
//!
//! Placeholder filling for outbound message bodies, plus the fixed catalog
//! of canned follow-up templates.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::domain::{CommunicationKind, MessageTemplate};

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("token regex is valid"))
}

/// Replaces every `{{key}}` token with `variables[key]`, or the empty
/// string when the key is absent. The output is not re-scanned, so a
/// variable value containing `{{...}}` is emitted verbatim. Leading and
/// trailing whitespace of the filled result is trimmed.
pub fn fill(template: &str, variables: &HashMap<String, String>) -> String {
    token_regex()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            variables.get(&caps[1]).cloned().unwrap_or_default()
        })
        .trim()
        .to_string()
}

/// The fixed catalog of canned outreach templates. Never persisted;
/// consulted by id from the messaging endpoints.
pub const MESSAGE_TEMPLATES: &[MessageTemplate] = &[
    MessageTemplate {
        id: "initial-followup-sms",
        name: "Initial Follow-up (SMS)",
        kind: CommunicationKind::Sms,
        subject: None,
        body: "Hi {{name}}, great meeting you at the conference! {{bio}}\n\nFeel free to text or call me anytime.\n\n- {{sender_name}}",
    },
    MessageTemplate {
        id: "initial-followup-email",
        name: "Initial Follow-up (Email)",
        kind: CommunicationKind::Email,
        subject: Some("Great meeting you at the conference!"),
        body: "Hi {{name}},\n\nIt was great connecting with you at the conference. {{bio}}\n\nI'd love to continue our conversation and see how we might be able to work together.\n\nFeel free to reach out anytime - looking forward to staying in touch!\n\nBest regards,\n{{sender_name}}\n{{sender_title}}\n{{sender_company}}\n\n{{sender_phone}}\n{{sender_email}}\n{{sender_linkedin}}",
    },
    MessageTemplate {
        id: "meeting-request-email",
        name: "Meeting Request (Email)",
        kind: CommunicationKind::Email,
        subject: Some("Let's schedule a meeting"),
        body: "Hi {{name}},\n\nFollowing up on our conversation at the conference - I'd love to schedule some time to dive deeper into how we can work together.\n\n{{bio}}\n\nAre you available for a 30-minute call this week or next? I'm flexible with timing.\n\nLet me know what works best for you!\n\nBest regards,\n{{sender_name}}",
    },
    MessageTemplate {
        id: "checkin-sms",
        name: "Check-in (SMS)",
        kind: CommunicationKind::Sms,
        subject: None,
        body: "Hey {{name}}, just wanted to check in and see how things are going. Let me know if there's anything I can help with!\n\n- {{sender_name}}",
    },
    MessageTemplate {
        id: "resource-share-email",
        name: "Share Resource (Email)",
        kind: CommunicationKind::Email,
        subject: Some("Resource I mentioned"),
        body: "Hi {{name}},\n\nAs promised, here's the resource I mentioned during our conversation:\n\n[Add your link or content here]\n\nHope you find it valuable. Let me know if you have any questions or if there's anything else I can help with.\n\nBest regards,\n{{sender_name}}",
    },
];

/// Linear scan of the catalog; first id match wins.
pub fn template_by_id(id: &str) -> Option<&'static MessageTemplate> {
    MESSAGE_TEMPLATES.iter().find(|t| t.id == id)
}

pub fn templates_by_kind(kind: CommunicationKind) -> Vec<&'static MessageTemplate> {
    MESSAGE_TEMPLATES.iter().filter(|t| t.kind == kind).collect()
}
