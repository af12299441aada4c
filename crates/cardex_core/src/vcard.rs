//! crates/cardex_core/src/vcard.rs
//!
//! vCard 3.0 rendering for owner profiles and stored contacts.
//!
//! The encoder is pure: photo bytes are passed in by the caller (which is
//! where read failures are handled, by passing `None` and omitting the
//! PHOTO property).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::domain::VCard;

/// Base64 photo payloads are hard-wrapped at this width, with each
/// continuation line starting with a single space (vCard folding).
const PHOTO_LINE_WIDTH: usize = 75;

/// Renders a vCard 3.0 text payload with CRLF line endings.
///
/// Properties are emitted in a fixed order and only when present:
/// FN, EMAIL, TEL, ORG, TITLE, URL, PHOTO.
pub fn encode(card: &VCard, photo: Option<&[u8]>) -> String {
    let mut lines: Vec<String> = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("FN:{}", card.name),
    ];

    if let Some(email) = non_empty(card.email.as_deref()) {
        lines.push(format!("EMAIL:{}", email));
    }
    if let Some(phone) = non_empty(card.phone.as_deref()) {
        lines.push(format!("TEL:{}", phone));
    }
    if let Some(company) = non_empty(card.company.as_deref()) {
        lines.push(format!("ORG:{}", company));
    }
    if let Some(title) = non_empty(card.title.as_deref()) {
        lines.push(format!("TITLE:{}", title));
    }
    if let Some(linkedin) = non_empty(card.linkedin.as_deref()) {
        lines.push(format!("URL:{}", linkedin));
    }

    if let Some(bytes) = photo {
        let encoded = BASE64.encode(bytes);
        let mut chunks = encoded
            .as_bytes()
            .chunks(PHOTO_LINE_WIDTH)
            // Chunks of a valid base64 string are themselves valid UTF-8.
            .map(|c| std::str::from_utf8(c).unwrap_or_default());
        let first = chunks.next().unwrap_or_default();
        lines.push(format!("PHOTO;ENCODING=b;TYPE=JPEG:{}", first));
        for chunk in chunks {
            lines.push(format!(" {}", chunk));
        }
    }

    lines.push("END:VCARD".to_string());
    lines.join("\r\n")
}

/// Derives the download filename: whitespace runs become underscores,
/// suffixed `.vcf`.
pub fn vcard_filename(name: &str) -> String {
    let underscored = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{}.vcf", underscored)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
