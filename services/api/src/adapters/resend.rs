//! services/api/src/adapters/resend.rs
//!
//! This module contains the adapter for the Resend email API. It implements
//! the `EmailSender` port from the `core` crate.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use cardex_core::ports::{EmailAttachment, EmailSender, SendOutcome};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// An adapter that implements the `EmailSender` port using the Resend API.
#[derive(Clone)]
pub struct ResendEmailAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
    from_email: String,
}

impl ResendEmailAdapter {
    /// Creates a new `ResendEmailAdapter`.
    pub fn new(client: reqwest::Client, api_key: Option<String>, from_email: String) -> Self {
        if api_key.is_none() {
            warn!("Resend API key not configured. Email features will be disabled.");
        }
        Self {
            client,
            api_key,
            from_email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResendSendResponse {
    id: Option<String>,
}

#[async_trait]
impl EmailSender for ResendEmailAdapter {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html: Option<&str>,
        text: Option<&str>,
        attachments: &[EmailAttachment],
    ) -> SendOutcome {
        let Some(api_key) = &self.api_key else {
            return SendOutcome::not_configured("Resend");
        };

        // Resend requires at least one body representation.
        if html.is_none() && text.is_none() {
            return SendOutcome::failed("Either html or text content is required");
        }

        let mut payload = json!({
            "from": self.from_email,
            "to": to,
            "subject": subject,
        });
        if let Some(html) = html {
            payload["html"] = json!(html);
        }
        if let Some(text) = text {
            payload["text"] = json!(text);
        }
        if !attachments.is_empty() {
            payload["attachments"] = json!(attachments
                .iter()
                .map(|a| json!({
                    "filename": a.filename,
                    "content": BASE64.encode(&a.content),
                }))
                .collect::<Vec<_>>());
        }

        let response = match self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Resend email error: {}", e);
                return SendOutcome::failed(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Resend email error ({}): {}", status, body);
            return SendOutcome::failed(format!("Resend error ({}): {}", status, body));
        }

        match response.json::<ResendSendResponse>().await {
            Ok(sent) => SendOutcome::sent(sent.id, None),
            Err(e) => {
                error!("Failed to parse Resend response: {}", e);
                SendOutcome::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_adapter_reports_soft_failure() {
        let adapter = ResendEmailAdapter::new(
            reqwest::Client::new(),
            None,
            "contact@example.com".to_string(),
        );
        assert!(!adapter.is_configured());

        let outcome = adapter
            .send_email("jane@x.com", "Hi", Some("<p>Hi</p>"), None, &[])
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Resend not configured"));
    }

    #[tokio::test]
    async fn rejects_bodyless_email_before_any_network_call() {
        let adapter = ResendEmailAdapter::new(
            reqwest::Client::new(),
            Some("re_test_key".to_string()),
            "contact@example.com".to_string(),
        );
        let outcome = adapter.send_email("jane@x.com", "Hi", None, None, &[]).await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Either html or text content is required")
        );
    }
}
