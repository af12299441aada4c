//! services/api/src/adapters/twilio.rs
//!
//! This module contains the adapter for the Twilio SMS API. It implements
//! the `SmsSender` port from the `core` crate.
//!
//! Missing credentials disable the adapter instead of failing: every send
//! then comes back as a soft `not configured` outcome.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, warn};

use cardex_core::ports::{SendOutcome, SmsSender};

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

#[derive(Clone)]
struct TwilioCredentials {
    account_sid: String,
    auth_token: String,
    from_number: String,
}

/// An adapter that implements the `SmsSender` port using the Twilio REST API.
#[derive(Clone)]
pub struct TwilioSmsAdapter {
    client: reqwest::Client,
    credentials: Option<TwilioCredentials>,
}

impl TwilioSmsAdapter {
    /// Creates a new `TwilioSmsAdapter`. The adapter is configured only when
    /// all three credentials are present.
    pub fn new(
        client: reqwest::Client,
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
    ) -> Self {
        let credentials = match (account_sid, auth_token, from_number) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => {
                warn!("Twilio credentials not configured. SMS features will be disabled.");
                None
            }
        };
        Self { client, credentials }
    }
}

/// The subset of the Twilio message resource we read back.
#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: Option<String>,
    status: Option<String>,
}

#[async_trait]
impl SmsSender for TwilioSmsAdapter {
    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn send_sms(&self, to: &str, body: &str) -> SendOutcome {
        let Some(creds) = &self.credentials else {
            return SendOutcome::not_configured("Twilio");
        };

        // Twilio expects E.164; prepend the + if the caller left it off.
        let formatted_to = if to.starts_with('+') {
            to.to_string()
        } else {
            format!("+{}", to)
        };

        let url = format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, creds.account_sid
        );
        let params = [
            ("To", formatted_to.as_str()),
            ("From", creds.from_number.as_str()),
            ("Body", body),
        ];

        let response = match self
            .client
            .post(&url)
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(&params)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Twilio SMS error: {}", e);
                return SendOutcome::failed(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Twilio SMS error ({}): {}", status, body);
            return SendOutcome::failed(format!("Twilio error ({}): {}", status, body));
        }

        match response.json::<TwilioMessageResponse>().await {
            Ok(message) => SendOutcome::sent(message.sid, message.status),
            Err(e) => {
                error!("Failed to parse Twilio response: {}", e);
                SendOutcome::failed(e.to_string())
            }
        }
    }
}
