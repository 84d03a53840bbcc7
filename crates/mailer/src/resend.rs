use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::{EmailMessage, Notifier, NotifyError};

/// Resend transactional email endpoint.
pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct ResendTag<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct ResendSendBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<ResendTag<'a>>,
}

impl<'a> From<&'a EmailMessage> for ResendSendBody<'a> {
    fn from(message: &'a EmailMessage) -> Self {
        Self {
            from: &message.from,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
            reply_to: message.reply_to.as_deref(),
            headers: (!message.headers.is_empty()).then_some(&message.headers),
            tags: message
                .tags
                .iter()
                .map(|t| ResendTag {
                    name: &t.name,
                    value: &t.value,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResendSendResponse {
    id: String,
}

/// [`Notifier`] that delivers through the Resend HTTP API.
#[derive(Debug, Clone)]
pub struct ResendNotifier {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl ResendNotifier {
    /// Create a notifier whose requests give up after `timeout`.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(NotifyError::Config("RESEND_API_KEY is required".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("waitlist/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            api_key,
            endpoint: RESEND_ENDPOINT.to_string(),
            client,
        })
    }

    /// Point at a different API host, e.g. a local mock.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ResendSendBody::from(message))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            match resp.json::<ResendSendResponse>().await {
                Ok(body) => {
                    tracing::debug!(to = %message.to, email_id = %body.id, "Email accepted by Resend")
                }
                Err(e) => tracing::debug!(error = %e, "Email accepted, response body unreadable"),
            }
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
