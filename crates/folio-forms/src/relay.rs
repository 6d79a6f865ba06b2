//! Email relay client
//!
//! One outbound call per submission to an EmailJS-compatible relay:
//! `POST {endpoint}/api/v1.0/email/send` with the service, template, public
//! key and template variables as JSON. Every outcome comes back as a
//! [`SubmissionResult`]; nothing escapes as a panic or a raw transport error.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

use crate::config::RelayConfig;
use crate::domain::{FailureKind, SubmissionRequest};

const SEND_PATH: &str = "api/v1.0/email/send";

/// Relay accepted the message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayReceipt {
    pub status: u16,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("relay rejected the request ({status}): {body}")]
    RelayRejected { status: u16, body: String },

    #[error("relay did not answer within {0:?}")]
    Timeout(Duration),
}

impl RelayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RelayError::NetworkFailure(_) => FailureKind::NetworkFailure,
            RelayError::RelayRejected { .. } => FailureKind::RelayRejected,
            RelayError::Timeout(_) => FailureKind::Timeout,
        }
    }
}

pub type SubmissionResult = Result<RelayReceipt, RelayError>;

/// Sends one request to the relay. Implementations must not retry.
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn send(&self, request: &SubmissionRequest) -> SubmissionResult;
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a BTreeMap<String, String>,
}

pub struct EmailRelayClient {
    config: RelayConfig,
    send_url: Url,
    client: reqwest::Client,
}

impl EmailRelayClient {
    pub fn new(config: RelayConfig) -> crate::Result<Self> {
        let base = format!("{}/", config.endpoint.trim_end_matches('/'));
        let send_url = Url::parse(&base)?.join(SEND_PATH)?;
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { config, send_url, client })
    }

    pub fn send_url(&self) -> &Url {
        &self.send_url
    }

    fn classify(&self, error: reqwest::Error) -> RelayError {
        if error.is_timeout() {
            RelayError::Timeout(self.config.timeout())
        } else {
            RelayError::NetworkFailure(error.to_string())
        }
    }
}

#[async_trait]
impl SubmissionClient for EmailRelayClient {
    async fn send(&self, request: &SubmissionRequest) -> SubmissionResult {
        let payload = RelayPayload {
            service_id: &self.config.service_id,
            template_id: &request.template_id,
            user_id: &self.config.public_key,
            template_params: &request.payload,
        };

        tracing::debug!("Sending template {} through {}", request.template_id, self.send_url);

        let response = self
            .client
            .post(self.send_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();

        if status.is_success() {
            // Accepted once the status is in; the body is informational.
            let text = response.text().await.unwrap_or_else(|e| {
                tracing::warn!("Relay accepted template {} but the body was unreadable: {}", request.template_id, e);
                String::new()
            });
            tracing::debug!("Relay accepted template {}: {} {}", request.template_id, status.as_u16(), text);
            Ok(RelayReceipt { status: status.as_u16(), text })
        } else {
            let text = response.text().await.map_err(|e| self.classify(e))?;
            tracing::warn!("Relay rejected template {}: {} {}", request.template_id, status.as_u16(), text);
            Err(RelayError::RelayRejected { status: status.as_u16(), body: text })
        }
    }
}
