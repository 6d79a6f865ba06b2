//! Site API client
//!
//! Thin JSON client for the backend the site talks to outside of the email
//! relay. Today that is only account registration.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const REGISTER_PATH: &str = "/api/v1/users/register";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// API client
pub struct ApiClient {
    pub base_url: String,
    pub api_key: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(String::from),
            client: reqwest::Client::new(),
        }
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.post(&url).json(body);

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(resp.json().await?)
    }

    /// Registers an account and returns whatever the backend echoes back.
    pub async fn register(&self, registration: &Registration) -> Result<serde_json::Value, ApiError> {
        tracing::debug!("Registering {} at {}", registration.email, self.base_url);
        let created: serde_json::Value = self.post(REGISTER_PATH, registration).await?;
        tracing::info!("Registered {}", registration.email);
        Ok(created)
    }
}
