use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::ProviderConfig;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Could not connect to authentication service: {0}")]
    Unavailable(String),
}

/// External authority that decides whether an email/password pair is valid.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, email: &str, password: &str) -> Result<bool, ProviderError>;
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Verifies credentials by POSTing them to the identity provider. The
/// provider answers 200 with `["Verified", "True"]` for a valid pair; any
/// other status or body means the credentials were not accepted.
pub struct HttpCredentialVerifier {
    client: reqwest::Client,
    url: String,
}

impl HttpCredentialVerifier {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

fn is_verified(body: &Value) -> bool {
    matches!(body.as_array().map(Vec::as_slice), Some([a, b]) if a == "Verified" && b == "True")
}

#[async_trait]
impl CredentialVerifier for HttpCredentialVerifier {
    async fn verify(&self, email: &str, password: &str) -> Result<bool, ProviderError> {
        let response = self
            .client
            .post(&self.url)
            .json(&VerifyRequest { email, password })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Identity provider request failed: {}", e);
                ProviderError::Unavailable(e.to_string())
            })?;

        if response.status() != reqwest::StatusCode::OK {
            tracing::debug!("Identity provider answered {}", response.status());
            return Ok(false);
        }

        match response.json::<Value>().await {
            Ok(body) => Ok(is_verified(&body)),
            Err(e) => {
                tracing::warn!("Identity provider returned unreadable body: {}", e);
                Ok(false)
            }
        }
    }
}
