//! Cloudinary media host.
//!
//! Only deletion goes through the portal; uploads are made by the browser
//! straight to Cloudinary and the portal keeps the resulting URL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::instrument;

use semnotes_core::traits::MediaHost;

use crate::error::MediaError;

const DEFAULT_BASE_URL: &str = "https://api.cloudinary.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Cloudinary upload API client.
pub struct CloudinaryHost {
    cloud_name: String,
    api_key: String,
    api_secret: String,
    base_url: String,
    client: reqwest::Client,
}

impl CloudinaryHost {
    pub fn new(cloud_name: &str, api_key: &str, api_secret: &str, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("failed to build HTTP client");

        Self {
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        }
    }
}

/// Signature for a destroy call: hex SHA-256 of the sorted parameters
/// followed by the API secret.
pub fn sign_destroy(public_id: &str, timestamp: i64, api_secret: &str) -> String {
    let payload = format!("public_id={public_id}&timestamp={timestamp}{api_secret}");
    format!("{:x}", Sha256::digest(payload.as_bytes()))
}

#[derive(Serialize)]
struct DestroyRequest<'a> {
    public_id: &'a str,
    timestamp: i64,
    api_key: &'a str,
    signature: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    #[serde(default)]
    result: String,
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    fn name(&self) -> &str {
        "cloudinary"
    }

    #[instrument(skip(self), fields(cloud = %self.cloud_name))]
    async fn destroy(&self, public_id: &str) -> anyhow::Result<()> {
        let timestamp = chrono::Utc::now().timestamp();
        let body = DestroyRequest {
            public_id,
            timestamp,
            api_key: &self.api_key,
            signature: sign_destroy(public_id, timestamp, &self.api_secret),
        };

        let response = self
            .client
            .post(format!(
                "{}/v1_1/{}/image/destroy",
                self.base_url, self.cloud_name
            ))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MediaError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    MediaError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::AuthenticationFailed(body).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let parsed: DestroyResponse = response.json().await.map_err(|e| MediaError::ApiError {
            status: 0,
            message: format!("failed to parse response: {e}"),
        })?;

        match parsed.result.as_str() {
            "ok" => {
                tracing::debug!("destroyed {public_id}");
                Ok(())
            }
            "not found" => Err(MediaError::NotFound(public_id.to_string()).into()),
            other => Err(MediaError::ApiError {
                status,
                message: format!("unexpected result: {other}"),
            }
            .into()),
        }
    }
}

/// Stand-in used when no `[media]` section is configured.
pub struct UnconfiguredHost;

#[async_trait]
impl MediaHost for UnconfiguredHost {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn destroy(&self, _public_id: &str) -> anyhow::Result<()> {
        Err(MediaError::NotConfigured.into())
    }
}
