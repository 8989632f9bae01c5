use crate::utils::config::ApiConfig;
use crate::utils::{Result, ValidatorError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Secret used to authenticate against the completion backend.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Blank keys are treated as absent.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key.trim().to_string()))
        }
    }

    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().and_then(Self::new)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stop_sequences: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub generations: Vec<Generation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Generation {
    pub text: String,
}

/// Transport to a hosted text-completion model.
pub trait CompletionBackend: Send + Sync {
    fn generate(
        &self,
        api_key: &ApiKey,
        request: &GenerateRequest,
    ) -> impl Future<Output = Result<GenerateResponse>> + Send;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Cohere-style `generate` endpoint over HTTPS.
pub struct CohereBackend {
    client: Client,
    endpoint: String,
}

impl CohereBackend {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ValidatorError::ConfigError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

impl CompletionBackend for CohereBackend {
    async fn generate(&self, api_key: &ApiKey, request: &GenerateRequest) -> Result<GenerateResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose())
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            return Err(classify_failure(status, &detail));
        }

        Ok(response.json::<GenerateResponse>().await?)
    }
}

fn classify_failure(status: StatusCode, detail: &str) -> ValidatorError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ValidatorError::AuthenticationError(
            format!("backend rejected the API key ({}): {}", status, detail),
        ),
        StatusCode::TOO_MANY_REQUESTS => {
            ValidatorError::BackendError(format!("rate limited ({}): {}", status, detail))
        }
        _ => ValidatorError::BackendError(format!("API returned {}: {}", status, detail)),
    }
}
