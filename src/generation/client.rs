use crate::generation::backend::{ApiKey, CompletionBackend, GenerateRequest};
use crate::utils::{Result, ValidatorError};

pub const MAX_TOKENS: u32 = 1000;
pub const TEMPERATURE: f32 = 0.7;
pub const STOP_SEQUENCE: &str = "--END--";

/// Single-shot prompt completion with fixed sampling parameters.
pub struct CompletionClient<B> {
    backend: B,
    model: String,
    api_key: Option<ApiKey>,
}

impl<B: CompletionBackend> CompletionClient<B> {
    pub fn new(backend: B, model: impl Into<String>, api_key: Option<ApiKey>) -> Self {
        Self {
            backend,
            model: model.into(),
            api_key,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn request_for(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            stop_sequences: vec![STOP_SEQUENCE.to_string()],
        }
    }

    /// Returns the first candidate's text, trimmed. Stop-sequence handling is
    /// left to the backend.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ValidatorError::AuthenticationError(format!(
                "no API key configured; set {}",
                crate::utils::API_KEY_ENV
            ))
        })?;

        let request = self.request_for(prompt);
        let response = self.backend.generate(api_key, &request).await?;

        let generation = response.generations.into_iter().next().ok_or_else(|| {
            ValidatorError::BackendError("response contained no generations".to_string())
        })?;

        Ok(generation.text.trim().to_string())
    }
}
