pub mod backend;
pub mod client;
pub mod prompt;
pub mod template;

pub use backend::{ApiKey, CohereBackend, CompletionBackend, GenerateRequest, GenerateResponse, Generation};
pub use client::{CompletionClient, MAX_TOKENS, STOP_SEQUENCE, TEMPERATURE};
pub use prompt::{build as build_prompt, estimate_tokens, MAPPING_HEADER};
pub use template::PromptTemplate;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text produced by one generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResult {
    pub request_id: Uuid,
    pub sql: String,
}

impl GeneratedResult {
    pub fn new(request_id: Uuid, sql: String) -> Self {
        Self { request_id, sql }
    }
}
