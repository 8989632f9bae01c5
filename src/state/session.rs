use crate::export;
use crate::generation::{
    build_prompt, estimate_tokens, CompletionBackend, CompletionClient, GeneratedResult,
    PromptTemplate,
};
use crate::mapping::{self, MappingSet};
use crate::utils::{ErrorKind, Result, ValidatorError};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "cause", rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    FileUploaded,
    MappingParsed,
    PromptBuilt,
    RequestSent,
    ResultReady,
    Exported,
    Failed(String),
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Idle => write!(f, "idle"),
            PipelineStage::FileUploaded => write!(f, "file_uploaded"),
            PipelineStage::MappingParsed => write!(f, "mapping_parsed"),
            PipelineStage::PromptBuilt => write!(f, "prompt_built"),
            PipelineStage::RequestSent => write!(f, "request_sent"),
            PipelineStage::ResultReady => write!(f, "result_ready"),
            PipelineStage::Exported => write!(f, "exported"),
            PipelineStage::Failed(cause) => write!(f, "failed: {}", cause),
        }
    }
}

/// Summary of a parsed upload shown before generation.
#[derive(Debug, Clone, Serialize)]
pub struct MappingPreview {
    pub file_name: String,
    pub rows: MappingSet,
    pub estimated_prompt_tokens: usize,
}

/// Per-user pipeline: upload, generate, export. Holds nothing beyond the
/// current mapping and the latest result.
#[derive(Debug)]
pub struct ValidationSession {
    stage: PipelineStage,
    file_name: Option<String>,
    mapping: Option<MappingSet>,
    result: Option<GeneratedResult>,
}

impl Default for ValidationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationSession {
    pub fn new() -> Self {
        Self {
            stage: PipelineStage::Idle,
            file_name: None,
            mapping: None,
            result: None,
        }
    }

    pub fn stage(&self) -> &PipelineStage {
        &self.stage
    }

    pub fn mapping(&self) -> Option<&MappingSet> {
        self.mapping.as_ref()
    }

    pub fn result(&self) -> Option<&GeneratedResult> {
        self.result.as_ref()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Parses an upload, replacing whatever mapping was loaded before.
    pub fn load_mapping(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        template: &PromptTemplate,
    ) -> Result<MappingPreview> {
        self.reset();
        self.stage = PipelineStage::FileUploaded;
        tracing::info!(file_name, bytes = bytes.len(), "Mapping file uploaded");

        let rows = match mapping::read_named(file_name, bytes) {
            Ok(rows) => rows,
            Err(e) => return Err(self.fail(e)),
        };

        let estimated_prompt_tokens = estimate_tokens(&build_prompt(template, &rows));
        self.file_name = Some(file_name.to_string());
        self.mapping = Some(rows.clone());
        self.stage = PipelineStage::MappingParsed;

        tracing::info!(
            file_name,
            rows = rows.len(),
            estimated_prompt_tokens,
            "Mapping parsed"
        );

        Ok(MappingPreview {
            file_name: file_name.to_string(),
            rows,
            estimated_prompt_tokens,
        })
    }

    /// Runs one prompt/completion pass. On failure the previous result is
    /// gone and the mapping stays loaded for a retry.
    pub async fn generate<B: CompletionBackend>(
        &mut self,
        template: &PromptTemplate,
        client: &CompletionClient<B>,
    ) -> Result<&GeneratedResult> {
        let rows = match self.mapping.as_ref() {
            Some(rows) if !rows.is_empty() => rows,
            Some(_) => {
                tracing::warn!("Generation requested for an empty mapping table");
                return Err(ValidatorError::StateError(
                    "ETL mapping data is empty; upload a table with at least one row".to_string(),
                ));
            }
            None => {
                tracing::warn!("Generation requested before a mapping table was loaded");
                return Err(ValidatorError::StateError(
                    "ETL mapping data is not loaded; upload a mapping table first".to_string(),
                ));
            }
        };

        self.result = None;
        let prompt = build_prompt(template, rows);
        self.stage = PipelineStage::PromptBuilt;

        let request_id = Uuid::new_v4();
        tracing::info!(%request_id, rows = rows.len(), prompt_chars = prompt.len(), "Sending generation request");
        self.stage = PipelineStage::RequestSent;

        match client.complete(&prompt).await {
            Ok(sql) => {
                tracing::info!(%request_id, chars = sql.len(), "Generation completed");
                self.stage = PipelineStage::ResultReady;
                Ok(self.result.insert(GeneratedResult::new(request_id, sql)))
            }
            Err(e) => {
                tracing::error!(%request_id, error = %e, "Generation failed");
                Err(self.fail(e))
            }
        }
    }

    /// Serializes the latest result into the download workbook.
    pub fn export(&mut self) -> Result<Vec<u8>> {
        let result = self.result.as_ref().ok_or_else(|| {
            ValidatorError::StateError("no generated SQL to export; generate first".to_string())
        })?;

        match export::export(&result.sql) {
            Ok(bytes) => {
                tracing::info!(request_id = %result.request_id, bytes = bytes.len(), "Exported validation SQL");
                self.stage = PipelineStage::Exported;
                Ok(bytes)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, error: ValidatorError) -> ValidatorError {
        match error.kind() {
            ErrorKind::Parse => {
                self.mapping = None;
                self.file_name = None;
            }
            ErrorKind::Authentication | ErrorKind::Backend => self.result = None,
            _ => {}
        }
        self.stage = PipelineStage::Failed(error.to_string());
        error
    }
}
