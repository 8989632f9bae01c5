pub mod session;

pub use session::{MappingPreview, PipelineStage, ValidationSession};

use crate::generation::{CohereBackend, CompletionClient, PromptTemplate};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything a shell needs to drive the pipeline. Cloning shares the session.
pub struct AppState<B = CohereBackend> {
    pub template: Arc<PromptTemplate>,
    pub client: Arc<CompletionClient<B>>,
    pub session: Arc<Mutex<ValidationSession>>,
}

impl<B> AppState<B> {
    pub fn new(template: PromptTemplate, client: CompletionClient<B>) -> Self {
        Self {
            template: Arc::new(template),
            client: Arc::new(client),
            session: Arc::new(Mutex::new(ValidationSession::new())),
        }
    }
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            template: Arc::clone(&self.template),
            client: Arc::clone(&self.client),
            session: Arc::clone(&self.session),
        }
    }
}
