pub mod export;
pub mod generation;
pub mod mapping;
pub mod server;
pub mod state;
pub mod utils;

pub use generation::{
    ApiKey, CohereBackend, CompletionBackend, CompletionClient, GeneratedResult, PromptTemplate,
};
pub use mapping::{MappingRecord, MappingSet};
pub use server::ValidatorServer;
pub use state::{AppState, PipelineStage, ValidationSession};
pub use utils::{AppConfig, ErrorKind, Result, ValidatorError};
