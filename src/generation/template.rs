use crate::utils::{Result, ValidatorError};
use std::path::Path;

const BUNDLED_TEMPLATE: &str = include_str!("../../prompt_template.txt");

/// Instruction text placed ahead of the mapping rows. Never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ValidatorError::TemplateError {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(path = %path.display(), chars = text.len(), "Loaded prompt template");
        Ok(Self { text })
    }

    /// Template compiled into the binary, used when no file is deployed.
    pub fn bundled() -> Self {
        Self::new(BUNDLED_TEMPLATE)
    }

    /// Loads `path`, or the bundled template when the file does not exist.
    /// Other read failures are still errors.
    pub fn load_or_bundled(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        tracing::warn!(path = %path.display(), "Prompt template not found, using bundled template");
        Ok(Self::bundled())
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
