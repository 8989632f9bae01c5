use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Failed to parse mapping table: {0}")]
    ParseError(String),

    #[error("Mapping table is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("{0}")]
    StateError(String),

    #[error("Failed to load prompt template {path}: {source}")]
    TemplateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Coarse classification shown to users next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Parse,
    Authentication,
    Backend,
    State,
    Template,
    Export,
    Config,
    Io,
}

impl ValidatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidatorError::ParseError(_) | ValidatorError::MissingColumns(_) => ErrorKind::Parse,
            ValidatorError::AuthenticationError(_) => ErrorKind::Authentication,
            ValidatorError::BackendError(_) => ErrorKind::Backend,
            ValidatorError::StateError(_) => ErrorKind::State,
            ValidatorError::TemplateError { .. } => ErrorKind::Template,
            ValidatorError::ExportError(_) => ErrorKind::Export,
            ValidatorError::ConfigError(_) => ErrorKind::Config,
            ValidatorError::IoError(_) => ErrorKind::Io,
        }
    }
}

impl From<calamine::Error> for ValidatorError {
    fn from(e: calamine::Error) -> Self {
        ValidatorError::ParseError(e.to_string())
    }
}

impl From<csv::Error> for ValidatorError {
    fn from(e: csv::Error) -> Self {
        ValidatorError::ParseError(e.to_string())
    }
}

impl From<reqwest::Error> for ValidatorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ValidatorError::BackendError(format!("request timed out: {}", e))
        } else if e.is_decode() {
            ValidatorError::BackendError(format!("malformed response: {}", e))
        } else {
            ValidatorError::BackendError(e.to_string())
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for ValidatorError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ValidatorError::ExportError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_message_lists_every_column() {
        let err = ValidatorError::MissingColumns(vec![
            "Target Table".to_string(),
            "Transformation".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Mapping table is missing required columns: Target Table, Transformation"
        );
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            ValidatorError::AuthenticationError("x".into()).kind(),
            ErrorKind::Authentication
        );
        assert_eq!(ValidatorError::BackendError("x".into()).kind(), ErrorKind::Backend);
        assert_eq!(ValidatorError::StateError("x".into()).kind(), ErrorKind::State);
    }
}
