use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the completion backend credential.
pub const API_KEY_ENV: &str = "COHERE_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub prompt: PromptConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub template_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "etl-sql-validator".to_string(),
            bind_addr: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.cohere.ai/v1/generate".to_string(),
            model: "command-xlarge-nightly".to_string(),
            timeout_seconds: 120,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from("prompt_template.txt"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> crate::utils::errors::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::utils::errors::ValidatorError::ConfigError(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> crate::utils::errors::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::utils::errors::ValidatorError::ConfigError(e.to_string()))
    }

    /// Defaults when the file is absent. A file that exists but does not
    /// parse is an error so the caller can report it once logging is up.
    pub fn load_optional(path: &Path) -> crate::utils::errors::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }
}

/// Directory holding the running executable.
pub fn deployment_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Resolves a relative resource path against `base` when the file exists
/// there; otherwise the path is used as given.
pub fn resolve_resource(path: &Path, base: Option<&Path>) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match base.map(|dir| dir.join(path)) {
        Some(candidate) if candidate.exists() => candidate,
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults_for_missing_fields() {
        let config = AppConfig::from_toml_str(
            r#"
            [api]
            model = "command-r"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.model, "command-r");
        assert_eq!(config.api.endpoint, "https://api.cohere.ai/v1/generate");
        assert_eq!(config.api.timeout_seconds, 120);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.prompt.template_path, PathBuf::from("prompt_template.txt"));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = AppConfig::from_toml_str("[api\nmodel = ").unwrap_err();
        assert!(matches!(
            err,
            crate::utils::errors::ValidatorError::ConfigError(_)
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config =
            AppConfig::load_optional(Path::new("/definitely/not/here/config.toml")).unwrap();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.api.model, "command-xlarge-nightly");
    }

    #[test]
    fn malformed_file_is_returned_to_the_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let err = AppConfig::load_optional(&path).unwrap_err();
        assert!(matches!(
            err,
            crate::utils::errors::ValidatorError::ConfigError(_)
        ));
    }

    #[test]
    fn relative_resources_resolve_against_the_deployment_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("prompt_template.txt"), "T").unwrap();

        let resolved = resolve_resource(Path::new("prompt_template.txt"), Some(dir.path()));
        assert_eq!(resolved, dir.path().join("prompt_template.txt"));

        let absent = resolve_resource(Path::new("config.toml"), Some(dir.path()));
        assert_eq!(absent, PathBuf::from("config.toml"));

        let absolute = dir.path().join("other.txt");
        assert_eq!(resolve_resource(&absolute, None), absolute);
    }
}
