use anyhow::Context;
use etl_sql_validator::utils::config::{deployment_dir, resolve_resource};
use etl_sql_validator::utils::API_KEY_ENV;
use etl_sql_validator::{
    ApiKey, AppConfig, AppState, CohereBackend, CompletionClient, PromptTemplate, ValidatorServer,
};
use rmcp::{transport::stdio, ServiceExt};
use std::env;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_dir = deployment_dir();
    let config_path = resolve_resource(Path::new("config.toml"), base_dir.as_deref());
    let (config, config_error) = match AppConfig::load_optional(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_tracing(&config)?;

    if let Some(e) = config_error {
        tracing::warn!(path = %config_path.display(), error = %e, "Ignoring unreadable config file");
    }

    let args: Vec<String> = env::args().collect();

    tracing::info!(
        name = %config.server.name,
        model = %config.api.model,
        "Loaded configuration"
    );

    let template_path = resolve_resource(&config.prompt.template_path, base_dir.as_deref());
    let template = PromptTemplate::load_or_bundled(&template_path)
        .context("prompt template exists but could not be read")?;

    let api_key = ApiKey::from_env(API_KEY_ENV);
    if api_key.is_none() {
        tracing::warn!(
            "{} is not set; mapping upload works but SQL generation will fail",
            API_KEY_ENV
        );
    }

    let backend = CohereBackend::new(&config.api)?;
    let client = CompletionClient::new(backend, config.api.model.clone(), api_key);
    let app_state = AppState::new(template, client);

    if args.len() > 1 && args[1] == "--http" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(config.server.port);

        let bind_addr = args
            .get(3)
            .map(|s| s.as_str())
            .unwrap_or(config.server.bind_addr.as_str());

        etl_sql_validator::server::serve(app_state, bind_addr, port).await?;
    } else {
        tracing::info!("Starting MCP Server on stdio");
        let server = ValidatorServer::new(app_state);
        let service = server.serve(stdio()).await?;
        service.waiting().await?;
    }

    tracing::info!("Shutting down");
    Ok(())
}

fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(
        format!("etl_sql_validator={}", config.logging.level).parse()?,
    );

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}
