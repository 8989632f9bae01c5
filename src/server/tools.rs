use crate::export::FILE_NAME;
use crate::state::AppState;
use crate::utils::{ErrorKind, ValidatorError};
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Parameters for loading an ETL mapping table")]
pub struct LoadMappingParams {
    #[schemars(description = "Path to the mapping workbook (.xlsx, .xls, .ods) or .csv file")]
    pub file_path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[schemars(description = "Parameters for exporting the generated SQL")]
pub struct ExportParams {
    #[schemars(description = "Where to write the workbook (default: validation_sql.xlsx)")]
    pub output_path: Option<String>,
}

fn to_mcp_error(e: ValidatorError) -> McpError {
    match e.kind() {
        ErrorKind::Parse | ErrorKind::State => McpError::invalid_params(e.to_string(), None),
        _ => McpError::internal_error(e.to_string(), None),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[derive(Clone)]
pub struct ValidatorServer {
    state: AppState,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ValidatorServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "load_mapping",
        description = "Parse an ETL mapping table. The first sheet must have the columns Stage Table, Source Column, Target Table, Target Column and Transformation. Returns the parsed rows."
    )]
    async fn load_mapping(
        &self,
        params: Parameters<LoadMappingParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        let bytes = tokio::fs::read(&params.file_path)
            .await
            .map_err(|e| to_mcp_error(ValidatorError::IoError(e)))?;

        let mut session = self.state.session.lock().await;
        let preview = session
            .load_mapping(&params.file_path, &bytes, self.state.template.as_ref())
            .map_err(to_mcp_error)?;

        to_json(&preview)
    }

    #[tool(
        name = "generate_validation_sql",
        description = "Generate validation SQL for the loaded mapping table using the hosted completion model. Call load_mapping first."
    )]
    async fn generate_validation_sql(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.state.session.lock().await;
        let result = session
            .generate(self.state.template.as_ref(), self.state.client.as_ref())
            .await
            .map_err(to_mcp_error)?;

        Ok(CallToolResult::success(vec![Content::text(result.sql.clone())]))
    }

    #[tool(
        name = "export_validation_sql",
        description = "Write the last generated SQL to an Excel workbook with a single 'Generated SQL' column."
    )]
    async fn export_validation_sql(
        &self,
        params: Parameters<ExportParams>,
    ) -> Result<CallToolResult, McpError> {
        let output_path = params.0.output_path.unwrap_or_else(|| FILE_NAME.to_string());

        let bytes = self
            .state
            .session
            .lock()
            .await
            .export()
            .map_err(to_mcp_error)?;

        tokio::fs::write(&output_path, &bytes)
            .await
            .map_err(|e| to_mcp_error(ValidatorError::IoError(e)))?;

        to_json(&serde_json::json!({
            "output_path": output_path,
            "bytes": bytes.len(),
        }))
    }

    #[tool(
        name = "get_session_state",
        description = "Show the current pipeline stage and whether a mapping table and generated SQL are loaded."
    )]
    async fn get_session_state(&self) -> Result<CallToolResult, McpError> {
        let session = self.state.session.lock().await;
        to_json(&serde_json::json!({
            "stage": session.stage(),
            "mapping_rows": session.mapping().map(|m| m.len()),
            "has_result": session.result().is_some(),
            "credential_configured": self.state.client.has_credential(),
        }))
    }
}

#[tool_handler]
impl rmcp::handler::server::ServerHandler for ValidatorServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                r#"ETL Mapping to Validation SQL

Workflow:
1. load_mapping - Parse the mapping table (use an absolute path)
2. generate_validation_sql - Ask the model for validation SQL
3. export_validation_sql - Save the SQL to validation_sql.xlsx

Each generate call sends a new request; results are not cached."#
                    .to_string(),
            ),
        }
    }
}
