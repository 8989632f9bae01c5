use crate::export::{FILE_NAME, MIME_TYPE};
use crate::generation::CompletionBackend;
use crate::state::{AppState, ValidationSession};
use crate::utils::{ErrorKind, ValidatorError};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::sync::MutexGuard;

const INDEX_HTML: &str = include_str!("index.html");
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const FILE_NAME_HEADER: &str = "x-file-name";

/// Error body returned to the page: `{"error": ..., "kind": ...}`.
pub struct ApiError(pub ValidatorError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::Parse => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Backend => StatusCode::BAD_GATEWAY,
            ErrorKind::State => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        }));
        (status, body).into_response()
    }
}

pub fn router<B: CompletionBackend + 'static>(state: AppState<B>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/session", get(session_state::<B>))
        .route("/mapping", post(upload_mapping::<B>))
        .route("/generate", post(generate::<B>))
        .route("/download", get(download::<B>))
        .route("/reset", post(reset::<B>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

pub async fn serve<B: CompletionBackend + 'static>(
    state: AppState<B>,
    bind_addr: &str,
    port: u16,
) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", bind_addr, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("HTTP UI listening on http://{}", addr);
    tracing::info!("  GET  /          - Upload page");
    tracing::info!("  POST /mapping   - Upload mapping table (raw body, x-file-name header)");
    tracing::info!("  POST /generate  - Generate validation SQL");
    tracing::info!("  GET  /download  - Download {}", FILE_NAME);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "etl-sql-validator",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn busy() -> Response {
    tracing::warn!("Rejected request while another pipeline step is running");
    (
        StatusCode::CONFLICT,
        Json(serde_json::json!({
            "error": "another request is still running; wait for it to finish",
            "kind": ErrorKind::State,
        })),
    )
        .into_response()
}

fn try_session<B>(state: &AppState<B>) -> Result<MutexGuard<'_, ValidationSession>, Response> {
    state.session.try_lock().map_err(|_| busy())
}

async fn session_state<B: CompletionBackend + 'static>(
    State(state): State<AppState<B>>,
) -> Response {
    let session = match try_session(&state) {
        Ok(session) => session,
        Err(busy) => return busy,
    };

    Json(serde_json::json!({
        "stage": session.stage(),
        "rows": session.mapping(),
        "result": session.result(),
        "credential_configured": state.client.has_credential(),
    }))
    .into_response()
}

async fn upload_mapping<B: CompletionBackend + 'static>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let file_name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("mapping.xlsx")
        .to_string();

    let mut session = match try_session(&state) {
        Ok(session) => session,
        Err(busy) => return busy,
    };

    match session.load_mapping(&file_name, &body, state.template.as_ref()) {
        Ok(preview) => Json(preview).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn generate<B: CompletionBackend + 'static>(State(state): State<AppState<B>>) -> Response {
    let mut session = match try_session(&state) {
        Ok(session) => session,
        Err(busy) => return busy,
    };

    match session
        .generate(state.template.as_ref(), state.client.as_ref())
        .await
    {
        Ok(result) => Json(serde_json::json!({
            "sql": result.sql,
            "request_id": result.request_id,
        }))
        .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn download<B: CompletionBackend + 'static>(State(state): State<AppState<B>>) -> Response {
    let mut session = match try_session(&state) {
        Ok(session) => session,
        Err(busy) => return busy,
    };

    match session.export() {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, MIME_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", FILE_NAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn reset<B: CompletionBackend + 'static>(State(state): State<AppState<B>>) -> Response {
    let mut session = match try_session(&state) {
        Ok(session) => session,
        Err(busy) => return busy,
    };
    session.reset();
    StatusCode::NO_CONTENT.into_response()
}
