use crate::prelude::{eprintln, *};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use mcpforge_core::forge::{
    package, Archive, GenerationArgs, GenerationError, ARCHIVE_FILENAME, ARCHIVE_MEDIA_TYPE,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, clap::Args)]
pub struct ServeOptions {
    /// Port to listen on
    #[arg(short, long, env = "MCPFORGE_PORT", default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "MCPFORGE_HOST", default_value = "127.0.0.1")]
    pub host: String,
}

#[derive(Debug, Deserialize)]
struct GenerateBody {
    #[serde(flatten)]
    args: GenerationArgs,
    #[serde(default)]
    archive: bool,
}

pub fn router(global: crate::Global) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/generate", post(generate_handler))
        .layer(cors)
        .with_state(Arc::new(global))
}

pub async fn run(options: ServeOptions, global: crate::Global) -> Result<()> {
    let addr = format!("{}:{}", options.host, options.port);

    if global.verbose {
        eprintln!("mcpforge listening on http://{}", addr);
        eprintln!("Generate endpoint: http://{}/api/generate", addr);
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    axum::serve(listener, router(global))
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate_handler(
    State(global): State<Arc<crate::Global>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let archive_query = match archive_flag(&query) {
        Ok(flag) => flag,
        Err(e) => return error_response(&Error::Generation(e)),
    };
    let body: GenerateBody = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(e) => {
            return error_response(&Error::Generation(GenerationError::Input(format!(
                "Invalid request body: {e}"
            ))))
        }
    };
    let wants_archive = archive_query.unwrap_or(body.archive);

    let result = match crate::forge::generate_files_data(body.args, &global).await {
        Ok(result) => result,
        Err(e) => return error_response(&e),
    };

    if !wants_archive {
        return Json(result).into_response();
    }

    match package(&result) {
        Ok(archive) => archive_response(archive),
        Err(e) => error_response(&Error::Generation(e)),
    }
}

/// The `archive` query parameter, when present. Accepts `true`/`false`/`1`/`0`.
fn archive_flag(query: &HashMap<String, String>) -> Result<Option<bool>, GenerationError> {
    match query.get("archive").map(String::as_str) {
        None => Ok(None),
        Some("true" | "1") => Ok(Some(true)),
        Some("false" | "0") => Ok(Some(false)),
        Some(other) => Err(GenerationError::Input(format!(
            "Invalid archive query parameter: {other}"
        ))),
    }
}

/// Binary download response for a packaged archive.
pub fn archive_response(archive: Archive) -> Response {
    let disposition = format!("attachment; filename=\"{ARCHIVE_FILENAME}\"");
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static(ARCHIVE_MEDIA_TYPE),
        ),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition)
                .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(archive.len())),
        (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        (header::ACCEPT_RANGES, HeaderValue::from_static("bytes")),
    ];

    (StatusCode::OK, headers, archive.into_bytes()).into_response()
}

pub fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::Generation(GenerationError::Input(_)) => StatusCode::BAD_REQUEST,
        Error::Generation(GenerationError::ModelInvocation(_)) => StatusCode::BAD_GATEWAY,
        Error::Generation(GenerationError::Normalization { .. })
        | Error::Generation(GenerationError::Schema(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Generation(GenerationError::Packaging(_))
        | Error::MissingApiKey
        | Error::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &Error) -> Response {
    if let Error::Generation(GenerationError::Normalization { raw }) = err {
        log::debug!("Unparseable model output: {raw}");
    }
    log::error!("Generation failed: {err}");

    (
        error_status(err),
        Json(serde_json::json!({ "error": err.to_string(), "kind": err.kind() })),
    )
        .into_response()
}
