use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{info, warn};

use super::models::{ErrorResponse, MemeRequest, MemeSummary};
use super::state::ServerState;
use crate::error::CaptionError;
use crate::service::MemeService;

pub async fn run_server(service: MemeService, addr: String) -> Result<()> {
    let state = Arc::new(ServerState { service });
    let app = Router::new()
        .route("/health", get(health))
        .route("/status", get(health))
        .route("/memes", get(list_memes))
        .route("/meme", get(meme_from_query).post(meme_from_json))
        .with_state(state)
        .layer(axum::middleware::from_fn(cors_middleware));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind server address: {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug)]
pub(crate) struct ServerError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl ServerError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<CaptionError> for ServerError {
    fn from(err: CaptionError) -> Self {
        match err {
            CaptionError::MemeNotFound(_) => ServerError::not_found(err.to_string()),
            CaptionError::CaptionCount { .. } => ServerError::bad_request(err.to_string()),
            other => ServerError::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type"),
    );
}

async fn list_memes(State(state): State<Arc<ServerState>>) -> Json<Vec<MemeSummary>> {
    let memes = state
        .service
        .catalog
        .list()
        .into_iter()
        .map(|meme| MemeSummary {
            id: meme.id.clone(),
            name: meme.name.clone(),
            boxes: meme.boxes().into_iter().map(|config| config.rect).collect(),
        })
        .collect();
    Json(memes)
}

async fn meme_from_query(
    State(state): State<Arc<ServerState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ServerError> {
    let (meme, texts) = parse_meme_query(pairs)?;
    render(state, meme, texts).await
}

async fn meme_from_json(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<MemeRequest>,
) -> Result<Response, ServerError> {
    let meme = required_meme(payload.meme)?;
    render(state, meme, payload.texts).await
}

async fn render(
    state: Arc<ServerState>,
    meme: String,
    texts: Vec<String>,
) -> Result<Response, ServerError> {
    let id = meme.clone();
    let result = tokio::task::spawn_blocking(move || state.service.generate(&meme, &texts))
        .await
        .map_err(|err| ServerError::internal(format!("server task failed: {}", err)))?;
    match result {
        Ok(jpeg) => Ok(([(header::CONTENT_TYPE, "image/jpeg")], jpeg).into_response()),
        Err(err) => {
            warn!(meme = %id, error = %err, "rejected meme request");
            Err(err.into())
        }
    }
}

/// Pulls `meme` and the ordered `text` / `text[]` values out of a query
/// string; other keys are ignored.
pub(crate) fn parse_meme_query(
    pairs: Vec<(String, String)>,
) -> Result<(String, Vec<String>), ServerError> {
    let mut meme = None;
    let mut texts = Vec::new();
    for (key, value) in pairs {
        match key.as_str() {
            "meme" if meme.is_none() => meme = Some(value),
            "text" | "text[]" => texts.push(value),
            _ => {}
        }
    }
    Ok((required_meme(meme)?, texts))
}

fn required_meme(meme: Option<String>) -> Result<String, ServerError> {
    match meme.map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ServerError::bad_request("meme is required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(values: &[(&str, &str)]) -> Vec<(String, String)> {
        values
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn query_keeps_text_order_across_both_key_forms() {
        let (meme, texts) = parse_meme_query(pairs(&[
            ("text", "top"),
            ("meme", "drake"),
            ("utm_source", "x"),
            ("text[]", "bottom"),
        ]))
        .expect("query");
        assert_eq!(meme, "drake");
        assert_eq!(texts, vec!["top", "bottom"]);
    }

    #[test]
    fn query_without_texts_is_a_preview() {
        let (meme, texts) = parse_meme_query(pairs(&[("meme", " drake ")])).expect("query");
        assert_eq!(meme, "drake");
        assert!(texts.is_empty());
    }

    #[test]
    fn query_without_meme_is_rejected() {
        let err = parse_meme_query(pairs(&[("text", "top"), ("meme", "")])).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "meme is required");
    }

    #[test]
    fn caption_errors_map_to_statuses() {
        let not_found: ServerError = CaptionError::MemeNotFound("nope".to_string()).into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let count: ServerError = CaptionError::CaptionCount {
            expected: 2,
            actual: 1,
        }
        .into();
        assert_eq!(count.status, StatusCode::BAD_REQUEST);

        let raster: ServerError = CaptionError::Raster("boom".to_string()).into();
        assert_eq!(raster.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn error_response_is_json() {
        let response = ServerError::not_found("unknown meme: nope").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value, serde_json::json!({ "error": "unknown meme: nope" }));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
    }
}
