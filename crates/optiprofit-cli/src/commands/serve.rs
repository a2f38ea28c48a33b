//! Serve command - the parse proxy.
//!
//! Front ends post a check line to `/parse` and get the extracted fields
//! back, so the model API key stays on the server.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Args;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info};

use optiprofit_core::extract::{Extractor, ParseResponse};
use optiprofit_core::{ExtractorKind, InputExtractor};

use super::{ExtractorArg, load_config};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Bind address (defaults to the configured one)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (defaults to the configured one, or PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Extractor behind the endpoint
    #[arg(short, long, value_enum, default_value = "llm")]
    extractor: ExtractorArg,
}

/// Request body of `POST /parse`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ParseRequest {
    pub text: Value,
}

type SharedExtractor = Arc<Extractor>;

/// Build the proxy router around an extractor.
///
/// Any origin may call it; the web front end is served from elsewhere.
pub fn router(extractor: Extractor) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/parse", post(parse))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(extractor))
}

fn text_required() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "text_required" }))).into_response()
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let kind = ExtractorKind::from(args.extractor);
    if kind == ExtractorKind::Backend {
        anyhow::bail!("The proxy cannot forward to itself; use --extractor llm or local");
    }
    let extractor = Extractor::from_config(kind, &config)?;

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    info!("Using {} extractor", extractor.name());
    info!("Server listening on {}", addr);
    info!("  POST /parse   - extract fields from {{\"text\": ...}}");
    info!("  GET  /health  - liveness");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(extractor)).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn parse(
    State(extractor): State<SharedExtractor>,
    body: Result<Json<ParseRequest>, JsonRejection>,
) -> Response {
    // A body that is not a JSON object counts as missing text
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!("Rejected parse body: {}", rejection);
            return text_required();
        }
    };

    let text = match req.text.as_str().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => return text_required(),
    };

    match extractor.extract(&text).await {
        Ok(parsed) => (StatusCode::OK, Json(ParseResponse::from(parsed))).into_response(),
        Err(e) => {
            error!("Parse failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use optiprofit_core::LocalExtractor;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn app() -> Router {
        router(Extractor::Local(LocalExtractor::new()))
    }

    async fn post_json(body: &str) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/parse")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_parse_returns_camel_case_payload() {
        let (status, body) =
            post_json(r#"{"text": "Red Bull EK 0,72 Aktion 1,19 statt 1,29 WKZ 200 Menge 1000"}"#)
                .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "item": "Red Bull",
                "ek": 0.72,
                "vk": 1.19,
                "vkNormal": 1.29,
                "wkzTotal": 200.0,
                "menge": 1000.0,
                "notes": null,
            })
        );
    }

    #[tokio::test]
    async fn test_parse_treats_non_json_body_as_missing_text() {
        for (content_type, body) in [("text/plain", "EK 1 VK 2"), ("application/json", "{not json")] {
            let response = app()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/parse")
                        .header("content-type", content_type)
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body, json!({ "error": "text_required" }));
        }
    }

    #[tokio::test]
    async fn test_cors_preflight_and_simple_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/parse")
                    .header("origin", "http://localhost:8081")
                    .header("access-control-request-method", "POST")
                    .header("access-control-request-headers", "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("access-control-allow-origin"));
        assert!(response.headers().contains_key("access-control-allow-methods"));

        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/parse")
                    .header("origin", "http://localhost:8081")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"text": "EK 1 VK 2"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("access-control-allow-origin"));
    }

    #[tokio::test]
    async fn test_parse_rejects_blank_text() {
        for body in [r#"{"text": "   "}"#, r#"{}"#, r#"{"text": 42}"#] {
            let (status, body) = post_json(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "error": "text_required" }));
        }
    }
}
