//! Client for the parse proxy's `/parse` endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ExtractionError;
use crate::models::config::RemoteConfig;
use crate::models::pricing::ParsedInput;

use super::payload::RawPayload;
use super::{InputExtractor, Result};

#[derive(Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
}

/// Extractor that delegates to a running parse proxy.
pub struct BackendExtractor {
    client: Client,
    config: RemoteConfig,
}

impl BackendExtractor {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Endpoint this extractor posts to.
    pub fn url(&self) -> &str {
        &self.config.parse_url
    }
}

impl InputExtractor for BackendExtractor {
    fn name(&self) -> &'static str {
        "backend"
    }

    async fn extract(&self, text: &str) -> Result<ParsedInput> {
        info!(url = %self.url(), "Parsing check line via proxy");

        let response = self
            .client
            .post(self.url())
            .json(&ParseRequest { text })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "Parse proxy returned an error");
            return Err(ExtractionError::Api { status, body });
        }

        let payload: RawPayload = response.json().await?;
        Ok(payload.into_parsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::stub;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use std::str::FromStr;

    fn extractor(base: &str) -> BackendExtractor {
        BackendExtractor::new(RemoteConfig {
            parse_url: format!("{base}/parse"),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_extract_normalizes_proxy_payload() {
        let app = Router::new().route(
            "/parse",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "item": format!("  {}  ", body["text"].as_str().unwrap_or_default()),
                    "ek": "0,89",
                    "vk": 1.29,
                    "vkNormal": null,
                    "wkzTotal": "200 EUR",
                    "menge": null,
                    "notes": "",
                }))
            }),
        );
        let base = stub::spawn(app).await;

        let parsed = extractor(&base).extract("Monster").await.unwrap();
        assert_eq!(parsed.item.as_deref(), Some("Monster"));
        assert_eq!(parsed.ek, Some(Decimal::from_str("0.89").unwrap()));
        assert_eq!(parsed.vk, Some(Decimal::from_str("1.29").unwrap()));
        assert_eq!(parsed.vk_normal, None);
        assert_eq!(parsed.wkz_total, Some(Decimal::from(200)));
        assert_eq!(parsed.menge, Decimal::ONE);
        assert_eq!(parsed.notes, None);
    }

    #[tokio::test]
    async fn test_extract_reports_error_status() {
        let app = Router::new().route(
            "/parse",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = stub::spawn(app).await;

        match extractor(&base).extract("Monster EK 1").await {
            Err(ExtractionError::Api { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
