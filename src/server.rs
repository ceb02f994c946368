//! HTTP trigger: each request runs one harvest on its own browser session.

use crate::GridScrape;
use crate::config::GridConfig;
use crate::error::ScrapeError;
use crate::results::Harvest;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;

/// Per-request overrides of the base configuration
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeParams {
    pub start_url: Option<String>,
    pub max_loop_pages: Option<usize>,
}

impl ScrapeParams {
    fn apply(self, base: &GridConfig) -> GridConfig {
        let mut config = base.clone();
        if let Some(start_url) = self.start_url {
            config.start_url = start_url;
        }
        if let Some(max_loop_pages) = self.max_loop_pages {
            config.max_loop_pages = max_loop_pages;
        }
        config
    }
}

pub fn router(config: GridConfig) -> Router {
    Router::new()
        .route("/", get(scrape))
        .route("/scrape", get(scrape))
        .route("/health", get(health))
        .with_state(Arc::new(config))
}

/// Serve the router until the process is stopped
pub async fn serve(addr: SocketAddr, config: GridConfig) -> Result<(), ScrapeError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    ::log::info!("Scraper API listening on {}", listener.local_addr()?);
    axum::serve(listener, router(config)).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn scrape(
    State(config): State<Arc<GridConfig>>,
    Query(params): Query<ScrapeParams>,
) -> (StatusCode, Json<Value>) {
    let config = params.apply(&config);
    ::log::info!("Scrape requested for {}", config.start_url);

    response_body(GridScrape::with_config(config).run().await)
}

/// Shape a run outcome as the JSON body returned to callers
pub fn response_body(outcome: Result<Harvest, ScrapeError>) -> (StatusCode, Json<Value>) {
    match outcome {
        Ok(harvest) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "count": harvest.records.len(),
                "data": harvest.records,
            })),
        ),
        Err(e) => {
            ::log::error!("Scrape failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{Record, StopReason};
    use std::time::Duration;

    #[test]
    fn test_success_body() {
        let harvest = Harvest {
            records: vec![Record {
                title: "Desks".to_string(),
                ..Record::default()
            }],
            pages_visited: 1,
            advances: 0,
            stop_reason: StopReason::NoNextPage,
            total_hint: None,
        };

        let (status, Json(body)) = response_body(Ok(harvest));

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["title"], "Desks");
        assert_eq!(body["data"][0]["closingDate"], "");
    }

    #[test]
    fn test_failure_body() {
        let error = ScrapeError::ExtractionTimeout {
            selector: "tr.rgRow".to_string(),
            waited: Duration::from_secs(15),
        };

        let (status, Json(body)) = response_body(Err(error));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("tr.rgRow"));
        assert!(body.get("data").is_none());
    }

    #[test]
    fn test_params_override_base_config() {
        let base = GridConfig::new("https://example.org/a");
        let params: ScrapeParams =
            serde_json::from_str(r#"{"startUrl": "https://example.org/b", "maxLoopPages": 3}"#).unwrap();

        let config = params.apply(&base);
        assert_eq!(config.start_url, "https://example.org/b");
        assert_eq!(config.max_loop_pages, 3);
        assert_eq!(config.delay_between_pages_ms, base.delay_between_pages_ms);
    }
}
