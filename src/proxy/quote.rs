use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteParams {
    pub symbol: Option<String>,
}

/// Forwards a stock-quote lookup and returns the upstream JSON verbatim.
pub async fn quote_handler(
    State(state): State<AppState>,
    Query(params): Query<QuoteParams>,
) -> impl IntoResponse {
    let symbol = match params
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(symbol) => symbol.to_string(),
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing symbol" })),
            )
        }
    };
    let key = match state.config.quote_api_key.as_deref() {
        Some(key) => key.to_string(),
        None => {
            warn!("quote request with no API key configured");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "quote API key not set" })),
            );
        }
    };

    debug!(%symbol, "forwarding quote request");
    let url = format!("{}/quote", state.config.quote_base_url);
    let response = state
        .client
        .get(&url)
        .query(&[("symbol", symbol.as_str()), ("token", key.as_str())])
        .send()
        .await;

    match response {
        Ok(upstream) => match upstream.json::<Value>().await {
            Ok(payload) => (StatusCode::OK, Json(payload)),
            Err(err) => {
                warn!(%err, "quote upstream returned an unreadable body");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": err.to_string() })),
                )
            }
        },
        Err(err) => {
            warn!(%err, "quote upstream request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
        }
    }
}
