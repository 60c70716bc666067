//! Stateless HTTP proxies for the dashboard's third-party widgets.
//!
//! Two pass-through endpoints: `GET /quote` forwards to the stock-quote
//! API and `POST /advice` to the generative-text API. Neither holds state
//! between requests or validates beyond presence checks.

pub mod advice;
pub mod quote;

use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::ProxyConfig;

#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub config: Arc<ProxyConfig>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: Arc::new(config),
        }
    }
}

/// Builds the proxy router. CORS permits all origins; preflight OPTIONS
/// requests are answered by the CORS layer with 200 and no body.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/quote", get(quote::quote_handler))
        .route(
            "/advice",
            post(advice::advice_handler).fallback(advice::method_not_allowed),
        )
        .layer(cors)
        .with_state(state)
}
