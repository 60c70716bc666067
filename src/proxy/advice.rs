use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct AdviceRequest {
    pub prompt: String,
}

/// Forwards a prompt to the generative-text API and returns the first
/// candidate's text as `{result}`.
pub async fn advice_handler(
    State(state): State<AppState>,
    Json(request): Json<AdviceRequest>,
) -> impl IntoResponse {
    let key = match state.config.advice_api_key.as_deref() {
        Some(key) => key.to_string(),
        None => {
            warn!("advice request with no API key configured");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "advice API key not set" })),
            );
        }
    };

    debug!(prompt_len = request.prompt.len(), "forwarding advice request");
    let url = format!(
        "{}/models/gemini-pro:generateContent?key={}",
        state.config.advice_base_url, key
    );
    let body = json!({ "contents": [{ "parts": [{ "text": request.prompt }] }] });

    match state.client.post(&url).json(&body).send().await {
        Ok(upstream) => match upstream.json::<Value>().await {
            Ok(payload) => match extract_candidate_text(&payload) {
                Some(text) => (StatusCode::OK, Json(json!({ "result": text }))),
                None => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "No response from advice service" })),
                ),
            },
            Err(err) => {
                warn!(%err, "advice upstream returned an unreadable body");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": err.to_string() })),
                )
            }
        },
        Err(err) => {
            warn!(%err, "advice upstream request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
        }
    }
}

/// The usable text of the first candidate, if the upstream produced one.
fn extract_candidate_text(payload: &Value) -> Option<String> {
    payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

/// JSON-bodied 405 for non-POST requests on this route.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method Not Allowed" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_candidate_text() {
        let payload = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "diversify" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });
        assert_eq!(extract_candidate_text(&payload).as_deref(), Some("diversify"));
    }

    #[test]
    fn missing_candidates_yield_none() {
        assert!(extract_candidate_text(&json!({})).is_none());
        assert!(extract_candidate_text(&json!({ "candidates": [] })).is_none());
        assert!(
            extract_candidate_text(&json!({ "candidates": [{ "content": { "parts": [] } }] }))
                .is_none()
        );
    }
}
