use crate::gateway::server::GatewayState;
use crate::providers::GeminiError;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

/// Caller request relayed to generateContent. Fields are optional at the
/// serde layer; validation below produces field-specific 400s.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    contents: Option<Value>,
}

/// `POST /api/chat` — validate and forward one generation request.
///
/// The upstream answer is relayed verbatim, success or error alike. This is
/// deliberately looser than the model-listing path, which does parse upstream
/// error bodies.
pub(crate) async fn chat_handler(
    State(state): State<GatewayState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, GeminiError> {
    let Ok(Json(req)) = body else {
        return Ok(bad_request("Request body is required"));
    };

    let Some(model) = req.model.filter(|m| !m.is_empty()) else {
        return Ok(bad_request("model is required"));
    };
    let Some(key) = req.key.filter(|k| !k.is_empty()) else {
        return Ok(bad_request("key is required"));
    };
    let Some(contents) = req.contents.filter(is_truthy) else {
        return Ok(bad_request("contents is required"));
    };

    let outcome = state
        .client
        .generate_content(&key, &model, &contents)
        .await?;

    Ok((
        outcome.status,
        [(header::CONTENT_TYPE, "application/json")],
        outcome.body,
    )
        .into_response())
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Empty and zero JSON values count as missing.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
