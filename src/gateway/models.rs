use crate::gateway::server::GatewayState;
use crate::providers::{GeminiClient, GeminiError, ModelRecord};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Catalog entry exposed to callers.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
struct ModelsResponse {
    models: Vec<ModelSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelsQuery {
    key: Option<String>,
}

/// `GET /api/models` — enumerate the upstream catalog and shape it.
pub(crate) async fn models_handler(
    State(state): State<GatewayState>,
    Query(query): Query<ModelsQuery>,
) -> Result<Response, GeminiError> {
    let Some(key) = query.key.filter(|k| !k.is_empty()) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "API key is required" })),
        )
            .into_response());
    };

    let records = collect_models(&state.client, &key).await?;
    let models = summarize(records);
    debug!("Aggregated {} generation-capable models", models.len());

    Ok(Json(ModelsResponse { models }).into_response())
}

/// Follow the page-token cursor until the upstream stops issuing one.
///
/// A failed page aborts the whole aggregation; partial results are dropped.
async fn collect_models(
    client: &GeminiClient,
    api_key: &str,
) -> Result<Vec<ModelRecord>, GeminiError> {
    let mut records = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = client
            .list_models_page(api_key, page_token.as_deref())
            .await?;
        records.extend(page.models);

        // An empty token string also ends the listing.
        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(records)
}

/// Keep generation-capable records, strip the `models/` namespace, default
/// the display name to the bare id. Upstream order is preserved.
fn summarize(records: Vec<ModelRecord>) -> Vec<ModelSummary> {
    records
        .into_iter()
        .filter(|r| {
            r.supported_generation_methods
                .iter()
                .any(|m| m == "generateContent")
        })
        .map(|r| {
            let id = r
                .name
                .strip_prefix("models/")
                .unwrap_or(&r.name)
                .to_string();
            let display_name = r.display_name.unwrap_or_else(|| id.clone());
            ModelSummary { id, display_name }
        })
        .collect()
}
