//! Metadata pulldown endpoint
//!
//! The caller's bearer token is forwarded to the private API unchanged; this
//! service never issues or validates tokens itself.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use microsetta_common::ApiClient;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::export::to_tsv_string;
use crate::pulldown::{drop_private_columns, retrieve_metadata, ErrorReport};
use crate::AppState;

pub const ERROR_COUNT_HEADER: &str = "x-pulldown-error-count";

/// POST body
#[derive(Debug, Deserialize)]
pub struct PulldownRequest {
    pub barcodes: Vec<String>,
    /// Accept a partial table when some samples could not be processed
    #[serde(default)]
    pub allow_missing_samples: bool,
}

/// 422 body when the result is not acceptable to the caller
#[derive(Debug, Serialize)]
pub struct PulldownRejected {
    pub errors: ErrorReport,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// POST /api/metadata/pulldown
///
/// Returns the privacy-filtered table as TSV, or 422 with the error report.
pub async fn metadata_pulldown(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PulldownRequest>,
) -> ApiResult<Response> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    let barcodes: Vec<String> = request
        .barcodes
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect();
    if barcodes.is_empty() {
        return Err(ApiError::BadRequest("no barcodes supplied".to_string()));
    }

    let client = ApiClient::new(&state.api, token)?;
    let result = retrieve_metadata(&client, &barcodes).await?;

    let acceptable = result.errors.is_empty()
        || (request.allow_missing_samples && !result.table.is_empty());
    if !acceptable {
        info!(errors = result.errors.len(), "Pulldown rejected");
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(PulldownRejected {
                errors: result.errors,
            }),
        )
            .into_response());
    }

    let tsv = to_tsv_string(&drop_private_columns(&result.table))
        .map_err(|e| ApiError::Internal(format!("TSV export failed: {}", e)))?;

    let mut response = (
        [
            (header::CONTENT_TYPE, "text/tab-separated-values"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"metadata.tsv\"",
            ),
        ],
        tsv,
    )
        .into_response();
    response
        .headers_mut()
        .insert(ERROR_COUNT_HEADER, HeaderValue::from(result.errors.len()));

    Ok(response)
}

/// Build pulldown routes
pub fn pulldown_routes() -> Router<AppState> {
    Router::new().route("/api/metadata/pulldown", post(metadata_pulldown))
}
