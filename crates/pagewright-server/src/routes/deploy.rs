use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use pagewright_core::outcome::OutcomeStatus;
use pagewright_core::request::{self, RawDeployRequest};
use pagewright_core::DeployError;

use crate::error::AppError;
use crate::pipeline::{self, PipelineResult};
use crate::state::AppState;

/// POST /api/deploy — run the full deployment pipeline for one request.
///
/// Validation and authentication happen before any outbound call and return
/// 400/403 immediately with no callback. Once the pipeline proper starts,
/// the outcome — success or failure — is also delivered to `evaluation_url`,
/// and the synchronous response mirrors the terminal state regardless of
/// whether that delivery worked.
pub async fn deploy(
    State(app): State<AppState>,
    payload: Result<Json<RawDeployRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let Json(raw) =
        payload.map_err(|rejection| DeployError::MalformedRequest(rejection.body_text()))?;

    tracing::info!(
        task = raw.task.as_deref().unwrap_or("unknown"),
        round = raw.round,
        "received deployment request"
    );

    let request = request::validate(&raw, &app.config)?;

    let PipelineResult {
        outcome,
        notify_error,
    } = pipeline::execute(&app, &request).await;

    let response = match (outcome.status, notify_error) {
        (OutcomeStatus::Success, None) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "message": "application deployed",
                "repo_url": outcome.repo_url,
                "pages_url": outcome.pages_url,
                "commit_sha": outcome.commit_sha,
            })),
        ),
        (OutcomeStatus::Success, Some(notify_error)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "partial_success",
                "message": "application deployed but evaluation notification failed",
                "repo_url": outcome.repo_url,
                "pages_url": outcome.pages_url,
                "commit_sha": outcome.commit_sha,
                "error": notify_error,
            })),
        ),
        (OutcomeStatus::Error, _) => {
            let stage = outcome.stage.map(|s| s.as_str()).unwrap_or("pipeline");
            let reason = outcome.error.as_deref().unwrap_or("unknown error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "error",
                    "message": format!("{stage}: {reason}"),
                })),
            )
        }
    };
    Ok(response)
}
