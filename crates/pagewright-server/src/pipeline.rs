//! The deployment orchestrator.
//!
//! One validated request runs the stage sequence
//! `Generated → Published → Notified`; any stage failure short-circuits the
//! rest except notification, which runs for failures too — the evaluation
//! endpoint must learn about both outcomes. The pipeline runs to completion
//! on its worker even if the caller disconnects: the repository side effect
//! cannot be undone, so there is nothing useful to cancel.

use codegen_agent::GenerationInput;
use pagewright_core::outcome::{DeployOutcome, RepoRecord, Stage};
use pagewright_core::request::DeployRequest;
use pagewright_core::sanitize::repo_description;
use pagewright_core::DeployError;

use crate::state::AppState;

/// Everything the route handler needs to shape the synchronous response.
pub struct PipelineResult {
    pub outcome: DeployOutcome,
    /// `Some` when the callback could not be delivered. Never escalated: the
    /// deployment concluded independently of it.
    pub notify_error: Option<String>,
}

/// Run the pipeline for a validated request and deliver the outcome to the
/// caller's evaluation endpoint.
pub async fn execute(state: &AppState, request: &DeployRequest) -> PipelineResult {
    let outcome = match deploy(state, request).await {
        Ok(repo) => {
            tracing::info!(
                task = %request.task,
                round = request.round,
                repo = %repo.name,
                commit = %repo.commit_sha,
                "deployment succeeded"
            );
            DeployOutcome::success(request, &repo)
        }
        Err((stage, err)) => {
            tracing::error!(
                task = %request.task,
                round = request.round,
                stage = stage.as_str(),
                error = %err,
                "deployment failed"
            );
            DeployOutcome::failure(request, stage, &err)
        }
    };

    let notify_error = match state
        .notifier
        .notify(&request.evaluation_url, &outcome)
        .await
    {
        Ok(()) => None,
        Err(err) => {
            tracing::error!(
                task = %request.task,
                error = %err,
                "evaluation callback not delivered"
            );
            Some(err.to_string())
        }
    };

    PipelineResult {
        outcome,
        notify_error,
    }
}

async fn deploy(
    state: &AppState,
    request: &DeployRequest,
) -> Result<RepoRecord, (Stage, DeployError)> {
    let description = repo_description(&request.brief);

    // Round 2 resolves its round-1 state up front: no repository means the
    // revision has nothing to revise, before any generation cost is paid.
    let prior_markup = if request.round == 2 {
        state
            .publisher
            .fetch_prior_markup(&request.task)
            .await
            .map_err(|err| (Stage::Publication, err))?
    } else {
        None
    };

    let artifact = state
        .generator
        .generate(GenerationInput {
            brief: &request.brief,
            checks: &request.checks,
            attachments: &request.attachments,
            prior_markup: prior_markup.as_deref(),
        })
        .await;
    debug_assert!(artifact.is_complete());

    let published = if request.round == 1 {
        state
            .publisher
            .create_and_publish(&request.task, &artifact, &description)
            .await
    } else {
        state
            .publisher
            .update(&request.task, &artifact, &description)
            .await
    };
    published.map_err(|err| (Stage::Publication, err))
}
