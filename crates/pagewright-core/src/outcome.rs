use serde::Serialize;

use crate::error::DeployError;
use crate::request::DeployRequest;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Pipeline stage a failure originated from. Success passes through all of
/// them; a failure short-circuits and records where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validation,
    Generation,
    Publication,
    Notification,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validation => "validation",
            Stage::Generation => "generation",
            Stage::Publication => "publication",
            Stage::Notification => "notification",
        }
    }
}

// ---------------------------------------------------------------------------
// RepoRecord
// ---------------------------------------------------------------------------

/// The published repository as seen by the rest of the pipeline. No local
/// copy of this survives the request; the hosting provider is the system of
/// record and every round re-derives the record from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoRecord {
    pub name: String,
    pub repo_url: String,
    pub pages_url: String,
    pub commit_sha: String,
    pub default_branch: String,
}

// ---------------------------------------------------------------------------
// DeployOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// Terminal record of one request. Exactly one is produced per request,
/// returned synchronously to the caller and POSTed to `evaluation_url`.
///
/// The serialized shape is the callback wire contract: identity and
/// correlation fields are echoed verbatim so the evaluator can match the
/// outcome to the request it issued.
#[derive(Debug, Clone, Serialize)]
pub struct DeployOutcome {
    pub email: String,
    pub task: String,
    pub round: u32,
    pub nonce: String,
    pub status: OutcomeStatus,
    pub repo_url: Option<String>,
    pub commit_sha: Option<String>,
    pub pages_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeployOutcome {
    pub fn success(request: &DeployRequest, repo: &RepoRecord) -> Self {
        Self {
            email: request.email.clone(),
            task: request.task.clone(),
            round: request.round,
            nonce: request.nonce.clone(),
            status: OutcomeStatus::Success,
            repo_url: Some(repo.repo_url.clone()),
            commit_sha: Some(repo.commit_sha.clone()),
            pages_url: Some(repo.pages_url.clone()),
            stage: None,
            error: None,
        }
    }

    pub fn failure(request: &DeployRequest, stage: Stage, error: &DeployError) -> Self {
        Self {
            email: request.email.clone(),
            task: request.task.clone(),
            round: request.round,
            nonce: request.nonce.clone(),
            status: OutcomeStatus::Error,
            repo_url: None,
            commit_sha: None,
            pages_url: None,
            stage: Some(stage),
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
