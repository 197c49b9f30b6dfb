use thiserror::Error;

/// Error taxonomy for the deployment pipeline.
///
/// The first two variants are client errors and abort before any outbound
/// call is made. The repository/hosting variants are pipeline-fatal for the
/// current request but still produce a callback delivery. Notification
/// failures are terminal only for the dispatcher itself.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("invalid secret")]
    AuthenticationFailed,

    #[error("repository creation failed: {0}")]
    RepositoryCreation(String),

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("hosting enable failed: {0}")]
    HostingEnable(String),

    #[error("no repository found for task: {0}")]
    RepositoryNotFound(String),

    #[error("notification delivery failed: {0}")]
    NotificationDelivery(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeployError>;
