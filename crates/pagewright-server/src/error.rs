use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pagewright_core::DeployError;

/// Unified error type for HTTP responses.
///
/// Client-error classes map to their contract status codes; everything else
/// is a 500 whose message names the failing stage without exposing
/// credentials or raw provider secrets.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<DeployError>() {
            match e {
                DeployError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
                DeployError::AuthenticationFailed => StatusCode::FORBIDDEN,
                DeployError::RepositoryCreation(_)
                | DeployError::Publish(_)
                | DeployError::HostingEnable(_)
                | DeployError::RepositoryNotFound(_)
                | DeployError::NotificationDelivery(_)
                | DeployError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({
            "status": "error",
            "message": self.0.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_request_maps_to_400() {
        let err = AppError(DeployError::MalformedRequest("missing brief".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn authentication_failure_maps_to_403() {
        let err = AppError(DeployError::AuthenticationFailed.into());
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn repository_not_found_maps_to_500() {
        let err = AppError(DeployError::RepositoryNotFound("task-1".into()).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn publish_failure_maps_to_500() {
        let err = AppError(DeployError::Publish("upload failed".into()).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_deploy_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_body_is_json_with_error_status() {
        let err = AppError(DeployError::MalformedRequest("bad".into()).into());
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
