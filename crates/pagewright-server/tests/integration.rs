use axum::http::StatusCode;
use http_body_util::BodyExt;
use std::time::Duration;
use tower::ServiceExt;

use codegen_agent::Generator;
use pagewright_core::config::{Config, GeneratorConfig, GithubConfig};
use pagewright_core::repo_name::repo_name_for_task;
use pagewright_core::retry::RetryPolicy;
use pagewright_server::github::GithubPublisher;
use pagewright_server::notify::Notifier;
use pagewright_server::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        multiplier: 2,
        max_delay: Duration::from_millis(4),
        jitter: false,
    }
}

/// Build an app wired to a mockito GitHub endpoint, with the template
/// generator and millisecond retry schedules.
fn test_app(github_api_base: String) -> axum::Router {
    let config = Config {
        student_email: "student@example.com".to_string(),
        student_secret: "s3cret".to_string(),
        github: GithubConfig {
            token: "test-token".to_string(),
            owner: "octocat".to_string(),
            api_base: github_api_base,
        },
        generator: GeneratorConfig::Template,
    };
    let publisher = GithubPublisher::with_policy(&config.github, fast_policy());
    let notifier = Notifier::with_policy(fast_policy());
    let generator = Generator::from_config(&config.generator);
    pagewright_server::build_router(AppState::with_components(
        config, generator, publisher, notifier,
    ))
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn deploy_body(task: &str, round: u32, evaluation_url: &str) -> serde_json::Value {
    serde_json::json!({
        "email": "student@example.com",
        "secret": "s3cret",
        "task": task,
        "round": round,
        "nonce": "nonce-42",
        "brief": "Create a page saying Hi",
        "checks": ["Page has a title"],
        "evaluation_url": evaluation_url,
        "attachments": []
    })
}

/// Mount the full happy-path GitHub surface for a round-1 deploy of `task`.
/// The returned mocks must stay alive for the duration of the test; the
/// first one is the repo-creation mock with the description matcher.
async fn mock_round_one(
    server: &mut mockito::ServerGuard,
    task: &str,
    expected_description: &str,
) -> Vec<mockito::Mock> {
    let name = repo_name_for_task(task);
    let create = server
        .mock("POST", "/user/repos")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "name": name,
            "description": expected_description,
            "private": false,
        })))
        .with_status(201)
        .with_body(
            serde_json::json!({"html_url": format!("https://github.com/octocat/{name}")})
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let uploads = server
        .mock(
            "PUT",
            mockito::Matcher::Regex(format!("^/repos/octocat/{name}/contents/.+$")),
        )
        .with_status(201)
        .with_body(
            serde_json::json!({"content": {"sha": "blob1"}, "commit": {"sha": "commit1"}})
                .to_string(),
        )
        .expect(3)
        .create_async()
        .await;
    let enable = server
        .mock("POST", format!("/repos/octocat/{name}/pages").as_str())
        .with_status(201)
        .create_async()
        .await;
    let poll = server
        .mock("GET", format!("/repos/octocat/{name}/pages").as_str())
        .with_status(200)
        .with_body(r#"{"status": "built"}"#)
        .create_async()
        .await;
    vec![create, uploads, enable, poll]
}

// ---------------------------------------------------------------------------
// Validation and authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_reports_service_identity() {
    let (status, body) = get(test_app("http://127.0.0.1:9".into()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["service"].as_str().unwrap().contains("pagewright"));
}

#[tokio::test]
async fn missing_fields_return_400_naming_them() {
    let app = test_app("http://127.0.0.1:9".into());
    let body = serde_json::json!({"email": "student@example.com", "secret": "s3cret"});
    let (status, json) = post_json(app, "/api/deploy", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("brief"));
    assert!(message.contains("task"));
}

#[tokio::test]
async fn non_json_body_returns_400() {
    let app = test_app("http://127.0.0.1:9".into());
    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/deploy")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("this is not json"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_secret_returns_403() {
    let app = test_app("http://127.0.0.1:9".into());
    let mut body = deploy_body("some-task", 1, "https://example.com/notify");
    body["secret"] = serde_json::json!("wrong-secret");
    let (status, json) = post_json(app, "/api/deploy", body).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["status"], "error");
}

#[tokio::test]
async fn round_three_returns_400() {
    let app = test_app("http://127.0.0.1:9".into());
    let body = deploy_body("some-task", 3, "https://example.com/notify");
    let (status, json) = post_json(app, "/api/deploy", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("round"));
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn round_one_deploys_and_notifies() {
    let mut github = mockito::Server::new_async().await;
    let mut callback = mockito::Server::new_async().await;

    let task = "clock-app-e2e";
    let name = repo_name_for_task(task);
    let github_mocks = mock_round_one(
        &mut github,
        task,
        "Auto-generated application: Create a page saying Hi",
    )
    .await;
    let notified = callback
        .mock("POST", "/notify")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "task": task,
            "round": 1,
            "nonce": "nonce-42",
            "status": "success",
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let app = test_app(github.url());
    let body = deploy_body(task, 1, &format!("{}/notify", callback.url()));
    let (status, json) = post_json(app, "/api/deploy", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(
        json["repo_url"],
        format!("https://github.com/octocat/{name}")
    );
    assert_eq!(
        json["pages_url"],
        format!("https://octocat.github.io/{name}/")
    );
    assert_eq!(json["commit_sha"], "commit1");
    github_mocks[0].assert_async().await;
    github_mocks[1].assert_async().await;
    notified.assert_async().await;
}

#[tokio::test]
async fn control_characters_in_brief_never_reach_the_repository_description() {
    let mut github = mockito::Server::new_async().await;
    let mut callback = mockito::Server::new_async().await;

    let task = "captcha-solver-ctrl";
    // The create mock only matches the sanitized description; an unsanitized
    // one would go unmatched and fail the deployment.
    let github_mocks = mock_round_one(
        &mut github,
        task,
        "Auto-generated application: Create a captcha solver that handles URL parameters",
    )
    .await;
    let _notified = callback
        .mock("POST", "/notify")
        .with_status(200)
        .create_async()
        .await;

    let app = test_app(github.url());
    let mut body = deploy_body(task, 1, &format!("{}/notify", callback.url()));
    body["brief"] =
        serde_json::json!("Create a captcha solver\nthat handles\tURL parameters");
    let (status, json) = post_json(app, "/api/deploy", body).await;

    assert_eq!(status, StatusCode::OK, "body: {json}");
    assert_eq!(json["status"], "success");
    github_mocks[0].assert_async().await;
}

#[tokio::test]
async fn round_two_without_round_one_fails_and_still_notifies() {
    let mut github = mockito::Server::new_async().await;
    let mut callback = mockito::Server::new_async().await;

    let task = "never-created-task";
    let name = repo_name_for_task(task);
    let _lookup = github
        .mock("GET", format!("/repos/octocat/{name}").as_str())
        .with_status(404)
        .create_async()
        .await;
    let notified = callback
        .mock("POST", "/notify")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "task": task,
            "round": 2,
            "status": "error",
            "stage": "publication",
        })))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let app = test_app(github.url());
    let body = deploy_body(task, 2, &format!("{}/notify", callback.url()));
    let (status, json) = post_json(app, "/api/deploy", body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("publication"));
    assert!(message.contains("no repository found"));
    notified.assert_async().await;
}

#[tokio::test]
async fn round_two_revises_the_round_one_repository() {
    let mut github = mockito::Server::new_async().await;
    let mut callback = mockito::Server::new_async().await;

    let task = "clock-app-revise";
    let name = repo_name_for_task(task);
    let _exists = github
        .mock("GET", format!("/repos/octocat/{name}").as_str())
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let _contents = github
        .mock(
            "GET",
            mockito::Matcher::Regex(format!("^/repos/octocat/{name}/contents/.+$")),
        )
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(serde_json::json!({"sha": "blob0", "content": "PGh0bWwvPg=="}).to_string())
        .create_async()
        .await;
    let puts = github
        .mock(
            "PUT",
            mockito::Matcher::Regex(format!("^/repos/octocat/{name}/contents/.+$")),
        )
        .match_body(mockito::Matcher::PartialJson(
            serde_json::json!({"sha": "blob0"}),
        ))
        .with_status(200)
        .with_body(
            serde_json::json!({"content": {"sha": "blob2"}, "commit": {"sha": "commit2"}})
                .to_string(),
        )
        .expect(2)
        .create_async()
        .await;
    let _patch = github
        .mock("PATCH", format!("/repos/octocat/{name}").as_str())
        .with_status(200)
        .create_async()
        .await;
    let _notified = callback
        .mock("POST", "/notify")
        .with_status(200)
        .create_async()
        .await;

    let app = test_app(github.url());
    let body = deploy_body(task, 2, &format!("{}/notify", callback.url()));
    let (status, json) = post_json(app, "/api/deploy", body).await;

    assert_eq!(status, StatusCode::OK, "body: {json}");
    assert_eq!(json["status"], "success");
    assert_eq!(json["commit_sha"], "commit2");
    assert_eq!(
        json["pages_url"],
        format!("https://octocat.github.io/{name}/")
    );
    puts.assert_async().await;
}

#[tokio::test]
async fn rejected_callback_yields_partial_success() {
    let mut github = mockito::Server::new_async().await;
    let mut callback = mockito::Server::new_async().await;

    let task = "clock-app-partial";
    let _github_mocks = mock_round_one(
        &mut github,
        task,
        "Auto-generated application: Create a page saying Hi",
    )
    .await;
    // A 4xx is permanent: exactly one delivery attempt, no retries.
    let rejected = callback
        .mock("POST", "/notify")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let app = test_app(github.url());
    let body = deploy_body(task, 1, &format!("{}/notify", callback.url()));
    let (status, json) = post_json(app, "/api/deploy", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "partial_success");
    assert!(json["error"].as_str().unwrap().contains("404"));
    assert!(json["repo_url"].as_str().is_some());
    rejected.assert_async().await;
}
