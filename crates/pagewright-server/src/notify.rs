//! Outcome delivery to the caller's evaluation endpoint.
//!
//! Transport failures and 5xx responses are retried under the shared backoff
//! policy. A 4xx is a permanent rejection: the endpoint saw the request and
//! refused it, so retrying the same body cannot help.

use std::time::Duration;

use pagewright_core::outcome::DeployOutcome;
use pagewright_core::retry::RetryPolicy;
use pagewright_core::{DeployError, Result};

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Notifier {
    http: reqwest::Client,
    policy: RetryPolicy,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::notification())
    }

    pub fn with_policy(policy: RetryPolicy) -> Self {
        let http = reqwest::Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .expect("infallible: static client configuration");
        Self { http, policy }
    }

    /// POST the outcome to `url`. Returns `Ok` after the first 2xx; exhausting
    /// the policy or hitting a 4xx is an error the caller records but never
    /// escalates — the deployment itself already concluded.
    pub async fn notify(&self, url: &str, outcome: &DeployOutcome) -> Result<()> {
        let mut last_error = String::new();
        for attempt in 0..self.policy.max_attempts {
            match self.http.post(url).json(outcome).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::info!(url, attempt = attempt + 1, "evaluation callback delivered");
                    return Ok(());
                }
                Ok(response) if response.status().is_client_error() => {
                    return Err(DeployError::NotificationDelivery(format!(
                        "callback rejected with status {}",
                        response.status()
                    )));
                }
                Ok(response) => {
                    last_error = format!("callback returned status {}", response.status());
                }
                Err(err) => {
                    last_error = format!("callback request failed: {err}");
                }
            }
            if !self.policy.is_final_attempt(attempt) {
                let delay = self.policy.delay_after(attempt);
                tracing::debug!(
                    url,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "retrying evaluation callback"
                );
                tokio::time::sleep(delay).await;
            }
        }
        Err(DeployError::NotificationDelivery(format!(
            "gave up after {} attempts: {last_error}",
            self.policy.max_attempts
        )))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
