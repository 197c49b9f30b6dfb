use serde::Deserialize;

use crate::config::Config;
use crate::error::{DeployError, Result};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// The deploy request exactly as it arrives on the wire. Every field is
/// optional here so validation can name all the missing fields at once
/// instead of failing on the first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDeployRequest {
    pub email: Option<String>,
    pub secret: Option<String>,
    pub task: Option<String>,
    pub round: Option<i64>,
    pub nonce: Option<String>,
    pub brief: Option<String>,
    pub checks: Option<Vec<String>>,
    pub evaluation_url: Option<String>,
    pub attachments: Option<Vec<RawAttachment>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAttachment {
    pub name: Option<String>,
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------
// Validated types
// ---------------------------------------------------------------------------

/// A named attachment carried as a `data:` URI with a base64 payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// A structurally valid, authenticated deployment request.
///
/// The shared secret is checked during validation and deliberately not
/// retained here, so it cannot leak into logs or error messages downstream.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub email: String,
    /// Stable identifier across rounds; the repository name derives from it.
    pub task: String,
    /// 1 = create, 2 = revise. No other value is accepted.
    pub round: u32,
    /// Caller-supplied correlation token, echoed back verbatim.
    pub nonce: String,
    pub brief: String,
    pub checks: Vec<String>,
    pub evaluation_url: String,
    pub attachments: Vec<Attachment>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate structure first, then authenticate against the configured secret.
///
/// Runs before any outbound call: a request that fails here has caused no
/// externally visible side effect.
pub fn validate(raw: &RawDeployRequest, config: &Config) -> Result<DeployRequest> {
    let mut missing = Vec::new();
    let require = |value: &Option<String>, name: &'static str, missing: &mut Vec<&'static str>| {
        if value.as_deref().map(str::trim).unwrap_or("").is_empty() {
            missing.push(name);
        }
    };

    require(&raw.email, "email", &mut missing);
    require(&raw.secret, "secret", &mut missing);
    require(&raw.task, "task", &mut missing);
    require(&raw.nonce, "nonce", &mut missing);
    require(&raw.brief, "brief", &mut missing);
    require(&raw.evaluation_url, "evaluation_url", &mut missing);
    if raw.round.is_none() {
        missing.push("round");
    }
    if !missing.is_empty() {
        return Err(DeployError::MalformedRequest(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    let email = raw.email.as_deref().unwrap_or_default();
    if !email_looks_valid(email) {
        return Err(DeployError::MalformedRequest(
            "invalid email format".to_string(),
        ));
    }

    let round = raw.round.unwrap_or_default();
    if !matches!(round, 1 | 2) {
        return Err(DeployError::MalformedRequest(
            "round must be 1 or 2".to_string(),
        ));
    }

    let evaluation_url = raw.evaluation_url.as_deref().unwrap_or_default();
    if !evaluation_url.starts_with("http") {
        return Err(DeployError::MalformedRequest(
            "evaluation_url must be an HTTP(S) URL".to_string(),
        ));
    }

    let mut attachments = Vec::new();
    for (idx, att) in raw.attachments.iter().flatten().enumerate() {
        let (Some(name), Some(url)) = (att.name.as_deref(), att.url.as_deref()) else {
            return Err(DeployError::MalformedRequest(format!(
                "attachment {idx} must have 'name' and 'url' fields"
            )));
        };
        attachments.push(Attachment {
            name: name.to_string(),
            url: url.to_string(),
        });
    }

    // Authentication comes after the structural checks and before any
    // cost-incurring work. Byte equality, fail closed on empty config.
    let secret = raw.secret.as_deref().unwrap_or_default();
    if config.student_secret.is_empty() || secret != config.student_secret {
        return Err(DeployError::AuthenticationFailed);
    }

    Ok(DeployRequest {
        email: email.to_string(),
        task: raw.task.clone().unwrap_or_default(),
        round: round as u32,
        nonce: raw.nonce.clone().unwrap_or_default(),
        brief: raw.brief.clone().unwrap_or_default(),
        checks: raw.checks.clone().unwrap_or_default(),
        evaluation_url: evaluation_url.to_string(),
        attachments,
    })
}

/// Minimal shape check: an `@` and a dot somewhere in the domain part.
/// No allow-list cross-referencing happens here.
fn email_looks_valid(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeneratorConfig, GithubConfig};

    fn test_config() -> Config {
        Config {
            student_email: "dev@example.com".to_string(),
            student_secret: "s3cret".to_string(),
            github: GithubConfig {
                token: "t".to_string(),
                owner: "octocat".to_string(),
                api_base: "https://api.github.com".to_string(),
            },
            generator: GeneratorConfig::Template,
        }
    }

    fn complete_raw() -> RawDeployRequest {
        RawDeployRequest {
            email: Some("student@example.com".to_string()),
            secret: Some("s3cret".to_string()),
            task: Some("captcha-solver-xyz".to_string()),
            round: Some(1),
            nonce: Some("ab12-cd34".to_string()),
            brief: Some("Create a page saying Hi".to_string()),
            checks: Some(vec!["Page has a title".to_string()]),
            evaluation_url: Some("https://example.com/notify".to_string()),
            attachments: None,
        }
    }

    #[test]
    fn complete_request_validates() {
        let req = validate(&complete_raw(), &test_config()).unwrap();
        assert_eq!(req.task, "captcha-solver-xyz");
        assert_eq!(req.round, 1);
        assert!(req.attachments.is_empty());
    }

    #[test]
    fn missing_brief_is_malformed() {
        let mut raw = complete_raw();
        raw.brief = None;
        let err = validate(&raw, &test_config()).unwrap_err();
        assert!(matches!(err, DeployError::MalformedRequest(m) if m.contains("brief")));
    }

    #[test]
    fn missing_fields_are_all_named() {
        let err = validate(&RawDeployRequest::default(), &test_config()).unwrap_err();
        let DeployError::MalformedRequest(msg) = err else {
            panic!("expected MalformedRequest")
        };
        for field in ["email", "secret", "task", "nonce", "brief", "evaluation_url", "round"] {
            assert!(msg.contains(field), "message should name '{field}': {msg}");
        }
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let mut raw = complete_raw();
        raw.task = Some("  ".to_string());
        let err = validate(&raw, &test_config()).unwrap_err();
        assert!(matches!(err, DeployError::MalformedRequest(m) if m.contains("task")));
    }

    #[test]
    fn round_three_is_malformed() {
        let mut raw = complete_raw();
        raw.round = Some(3);
        let err = validate(&raw, &test_config()).unwrap_err();
        assert!(matches!(err, DeployError::MalformedRequest(m) if m.contains("round")));
    }

    #[test]
    fn round_two_is_accepted() {
        let mut raw = complete_raw();
        raw.round = Some(2);
        assert_eq!(validate(&raw, &test_config()).unwrap().round, 2);
    }

    #[test]
    fn bad_email_is_malformed() {
        for bad in ["not-an-email", "missing@dot", "@example.com"] {
            let mut raw = complete_raw();
            raw.email = Some(bad.to_string());
            let err = validate(&raw, &test_config()).unwrap_err();
            assert!(
                matches!(err, DeployError::MalformedRequest(m) if m.contains("email")),
                "expected email rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn non_http_evaluation_url_is_malformed() {
        let mut raw = complete_raw();
        raw.evaluation_url = Some("ftp://example.com/notify".to_string());
        let err = validate(&raw, &test_config()).unwrap_err();
        assert!(matches!(err, DeployError::MalformedRequest(m) if m.contains("evaluation_url")));
    }

    #[test]
    fn wrong_secret_fails_authentication_even_when_well_formed() {
        let mut raw = complete_raw();
        raw.secret = Some("wrong".to_string());
        let err = validate(&raw, &test_config()).unwrap_err();
        assert!(matches!(err, DeployError::AuthenticationFailed));
    }

    #[test]
    fn unconfigured_secret_fails_closed() {
        let mut config = test_config();
        config.student_secret.clear();
        let mut raw = complete_raw();
        raw.secret = Some("anything".to_string());
        let err = validate(&raw, &config).unwrap_err();
        assert!(matches!(err, DeployError::AuthenticationFailed));
    }

    #[test]
    fn structural_errors_win_over_authentication() {
        let mut raw = complete_raw();
        raw.brief = None;
        raw.secret = Some("wrong".to_string());
        let err = validate(&raw, &test_config()).unwrap_err();
        assert!(matches!(err, DeployError::MalformedRequest(_)));
    }

    #[test]
    fn attachment_without_url_is_malformed() {
        let mut raw = complete_raw();
        raw.attachments = Some(vec![RawAttachment {
            name: Some("data.csv".to_string()),
            url: None,
        }]);
        let err = validate(&raw, &test_config()).unwrap_err();
        assert!(matches!(err, DeployError::MalformedRequest(m) if m.contains("attachment 0")));
    }

    #[test]
    fn attachments_are_carried_through() {
        let mut raw = complete_raw();
        raw.attachments = Some(vec![RawAttachment {
            name: Some("data.csv".to_string()),
            url: Some("data:text/csv;base64,YSxiLGM=".to_string()),
        }]);
        let req = validate(&raw, &test_config()).unwrap();
        assert_eq!(req.attachments.len(), 1);
        assert_eq!(req.attachments[0].name, "data.csv");
    }
}
