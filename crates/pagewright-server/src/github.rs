//! Repository publication against the GitHub REST API.
//!
//! Round 1 creates a public repository, uploads the artifact, and enables
//! pages hosting. Round 2 resolves the same repository (the name is a pure
//! function of the task) and replaces its contents with a fresh commit.
//!
//! Creation and population are sequential contents-API calls, so a failed
//! upload can leave a repository with a partial file set. There is no
//! compensating delete; the next round-2 `put_file` with no prior sha simply
//! creates the missing file.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use pagewright_core::artifact::GeneratedArtifact;
use pagewright_core::config::GithubConfig;
use pagewright_core::outcome::RepoRecord;
use pagewright_core::repo_name::repo_name_for_task;
use pagewright_core::retry::RetryPolicy;
use pagewright_core::{DeployError, Result};

const GITHUB_TIMEOUT: Duration = Duration::from_secs(30);
const API_VERSION: &str = "2022-11-28";
const DEFAULT_BRANCH: &str = "main";
const USER_AGENT: &str = concat!("pagewright/", env!("CARGO_PKG_VERSION"));

pub struct GithubPublisher {
    http: reqwest::Client,
    token: String,
    owner: String,
    api_base: String,
    activation_policy: RetryPolicy,
}

impl GithubPublisher {
    pub fn new(config: &GithubConfig) -> Self {
        Self::with_policy(config, RetryPolicy::hosting_activation())
    }

    pub fn with_policy(config: &GithubConfig, activation_policy: RetryPolicy) -> Self {
        let http = reqwest::Client::builder()
            .timeout(GITHUB_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .expect("infallible: static client configuration");
        Self {
            http,
            token: config.token.clone(),
            owner: config.owner.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            activation_policy,
        }
    }

    // -----------------------------------------------------------------------
    // Round 1: create, upload, enable hosting
    // -----------------------------------------------------------------------

    pub async fn create_and_publish(
        &self,
        task: &str,
        artifact: &GeneratedArtifact,
        description: &str,
    ) -> Result<RepoRecord> {
        let name = repo_name_for_task(task);
        tracing::info!(repo = %name, "creating repository");
        let repo_url = self.create_repo(&name, description).await?;

        let mut commit_sha = String::new();
        for (path, content) in artifact.files() {
            commit_sha = self
                .put_file(&name, path, content, "Deploy generated application", None)
                .await?;
        }
        tracing::info!(repo = %name, commit = %commit_sha, "artifact uploaded");

        self.enable_pages(&name).await?;
        self.await_pages_activation(&name).await?;

        Ok(RepoRecord {
            repo_url,
            pages_url: self.pages_url(&name),
            commit_sha,
            default_branch: DEFAULT_BRANCH.to_string(),
            name,
        })
    }

    // -----------------------------------------------------------------------
    // Round 2: replace contents of the round-1 repository
    // -----------------------------------------------------------------------

    pub async fn update(
        &self,
        task: &str,
        artifact: &GeneratedArtifact,
        description: &str,
    ) -> Result<RepoRecord> {
        let name = repo_name_for_task(task);
        if !self.repo_exists(&name).await? {
            return Err(DeployError::RepositoryNotFound(task.to_string()));
        }

        let mut commit_sha = String::new();
        for (path, content) in [
            ("index.html", artifact.index_html.as_str()),
            ("README.md", artifact.readme.as_str()),
        ] {
            let prior = self.get_contents(&name, path).await?;
            commit_sha = self
                .put_file(
                    &name,
                    path,
                    content,
                    "Revise generated application",
                    prior.as_ref().map(|c| c.sha.as_str()),
                )
                .await?;
        }
        tracing::info!(repo = %name, commit = %commit_sha, "artifact revised");

        // Description refresh is best-effort; the commit already landed.
        if let Err(err) = self.set_description(&name, description).await {
            tracing::warn!(repo = %name, error = %err, "description refresh failed");
        }

        // Hosting was enabled in round 1 and stays enabled; same URL.
        Ok(RepoRecord {
            repo_url: self.repo_url(&name),
            pages_url: self.pages_url(&name),
            commit_sha,
            default_branch: DEFAULT_BRANCH.to_string(),
            name,
        })
    }

    /// Round-2 precondition and prompt context: the currently published
    /// markup, or `None` when the repository exists without an `index.html`
    /// (a round-1 run that died between create and upload).
    pub async fn fetch_prior_markup(&self, task: &str) -> Result<Option<String>> {
        let name = repo_name_for_task(task);
        if !self.repo_exists(&name).await? {
            return Err(DeployError::RepositoryNotFound(task.to_string()));
        }
        Ok(self
            .get_contents(&name, "index.html")
            .await?
            .and_then(|c| c.text))
    }

    // -----------------------------------------------------------------------
    // URL derivation
    // -----------------------------------------------------------------------

    pub fn pages_url(&self, name: &str) -> String {
        format!("https://{}.github.io/{}/", self.owner, name)
    }

    fn repo_url(&self, name: &str) -> String {
        format!("https://github.com/{}/{}", self.owner, name)
    }

    // -----------------------------------------------------------------------
    // REST calls
    // -----------------------------------------------------------------------

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.api_base))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn create_repo(&self, name: &str, description: &str) -> Result<String> {
        #[derive(Serialize)]
        struct CreateRepoBody<'a> {
            name: &'a str,
            description: &'a str,
            private: bool,
            has_issues: bool,
            has_wiki: bool,
            auto_init: bool,
        }
        #[derive(Deserialize)]
        struct CreateRepoResponse {
            html_url: String,
        }

        let response = self
            .request(reqwest::Method::POST, "/user/repos")
            .json(&CreateRepoBody {
                name,
                description,
                private: false,
                has_issues: true,
                has_wiki: false,
                auto_init: false,
            })
            .send()
            .await
            .map_err(|e| DeployError::RepositoryCreation(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let parsed: CreateRepoResponse = response
                .json()
                .await
                .map_err(|e| DeployError::RepositoryCreation(e.to_string()))?;
            return Ok(parsed.html_url);
        }

        let body = response.text().await.unwrap_or_default();
        Err(if status.as_u16() == 422 {
            DeployError::RepositoryCreation(format!(
                "repository '{name}' already exists or was rejected: {body}"
            ))
        } else {
            DeployError::RepositoryCreation(format!("create returned status {status}: {body}"))
        })
    }

    /// Create or replace one file on the default branch, returning the new
    /// commit sha. `prior_sha` must be the current blob sha when replacing.
    async fn put_file(
        &self,
        repo: &str,
        path: &str,
        content: &str,
        message: &str,
        prior_sha: Option<&str>,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct PutContentsBody<'a> {
            message: &'a str,
            content: String,
            branch: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            sha: Option<&'a str>,
        }
        #[derive(Deserialize)]
        struct PutContentsResponse {
            commit: CommitRef,
        }
        #[derive(Deserialize)]
        struct CommitRef {
            sha: String,
        }

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/repos/{}/{repo}/contents/{path}", self.owner),
            )
            .json(&PutContentsBody {
                message,
                content: base64::engine::general_purpose::STANDARD.encode(content.as_bytes()),
                branch: DEFAULT_BRANCH,
                sha: prior_sha,
            })
            .send()
            .await
            .map_err(|e| DeployError::Publish(format!("upload of {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeployError::Publish(format!(
                "upload of {path} returned status {status}: {body}"
            )));
        }
        let parsed: PutContentsResponse = response
            .json()
            .await
            .map_err(|e| DeployError::Publish(format!("upload of {path} failed: {e}")))?;
        Ok(parsed.commit.sha)
    }

    async fn repo_exists(&self, name: &str) -> Result<bool> {
        let response = self
            .request(reqwest::Method::GET, &format!("/repos/{}/{name}", self.owner))
            .send()
            .await
            .map_err(|e| DeployError::Publish(e.to_string()))?;
        match response.status() {
            s if s.is_success() => Ok(true),
            s if s.as_u16() == 404 => Ok(false),
            s => {
                let body = response.text().await.unwrap_or_default();
                Err(DeployError::Publish(format!(
                    "repository lookup returned status {s}: {body}"
                )))
            }
        }
    }

    async fn get_contents(&self, repo: &str, path: &str) -> Result<Option<FileContents>> {
        #[derive(Deserialize)]
        struct ContentsResponse {
            sha: String,
            #[serde(default)]
            content: String,
        }

        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/repos/{}/{repo}/contents/{path}", self.owner),
            )
            .query(&[("ref", DEFAULT_BRANCH)])
            .send()
            .await
            .map_err(|e| DeployError::Publish(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeployError::Publish(format!(
                "contents lookup of {path} returned status {status}: {body}"
            )));
        }

        let parsed: ContentsResponse = response
            .json()
            .await
            .map_err(|e| DeployError::Publish(e.to_string()))?;
        // The contents API wraps base64 at 60 columns; strip before decoding.
        let stripped: String = parsed.content.split_whitespace().collect();
        let text = base64::engine::general_purpose::STANDARD
            .decode(stripped)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok());
        Ok(Some(FileContents {
            sha: parsed.sha,
            text,
        }))
    }

    async fn set_description(&self, name: &str, description: &str) -> Result<()> {
        #[derive(Serialize)]
        struct PatchRepoBody<'a> {
            description: &'a str,
        }

        let response = self
            .request(reqwest::Method::PATCH, &format!("/repos/{}/{name}", self.owner))
            .json(&PatchRepoBody { description })
            .send()
            .await
            .map_err(|e| DeployError::Publish(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeployError::Publish(format!(
                "description update returned status {status}"
            )));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pages hosting
    // -----------------------------------------------------------------------

    async fn enable_pages(&self, name: &str) -> Result<()> {
        #[derive(Serialize)]
        struct PagesBody<'a> {
            source: PagesSource<'a>,
        }
        #[derive(Serialize)]
        struct PagesSource<'a> {
            branch: &'a str,
            path: &'a str,
        }

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/repos/{}/{name}/pages", self.owner),
            )
            .json(&PagesBody {
                source: PagesSource {
                    branch: DEFAULT_BRANCH,
                    path: "/",
                },
            })
            .send()
            .await
            .map_err(|e| DeployError::HostingEnable(e.to_string()))?;

        match response.status().as_u16() {
            201 | 204 => Ok(()),
            // Already enabled — round-1 retried after a partial failure.
            409 => {
                tracing::debug!(repo = %name, "pages already enabled");
                Ok(())
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                Err(DeployError::HostingEnable(format!(
                    "pages enable returned status {s}: {body}"
                )))
            }
        }
    }

    /// Activation is asynchronous on the provider side: poll the pages
    /// endpoint until it reports a site, bounded by the activation policy.
    async fn await_pages_activation(&self, name: &str) -> Result<()> {
        let mut last_error = String::new();
        for attempt in 0..self.activation_policy.max_attempts {
            let result = self
                .request(
                    reqwest::Method::GET,
                    &format!("/repos/{}/{name}/pages", self.owner),
                )
                .send()
                .await;
            match result {
                Ok(r) if r.status().is_success() => {
                    tracing::info!(repo = %name, "pages site active");
                    return Ok(());
                }
                Ok(r) => last_error = format!("status {}", r.status()),
                Err(e) => last_error = e.to_string(),
            }
            if !self.activation_policy.is_final_attempt(attempt) {
                tokio::time::sleep(self.activation_policy.delay_after(attempt)).await;
            }
        }
        Err(DeployError::HostingEnable(format!(
            "pages site for '{name}' did not become active: {last_error}"
        )))
    }
}

struct FileContents {
    sha: String,
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
