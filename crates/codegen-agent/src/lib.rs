//! `codegen-agent` — the code generation adapter.
//!
//! Turns an application brief into a [`GeneratedArtifact`] by delegating to
//! exactly one configured generative backend, falling back to a static
//! template whenever the backend is unavailable or unusable.
//!
//! ```text
//! GenerationInput
//!     │  decode attachments (bad ones dropped with a warning)
//!     ▼
//! prompt::build      ← brief + checks + attachments (+ prior markup on revision)
//!     │
//!     ▼
//! Generator backend  ← one attempt, no retry
//!     │  on any error: template fallback
//!     ▼
//! parse::split_response → GeneratedArtifact (always complete)
//! ```

pub mod attachments;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod provider;
pub mod template;

use pagewright_core::config::GeneratorConfig;
use pagewright_core::request::Attachment;
use pagewright_core::GeneratedArtifact;

pub use error::CodegenError;
pub use provider::{AnthropicClient, OpenRouterClient};

// ---------------------------------------------------------------------------
// GenerationInput
// ---------------------------------------------------------------------------

/// Everything generation needs for one request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationInput<'a> {
    pub brief: &'a str,
    pub checks: &'a [String],
    pub attachments: &'a [Attachment],
    /// The currently published markup when revising (round 2); `None` on
    /// initial creation. Present so revisions are expressed against the
    /// existing page instead of regenerated from scratch.
    pub prior_markup: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// The configured generation backend. One variant is selected at startup
/// from [`GeneratorConfig`]; request handling never re-inspects the
/// environment to pick a provider.
pub enum Generator {
    OpenRouter(OpenRouterClient),
    Anthropic(AnthropicClient),
    Template,
}

impl Generator {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        match config {
            GeneratorConfig::OpenRouter {
                api_key,
                api_base,
                model,
            } => Generator::OpenRouter(OpenRouterClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            )),
            GeneratorConfig::Anthropic {
                api_key,
                api_base,
                model,
            } => Generator::Anthropic(AnthropicClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            )),
            GeneratorConfig::Template => Generator::Template,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Generator::OpenRouter(_) => "openrouter",
            Generator::Anthropic(_) => "anthropic",
            Generator::Template => "template",
        }
    }

    /// Produce the artifact for a brief. Total: provider failures degrade to
    /// the template, and the returned artifact is always complete.
    pub async fn generate(&self, input: GenerationInput<'_>) -> GeneratedArtifact {
        let decoded = attachments::decode_all(input.attachments);
        let instruction = prompt::build(input.brief, input.checks, &decoded, input.prior_markup);

        let completion = if matches!(self, Generator::Template) {
            tracing::debug!("no generation backend configured, using template");
            None
        } else {
            match self.complete(&instruction).await {
                Ok(text) => Some(text),
                Err(err) => {
                    tracing::warn!(
                        backend = self.backend_name(),
                        error = %err,
                        "generation backend failed, using template fallback"
                    );
                    None
                }
            }
        };

        let (markup, readme) = match completion.as_deref() {
            Some(text) => parse::split_response(text),
            None => (None, None),
        };

        GeneratedArtifact {
            index_html: markup.unwrap_or_else(|| template::index_html(input.brief)),
            readme: readme.unwrap_or_else(|| template::readme(input.brief, input.checks)),
            license: template::mit_license(),
        }
    }

    async fn complete(&self, instruction: &str) -> error::Result<String> {
        match self {
            Generator::OpenRouter(client) => client.complete(instruction).await,
            Generator::Anthropic(client) => client.complete(instruction).await,
            // Unreachable from `generate`, which short-circuits Template.
            Generator::Template => Err(CodegenError::EmptyResponse),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
