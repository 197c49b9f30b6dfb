use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// GeneratorConfig
// ---------------------------------------------------------------------------

/// Which generative text backend to use, decided once at startup.
///
/// Components never branch on ambient environment at request time; the
/// selected variant is baked into the generator when the process starts.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorConfig {
    /// OpenRouter-compatible chat-completions endpoint (aipipe and friends).
    OpenRouter {
        api_key: String,
        api_base: String,
        model: String,
    },
    /// Anthropic messages API.
    Anthropic {
        api_key: String,
        api_base: String,
        model: String,
    },
    /// No provider configured — every request uses the static template.
    Template,
}

// ---------------------------------------------------------------------------
// GithubConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub token: String,
    /// Account that owns created repositories; also the pages subdomain.
    pub owner: String,
    /// REST API base, overridable for tests.
    pub api_base: String,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

/// Immutable process configuration, read from the environment exactly once
/// at startup and injected into each component at construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity echoed back to the evaluation callback.
    pub student_email: String,
    /// Shared secret inbound requests must match byte-for-byte.
    pub student_secret: String,
    pub github: GithubConfig,
    pub generator: GeneratorConfig,
}

impl Config {
    /// Snapshot the environment into a `Config`.
    ///
    /// Missing variables produce empty fields rather than a startup failure;
    /// `validate()` reports them so the operator sees exactly what is wrong
    /// while the service still answers health checks.
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).unwrap_or_default();
        let var_or = |key: &str, default: &str| {
            std::env::var(key).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
        };

        // Provider priority mirrors deployment practice: the aggregator key
        // wins, then a direct Anthropic key, else the template fallback.
        let generator = if !var("AIPIPE_API_KEY").is_empty() {
            GeneratorConfig::OpenRouter {
                api_key: var("AIPIPE_API_KEY"),
                api_base: var_or("AIPIPE_API_BASE", "https://aipipe.org/openrouter/v1"),
                model: var_or("GENERATION_MODEL", "anthropic/claude-3.5-sonnet"),
            }
        } else if !var("ANTHROPIC_API_KEY").is_empty() {
            GeneratorConfig::Anthropic {
                api_key: var("ANTHROPIC_API_KEY"),
                api_base: var_or("ANTHROPIC_API_BASE", "https://api.anthropic.com"),
                model: var_or("GENERATION_MODEL", "claude-3-5-sonnet-20241022"),
            }
        } else {
            GeneratorConfig::Template
        };

        Self {
            student_email: var("STUDENT_EMAIL"),
            student_secret: var("STUDENT_SECRET"),
            github: GithubConfig {
                token: var("GITHUB_TOKEN"),
                owner: var("GITHUB_USERNAME"),
                api_base: var_or("GITHUB_API_BASE", "https://api.github.com"),
            },
            generator,
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.student_secret.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "STUDENT_SECRET is not set — every request will be rejected with 403"
                    .to_string(),
            });
        }
        if self.student_email.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "STUDENT_EMAIL is not set".to_string(),
            });
        }
        if self.github.token.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "GITHUB_TOKEN is not set — repository publication will fail".to_string(),
            });
        }
        if self.github.owner.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "GITHUB_USERNAME is not set — repository publication will fail"
                    .to_string(),
            });
        }
        if self.generator == GeneratorConfig::Template {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no generation provider configured — template fallback only".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
