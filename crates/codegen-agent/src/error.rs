use thiserror::Error;

/// Errors internal to the generation adapter. None of these escape
/// `Generator::generate` — every variant routes to the template fallback.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("provider response contained no completion text")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, CodegenError>;
