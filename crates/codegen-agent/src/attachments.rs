//! Attachment decoding.
//!
//! Attachments arrive as `data:` URIs with base64 payloads. A bad attachment
//! never fails the pipeline: it is logged and dropped, and generation
//! proceeds with whatever decoded cleanly.

use base64::Engine;
use pagewright_core::request::Attachment;

/// Decoded size cap per attachment. Anything larger is dropped like an
/// undecodable one.
const MAX_DECODED_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAttachment {
    pub name: String,
    pub mime_type: String,
    pub content: AttachmentContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentContent {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("not a data: URI")]
    NotDataUri,
    #[error("data URI has no comma separator")]
    MissingPayload,
    #[error("payload is not base64 encoded")]
    NotBase64,
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded size {0} exceeds the {MAX_DECODED_BYTES}-byte limit")]
    TooLarge(usize),
}

/// Decode every attachment, dropping the ones that fail with a warning.
pub fn decode_all(attachments: &[Attachment]) -> Vec<DecodedAttachment> {
    let mut decoded = Vec::with_capacity(attachments.len());
    for attachment in attachments {
        match decode(attachment) {
            Ok(d) => decoded.push(d),
            Err(err) => {
                tracing::warn!(
                    name = %attachment.name,
                    error = %err,
                    "dropping attachment that failed to decode"
                );
            }
        }
    }
    decoded
}

/// Decode one `data:<mime>;base64,<payload>` URI.
pub fn decode(attachment: &Attachment) -> Result<DecodedAttachment, DecodeError> {
    let rest = attachment
        .url
        .strip_prefix("data:")
        .ok_or(DecodeError::NotDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(DecodeError::MissingPayload)?;

    let (mime_type, is_base64) = match header.split_once(';') {
        Some((mime, params)) => (mime, params.split(';').any(|p| p == "base64")),
        None => (header, false),
    };
    if !is_base64 {
        return Err(DecodeError::NotBase64);
    }
    let mime_type = if mime_type.is_empty() { "text/plain" } else { mime_type };

    let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
    if bytes.len() > MAX_DECODED_BYTES {
        return Err(DecodeError::TooLarge(bytes.len()));
    }

    let content = if is_textual(mime_type) {
        match String::from_utf8(bytes) {
            Ok(text) => AttachmentContent::Text(text),
            Err(err) => AttachmentContent::Binary(err.into_bytes()),
        }
    } else {
        AttachmentContent::Binary(bytes)
    };

    Ok(DecodedAttachment {
        name: attachment.name.clone(),
        mime_type: mime_type.to_string(),
        content,
    })
}

fn is_textual(mime_type: &str) -> bool {
    mime_type.starts_with("text/")
        || matches!(mime_type, "application/json" | "application/javascript")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
