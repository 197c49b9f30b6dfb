//! Free-text sanitization for fields forwarded to external APIs.
//!
//! GitHub rejects repository descriptions containing control characters with
//! a 422, so every description derived from caller text passes through here
//! before it reaches the API.

/// How much of the brief feeds the repository description. Truncation happens
/// *before* sanitizing so the result cannot exceed the provider's field limit
/// after control characters collapse into spaces.
const MAX_DESCRIPTION_SOURCE_CHARS: usize = 100;

const DESCRIPTION_PREFIX: &str = "Auto-generated application: ";

/// Replace every C0 control, DEL, and C1 control with a space, collapse
/// whitespace runs, and trim. Total and idempotent.
pub fn sanitize(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if is_forbidden_control(c) { ' ' } else { c })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the repository description for a brief: truncate, sanitize, prefix.
pub fn repo_description(brief: &str) -> String {
    let truncated: String = brief.chars().take(MAX_DESCRIPTION_SOURCE_CHARS).collect();
    format!("{DESCRIPTION_PREFIX}{}", sanitize(&truncated))
}

fn is_forbidden_control(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
