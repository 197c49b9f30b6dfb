//! Provider-response parsing: pull the markup and README documents out of a
//! free-text completion.

/// Split a completion into `(markup, readme)`.
///
/// Markup is taken from the first ```html fence, else from the first
/// `<!DOCTYPE html>`…`</html>` span, else the whole trimmed response.
/// README comes from the first ```markdown / ```md fence if present.
/// Either side is `None` only when there is nothing usable at all.
pub fn split_response(response: &str) -> (Option<String>, Option<String>) {
    let markup = extract_fenced(response, "```html")
        .or_else(|| extract_doctype_block(response))
        .or_else(|| {
            let trimmed = response.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });

    let readme = extract_fenced(response, "```markdown").or_else(|| extract_fenced(response, "```md"));

    (markup, readme)
}

fn extract_fenced(response: &str, marker: &str) -> Option<String> {
    let start = response.find(marker)? + marker.len();
    let rest = &response[start..];
    let end = rest.find("```")?;
    let body = rest[..end].trim();
    (!body.is_empty()).then(|| body.to_string())
}

fn extract_doctype_block(response: &str) -> Option<String> {
    let start = response.find("<!DOCTYPE html>")?;
    let close = "</html>";
    let end = response[start..].find(close)? + close.len();
    Some(response[start..start + end].trim().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
