//! Generation-instruction assembly.

use crate::attachments::{AttachmentContent, DecodedAttachment};

/// How much of a text attachment is inlined into the instruction.
const ATTACHMENT_EXCERPT_CHARS: usize = 500;

pub const SYSTEM_PROMPT: &str =
    "You are an expert web developer who creates clean, production-ready code.";

/// Build the user instruction from the brief, the acceptance checks, the
/// decoded attachments, and — when revising — the currently published markup.
pub fn build(
    brief: &str,
    checks: &[String],
    attachments: &[DecodedAttachment],
    prior_markup: Option<&str>,
) -> String {
    let mut prompt = String::new();

    match prior_markup {
        Some(markup) => {
            prompt.push_str(
                "Revise the existing single-page web application below to satisfy the \
                 updated requirements. Express the revision as targeted changes: keep \
                 working behavior the brief does not ask to change.\n\nBRIEF:\n",
            );
            prompt.push_str(brief);
            prompt.push_str("\n\nCURRENT APPLICATION (index.html):\n```html\n");
            prompt.push_str(markup);
            prompt.push_str("\n```\n");
        }
        None => {
            prompt.push_str(
                "Generate a complete, production-ready single-page web application \
                 based on the following requirements:\n\nBRIEF:\n",
            );
            prompt.push_str(brief);
            prompt.push('\n');
        }
    }

    if !attachments.is_empty() {
        prompt.push_str("\nATTACHMENTS:\n");
        for att in attachments {
            prompt.push_str(&format!("- {} ({})\n", att.name, att.mime_type));
            if let AttachmentContent::Text(text) = &att.content {
                let excerpt: String = text.chars().take(ATTACHMENT_EXCERPT_CHARS).collect();
                prompt.push_str(&format!("  Content: {excerpt}\n"));
            }
        }
    }

    if !checks.is_empty() {
        prompt.push_str("\nVALIDATION CHECKS:\n");
        for check in checks {
            prompt.push_str(&format!("- {check}\n"));
        }
    }

    prompt.push_str(
        "\nREQUIREMENTS:\n\
         1. Create a single HTML file (index.html) with embedded CSS and JavaScript\n\
         2. Use modern, semantic HTML5\n\
         3. Include responsive design (mobile-friendly)\n\
         4. Use Bootstrap 5 from CDN for styling (unless specified otherwise)\n\
         5. Handle errors gracefully\n\
         6. Ensure all validation checks can pass\n\
         7. Include proper meta tags and title\n\n\
         OUTPUT FORMAT:\n\
         Provide the complete page inside a ```html code fence, and a README.md \
         inside a ```markdown code fence explaining what the application does, \
         how to use it, and how it satisfies the requirements.\n\
         Generate ONLY production-ready, working code. No placeholders, no TODOs.",
    );

    prompt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
