//! Deterministic task → repository-name transform.
//!
//! The name is a pure function of the task identifier: round 2 recomputes it
//! and lands on exactly the round-1 repository without any lookup table.

use sha2::{Digest, Sha256};

/// Slug budget before the hash suffix; GitHub caps names at 100 chars and
/// `<slug>-<8 hex>` must stay comfortably inside it.
const MAX_SLUG_LEN: usize = 60;

/// Derive the repository name for a task.
///
/// Lowercases, maps spaces/underscores to hyphens, drops everything that is
/// not ASCII alphanumeric or a hyphen, trims hyphens, and appends the first
/// 8 hex chars of SHA-256 of the raw task. The suffix keeps distinct tasks
/// whose slugs collide on distinct repositories, and gives fully scrubbed
/// tasks (e.g. all punctuation) a stable non-empty name.
pub fn repo_name_for_task(task: &str) -> String {
    let slug: String = task
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(MAX_SLUG_LEN)
        .collect();
    let slug = slug.trim_matches('-');

    let digest = Sha256::digest(task.as_bytes());
    let suffix: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();

    if slug.is_empty() {
        format!("task-{suffix}")
    } else {
        format!("{slug}-{suffix}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
