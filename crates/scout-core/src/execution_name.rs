//! Deterministic workflow execution-name derivation.
//!
//! Orchestration services place strict length and character-set constraints
//! on execution names. This module guarantees conformance regardless of
//! arbitrary upstream user-id content while keeping names human-traceable
//! (prefix + search-id fragment + user fragment) for operator lookup.

/// Maximum number of characters of the user id carried into the name.
const USER_ID_SEGMENT_MAX: usize = 20;

/// Number of leading search-id characters carried into the name.
const SEARCH_ID_SEGMENT_LEN: usize = 8;

/// Builds the execution name for a workflow run.
///
/// The output is `"{prefix}-{search_id[:8]}-{safe_user_id}"` where
/// `safe_user_id` is the user id truncated to 20 characters with every
/// character outside `[A-Za-z0-9_-]` removed. The function is total: an
/// empty user id yields an empty trailing segment.
///
/// Names are deliberately not globally unique; two requests sharing an
/// 8-character search-id prefix could collide, in which case the
/// orchestration service rejects the duplicate name and the caller retries
/// with a freshly minted search id.
#[must_use]
pub fn build_execution_name(prefix: &str, search_id: &str, user_id: &str) -> String {
    let safe_user_id: String = user_id
        .chars()
        .take(USER_ID_SEGMENT_MAX)
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    let search_fragment: String = search_id.chars().take(SEARCH_ID_SEGMENT_LEN).collect();

    format!("{prefix}-{search_fragment}-{safe_user_id}")
}
