//! Guess evaluation.

/// Returns `true` if `candidate` names the secret word.
///
/// Comparison is case-insensitive and otherwise exact: surrounding
/// whitespace counts. An empty secret never matches.
pub fn matches(secret: &str, candidate: &str) -> bool {
    !secret.is_empty() && secret.to_lowercase() == candidate.to_lowercase()
}
