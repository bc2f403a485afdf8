//! Client-side matching for list-then-filter lookups.

/// Compares two names ignoring case across all of Unicode, not just ASCII.
pub(crate) fn names_match(left: &str, right: &str) -> bool {
    left.chars()
        .flat_map(char::to_lowercase)
        .eq(right.chars().flat_map(char::to_lowercase))
}
