//! Category decision table

use crate::verifier::types::Category;

/// Map probe signals to a category
///
/// Order matters: a failed probe is Bad no matter what else was observed,
/// then a surfaced secondary error, then catch-all, and only a clean accept
/// is Good.
pub fn classify(valid: bool, catch_all: bool, error: Option<&str>) -> Category {
    if !valid {
        Category::Bad
    } else if matches!(error, Some(e) if !e.is_empty()) {
        Category::Risky
    } else if catch_all {
        Category::Risky
    } else {
        Category::Good
    }
}
