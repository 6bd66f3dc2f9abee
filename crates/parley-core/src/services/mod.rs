//! Services - the use cases, written against ports only.

mod discussion;
mod posts;

pub use discussion::DiscussionManager;
pub use posts::{DEFAULT_PAGE_SIZE, PostService};

use crate::error::DomainError;

/// Trim `raw` and reject it if nothing is left.
///
/// Stored text is always the trimmed form.
pub(crate) fn require_text(field: &str, raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
