use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest title a post may carry, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Longest tag name, in characters.
pub const MAX_TAG_CHARS: usize = 100;

/// Post entity - the publication a discussion hangs off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    /// Lowercase, trimmed, unique.
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new, untagged post.
    pub fn new(author_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            content,
            tags: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_tags(mut self, tags: BTreeSet<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn is_authored_by(&self, principal_id: Uuid) -> bool {
        self.author_id == principal_id
    }

    /// Replace title, body and tags, refreshing `updated_at`. The author never changes.
    pub fn revise(&mut self, title: String, content: String, tags: BTreeSet<String>) {
        self.title = title;
        self.content = content;
        self.tags = tags;
        self.updated_at = Utc::now();
    }

    /// Case-insensitive substring match on title, body or any tag name.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
            || self.tags.iter().any(|tag| tag.contains(needle))
    }

    /// Exact match on a normalized tag name.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Canonical form of a tag name: trimmed and lowercased.
pub fn normalize_tag(raw: &str) -> String {
    raw.trim().to_lowercase()
}
