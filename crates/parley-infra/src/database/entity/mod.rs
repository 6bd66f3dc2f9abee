//! SeaORM entities for the `users`, `posts`, `post_tags` and `comments` tables.

pub mod comment;
pub mod post;
pub mod post_tag;
pub mod user;
