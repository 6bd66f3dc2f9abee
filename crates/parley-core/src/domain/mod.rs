//! Domain entities - the core business objects.

mod comment;
mod page;
mod post;
mod thread;
mod user;

pub use comment::Comment;
pub use page::Page;
pub use post::{MAX_TAG_CHARS, MAX_TITLE_CHARS, Post, normalize_tag};
pub use thread::{CommentThread, build_threads};
pub use user::User;
