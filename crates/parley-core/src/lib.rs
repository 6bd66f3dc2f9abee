//! # Parley Core
//!
//! The domain layer of the Parley discussion backend.
//! Entities, ports and services live here; nothing in this crate knows
//! which database or token format sits behind the ports.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::{DiscussionManager, PostService};
