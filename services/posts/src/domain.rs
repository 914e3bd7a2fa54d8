// Domain layer modules
pub mod identity;
pub mod post;

// Re-exports
pub use identity::{current_timestamp, generate_post_id};
pub use post::{Attributes, Post, PostChanges, PostError};
