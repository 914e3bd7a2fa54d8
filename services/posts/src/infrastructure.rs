// Infrastructure layer modules
pub mod config;
pub mod item_codec;
pub mod logging;
pub mod post_repository;

// Re-exports
pub use config::{DynamoDbConfig, DynamoDbConfigError};
pub use logging::init_logging;
pub use post_repository::{DynamoPostRepository, PostRepository, RepositoryError};
