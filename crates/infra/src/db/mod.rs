pub mod comments_repo;
pub mod likes_repo;
pub mod migrations;
pub mod pool;
pub mod posts_repo;
pub mod reset_tokens_repo;
pub mod users_repo;

pub use migrations::run_migrations;
pub use pool::{connect_lazy, DbPool, DbPoolError};
