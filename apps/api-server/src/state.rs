//! Application state - shared across all handlers.

use std::sync::Arc;

use parley_core::ports::{
    CommentRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use parley_core::{DiscussionManager, PostService};
use parley_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: PostService,
    pub discussion: DiscussionManager,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

/// The three repositories the services are wired from.
struct Repositories {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            posts: store.clone(),
            comments: store,
        }
    }

    #[cfg(feature = "postgres")]
    async fn postgres(
        config: &parley_infra::DatabaseConfig,
        auto_migrate: bool,
    ) -> Result<Self, parley_infra::database::DbErr> {
        use migration::{Migrator, MigratorTrait};
        use parley_infra::{
            PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
        };

        let conn = parley_infra::connect(config).await?;
        if auto_migrate {
            Migrator::up(&conn, None).await?;
            tracing::info!("Database migrations applied");
        }

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn)),
        })
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let repos = match &config.database {
            Some(db_config) => match Repositories::postgres(db_config, config.auto_migrate).await {
                Ok(repos) => repos,
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Repositories::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Repositories::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let repos = {
            tracing::info!("Running without postgres feature - using in-memory store");
            Repositories::in_memory()
        };

        if config.jwt.uses_default_secret() && AppConfig::is_production() {
            tracing::error!(
                "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
            );
        }

        let state = Self::from_parts(
            repos,
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            config.posts_per_page,
        );

        tracing::info!("Application state initialized");
        state
    }

    /// In-memory state around the given token service.
    #[cfg(test)]
    pub fn in_memory(tokens: Arc<dyn TokenService>, posts_per_page: u64) -> Self {
        Self::from_parts(Repositories::in_memory(), tokens, posts_per_page)
    }

    fn from_parts(repos: Repositories, tokens: Arc<dyn TokenService>, posts_per_page: u64) -> Self {
        Self {
            users: repos.users,
            posts: PostService::new(repos.posts.clone()).with_page_size(posts_per_page),
            discussion: DiscussionManager::new(repos.posts, repos.comments),
            tokens,
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }
}
