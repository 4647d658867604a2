//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    AuthGateway, BlogGateway, CommentRepository, ObjectStorage, PasswordService, PostRepository,
    RateLimiter, TokenService, UserRepository,
};
use quill_core::{Accounts, RepositoryGateway};
use quill_infra::auth::JwtTokenService;
use quill_infra::{
    Argon2PasswordService, FsObjectStorage, InMemoryCommentRepository, InMemoryObjectStorage,
    InMemoryPostRepository, InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
use quill_infra::{
    DatabaseConnections, PostgresCommentRepository, PostgresPostRepository,
    PostgresUserRepository,
};

use crate::config::AppConfig;
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Repository set the gateways are built from.
struct Repositories {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    backend: &'static str,
}

impl Repositories {
    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            comments: Arc::new(InMemoryCommentRepository::new()),
            backend: "memory",
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: &DatabaseConnections) -> Self {
        let db = connections.main.clone();
        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db)),
            backend: "postgres",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<dyn BlogGateway>,
    pub accounts: Arc<dyn AuthGateway>,
    pub users: Arc<dyn UserRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub tokens: Arc<dyn TokenService>,
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    pub trust_proxy_headers: bool,
    /// `"postgres"` or `"memory"`, reported by the health check.
    pub backend: &'static str,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let repos = Self::repositories(config).await;

        let storage: Arc<dyn ObjectStorage> = match &config.storage_root {
            Some(root) => {
                tracing::info!(root = %root.display(), "Storing images on disk");
                Arc::new(FsObjectStorage::new(root, config.public_base_url.clone()))
            }
            None => {
                tracing::warn!("STORAGE_ROOT not set. Uploaded images are kept in memory.");
                Arc::new(InMemoryObjectStorage::new(config.public_base_url.clone()))
            }
        };

        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let mut state = Self::assemble(repos, storage, tokens, passwords)
            .with_rate_limiter(Self::rate_limiter(config));
        state.trust_proxy_headers = config.trust_proxy_headers;

        tracing::info!(backend = state.backend, "Application state initialized");
        state
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> Repositories {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Repositories::in_memory();
        };

        match DatabaseConnections::init(db_config).await {
            Ok(connections) => {
                if config.run_migrations {
                    use migration::MigratorTrait;
                    match migration::Migrator::up(&connections.main, None).await {
                        Ok(()) => tracing::info!("Migrations applied"),
                        Err(e) => tracing::error!(error = %e, "Failed to apply migrations"),
                    }
                }
                Repositories::postgres(&connections)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to connect to database. Using in-memory fallback."
                );
                Repositories::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> Repositories {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Repositories::in_memory()
    }

    #[cfg(feature = "rate-limit")]
    fn rate_limiter(config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
        use quill_infra::{InMemoryRateLimiter, RateLimitConfig};
        use std::time::Duration;

        Some(Arc::new(InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: config.rate_limit_max_requests,
            window: Duration::from_secs(config.rate_limit_window_secs),
        })))
    }

    #[cfg(not(feature = "rate-limit"))]
    fn rate_limiter(_config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
        None
    }

    fn assemble(
        repos: Repositories,
        storage: Arc<dyn ObjectStorage>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        let blog = RepositoryGateway::new(
            repos.users.clone(),
            repos.posts,
            repos.comments,
            storage.clone(),
        );
        let accounts = Accounts::new(repos.users.clone(), passwords, tokens.clone());

        Self {
            blog: Arc::new(blog),
            accounts: Arc::new(accounts),
            users: repos.users,
            storage,
            tokens,
            rate_limiter: None,
            trust_proxy_headers: false,
            backend: repos.backend,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Option<Arc<dyn RateLimiter>>) -> Self {
        self.rate_limiter = limiter;
        self
    }

    /// Middleware guarding the auth routes, when a limiter is configured.
    pub fn auth_rate_limit(&self) -> Option<RateLimitMiddleware> {
        self.rate_limiter.clone().map(|limiter| {
            RateLimitMiddleware::new(limiter).trust_proxy_headers(self.trust_proxy_headers)
        })
    }

    /// Fully in-memory state, used by handler tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        use quill_infra::auth::JwtConfig;

        let tokens = JwtTokenService::new(JwtConfig {
            secret: "handler-test-secret".to_string(),
            expiration_hours: 1,
            issuer: "quill-test".to_string(),
        });
        Self::assemble(
            Repositories::in_memory(),
            Arc::new(InMemoryObjectStorage::new("http://localhost:8080")),
            Arc::new(tokens),
            Arc::new(Argon2PasswordService::new()),
        )
    }
}
