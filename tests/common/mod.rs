#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;

use supportdesk::app::{build_router, AppState};
use supportdesk::config::{AppConfig, RateLimitConfig};
use supportdesk::db::models::{Article, Category};
use supportdesk::db::repository::{ArticleRepository, InMemoryArticleRepository};
use supportdesk::error::AppError;
use supportdesk::seed;

/// Holds a seeded article store and provides the Axum router for integration tests.
pub struct TestEnv {
    pub router: Router,
    pub repo: Arc<dyn ArticleRepository>,
}

impl TestEnv {
    /// Build a router over an in-memory store seeded with the sample knowledge base.
    ///
    /// Rate limiting is disabled.
    pub async fn start() -> Self {
        let repo: Arc<dyn ArticleRepository> = Arc::new(InMemoryArticleRepository::new());
        let kb = seed::load_knowledge_base(None).expect("Failed to load sample knowledge base");
        seed::seed_knowledge_base(repo.as_ref(), kb)
            .await
            .expect("Failed to seed knowledge base");

        Self::with_repo(repo, RateLimitConfig::disabled())
    }

    /// Build a router over an arbitrary store.
    pub fn with_repo(repo: Arc<dyn ArticleRepository>, rate_limit: RateLimitConfig) -> Self {
        let config = AppConfig {
            rate_limit,
            ..AppConfig::default()
        };
        let router = build_router(AppState::new(repo.clone()), &config)
            .expect("Failed to build router");

        Self { router, repo }
    }

    /// A router whose store fails every call.
    pub fn unavailable() -> Self {
        Self::with_repo(Arc::new(FailingRepository), RateLimitConfig::disabled())
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }
}

/// Store that is always down.
pub struct FailingRepository;

fn down() -> AppError {
    AppError::Database("connection refused".into())
}

#[async_trait]
impl ArticleRepository for FailingRepository {
    async fn list_articles(&self) -> Result<Vec<Article>, AppError> {
        Err(down())
    }

    async fn record_view(&self, _id: u32) -> Result<Option<Article>, AppError> {
        Err(down())
    }

    async fn upsert(&self, _article: Article) -> Result<(), AppError> {
        Err(down())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        Err(down())
    }

    async fn replace_categories(&self, _categories: Vec<Category>) -> Result<(), AppError> {
        Err(down())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Err(down())
    }
}

/// Ids of the articles in a JSON array, in order.
pub fn ids(articles: &serde_json::Value) -> Vec<u64> {
    articles
        .as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|a| a["id"].as_u64().expect("article without id"))
        .collect()
}
