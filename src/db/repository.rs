use std::sync::Mutex;

use async_trait::async_trait;

use crate::db::models::{Article, Category};
use crate::error::AppError;

/// Repository trait for knowledge-base articles and their categories.
///
/// This trait allows mocking the database layer in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// List all articles in insertion order.
    async fn list_articles(&self) -> Result<Vec<Article>, AppError>;

    /// Increment the view counter of an article and return the updated article.
    async fn record_view(&self, id: u32) -> Result<Option<Article>, AppError>;

    /// Create a new article or replace an existing one (matched by id).
    async fn upsert(&self, article: Article) -> Result<(), AppError>;

    /// List the declared categories, highest priority first.
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;

    /// Replace the declared category list.
    async fn replace_categories(&self, categories: Vec<Category>) -> Result<(), AppError>;

    /// Number of stored articles.
    async fn count(&self) -> Result<u64, AppError>;
}

/// In-process article store, used for local development and tests.
///
/// Articles keep the order in which they were first inserted; an upsert of
/// an existing id replaces the article in place.
#[derive(Default)]
pub struct InMemoryArticleRepository {
    articles: Mutex<Vec<Article>>,
    categories: Mutex<Vec<Category>>,
}

impl InMemoryArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_articles(&self) -> Result<std::sync::MutexGuard<'_, Vec<Article>>, AppError> {
        self.articles
            .lock()
            .map_err(|_| AppError::Database("article store lock poisoned".into()))
    }

    fn lock_categories(&self) -> Result<std::sync::MutexGuard<'_, Vec<Category>>, AppError> {
        self.categories
            .lock()
            .map_err(|_| AppError::Database("category store lock poisoned".into()))
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn list_articles(&self) -> Result<Vec<Article>, AppError> {
        Ok(self.lock_articles()?.clone())
    }

    async fn record_view(&self, id: u32) -> Result<Option<Article>, AppError> {
        let mut articles = self.lock_articles()?;
        Ok(articles.iter_mut().find(|a| a.id == id).map(|article| {
            article.views += 1;
            article.clone()
        }))
    }

    async fn upsert(&self, article: Article) -> Result<(), AppError> {
        let mut articles = self.lock_articles()?;
        match articles.iter_mut().find(|a| a.id == article.id) {
            Some(existing) => *existing = article,
            None => articles.push(article),
        }
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let mut categories = self.lock_categories()?.clone();
        categories.sort_by_key(|c| c.priority);
        Ok(categories)
    }

    async fn replace_categories(&self, categories: Vec<Category>) -> Result<(), AppError> {
        *self.lock_categories()? = categories;
        Ok(())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.lock_articles()?.len() as u64)
    }
}

/// MongoDB implementation of the ArticleRepository.
///
/// Insertion order is the article id order: the knowledge base assigns ids
/// sequentially as articles are published.
#[cfg(feature = "server")]
pub struct MongoArticleRepository {
    articles: mongodb::Collection<Article>,
    categories: mongodb::Collection<Category>,
}

#[cfg(feature = "server")]
impl MongoArticleRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            articles: db.collection("articles"),
            categories: db.collection("categories"),
        }
    }
}

#[cfg(feature = "server")]
#[async_trait]
impl ArticleRepository for MongoArticleRepository {
    async fn list_articles(&self) -> Result<Vec<Article>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder().sort(doc! { "id": 1 }).build();

        let cursor = self
            .articles
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn record_view(&self, id: u32) -> Result<Option<Article>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.articles
            .find_one_and_update(doc! { "id": i64::from(id) }, doc! { "$inc": { "views": 1_i64 } })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert(&self, article: Article) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::ReplaceOptions;

        let filter = doc! { "id": i64::from(article.id) };
        let options = ReplaceOptions::builder().upsert(true).build();

        self.articles
            .replace_one(filter, &article)
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder().sort(doc! { "priority": 1 }).build();

        let cursor = self
            .categories
            .find(doc! {})
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn replace_categories(&self, categories: Vec<Category>) -> Result<(), AppError> {
        use mongodb::bson::doc;

        self.categories
            .delete_many(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if categories.is_empty() {
            return Ok(());
        }

        self.categories
            .insert_many(&categories)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn count(&self) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        self.articles
            .count_documents(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
