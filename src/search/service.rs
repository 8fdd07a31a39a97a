use crate::db::models::{Article, Category};
use crate::db::repository::ArticleRepository;
use crate::error::AppError;
use crate::models::search::{KnowledgeBaseListing, SearchResponse, SuggestionsResponse};
use crate::search::matcher::{self, CategoryPriority};

/// Path of the portal's search results view.
pub const RESULTS_VIEW_PATH: &str = "/search";

/// Build the results-view path for a raw query, URL-encoding it.
pub fn results_view_path(query: &str) -> String {
    format!("{}?q={}", RESULTS_VIEW_PATH, urlencoding::encode(query))
}

/// Load articles and categories, mapping store failures to retrieval errors.
async fn load_catalog(
    repo: &dyn ArticleRepository,
) -> Result<(Vec<Article>, Vec<Category>), AppError> {
    let articles = repo.list_articles().await.map_err(into_retrieval)?;
    let categories = repo.list_categories().await.map_err(into_retrieval)?;
    Ok((articles, categories))
}

fn into_retrieval(err: AppError) -> AppError {
    match err {
        AppError::Retrieval(msg) => AppError::Retrieval(msg),
        other => AppError::Retrieval(other.to_string()),
    }
}

fn filter_category(articles: Vec<Article>, category: Option<&str>) -> Vec<Article> {
    match category.filter(|c| !c.is_empty()) {
        Some(category) => articles
            .into_iter()
            .filter(|a| a.category == category)
            .collect(),
        None => articles,
    }
}

/// Full-text search over the knowledge base.
///
/// Fails with `Validation` on a blank query and with `Retrieval` when the
/// store is unavailable; no partial results are returned in either case.
pub async fn search(
    repo: &dyn ArticleRepository,
    query: &str,
    category: Option<&str>,
) -> Result<SearchResponse, AppError> {
    if query.trim().is_empty() {
        return Err(AppError::Validation("Search query cannot be empty".into()));
    }

    let (articles, categories) = load_catalog(repo).await?;
    let priorities = CategoryPriority::new(&categories);

    let results: Vec<Article> = matcher::rank_articles(&articles, query, &priorities)
        .into_iter()
        .cloned()
        .collect();
    let results = filter_category(results, category);

    tracing::debug!(query, count = results.len(), "Knowledge base search");

    Ok(SearchResponse {
        count: results.len(),
        results,
        view: results_view_path(query),
    })
}

/// Autocomplete suggestions for a prefix.
///
/// Never fails: short prefixes return nothing without touching the store,
/// and a store failure is logged and yields an empty list.
pub async fn suggest(repo: &dyn ArticleRepository, prefix: &str) -> SuggestionsResponse {
    if !matcher::meets_suggestion_threshold(prefix) {
        return SuggestionsResponse::default();
    }

    match load_catalog(repo).await {
        Ok((articles, categories)) => SuggestionsResponse {
            suggestions: matcher::suggestions(
                &articles,
                prefix,
                &CategoryPriority::new(&categories),
            ),
        },
        Err(e) => {
            tracing::warn!("Failed to load articles for suggestions: {e}");
            SuggestionsResponse::default()
        }
    }
}

/// List the knowledge base, optionally narrowed by query and category.
pub async fn list_knowledge_base(
    repo: &dyn ArticleRepository,
    query: Option<&str>,
    category: Option<&str>,
) -> Result<KnowledgeBaseListing, AppError> {
    let (articles, categories) = load_catalog(repo).await?;

    let articles = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => matcher::rank_articles(&articles, query, &CategoryPriority::new(&categories))
            .into_iter()
            .cloned()
            .collect(),
        None => articles,
    };

    Ok(KnowledgeBaseListing::new(
        filter_category(articles, category),
        &categories,
    ))
}

/// Fetch one article by id, counting the view.
pub async fn open_article(repo: &dyn ArticleRepository, id: u32) -> Result<Article, AppError> {
    repo.record_view(id)
        .await
        .map_err(into_retrieval)?
        .ok_or_else(|| AppError::NotFound("Article not found".into()))
}
