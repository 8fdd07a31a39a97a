use serde::{Deserialize, Serialize};

use crate::db::models::{Article, Category};

/// What a suggestion points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// The title of a knowledge-base article.
    Article,
    /// A frequent search phrase.
    SearchTerm,
}

/// An autocomplete candidate. Computed per request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionEntry {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Referenced article id, for article suggestions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}

/// Response body of `GET /api/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Article>,
    pub count: usize,
    /// Path of the results view for this query, with the query URL-encoded.
    pub view: String,
}

/// Response body of `GET /api/search-suggestions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<SuggestionEntry>,
}

/// Response body of `GET /api/knowledge-base`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseListing {
    pub articles: Vec<Article>,
    pub total: usize,
    /// Declared category names, highest priority first.
    pub categories: Vec<String>,
}

impl KnowledgeBaseListing {
    pub fn new(articles: Vec<Article>, categories: &[Category]) -> Self {
        Self {
            total: articles.len(),
            articles,
            categories: categories.iter().map(|c| c.name.clone()).collect(),
        }
    }
}
