use serde::Deserialize;

/// Query parameters of `GET /api/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
}

/// Query parameters of `GET /api/search-suggestions`.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

/// Axum handler for `GET /api/search`.
#[cfg(feature = "server")]
pub async fn search_handler(
    axum::extract::State(state): axum::extract::State<crate::app::AppState>,
    params: Result<axum::extract::Query<SearchQuery>, axum::extract::rejection::QueryRejection>,
) -> Result<axum::Json<crate::models::search::SearchResponse>, crate::error::AppError> {
    let axum::extract::Query(params) = params?;
    let response = crate::search::service::search(
        state.article_repo.as_ref(),
        &params.q,
        params.category.as_deref(),
    )
    .await?;

    Ok(axum::Json(response))
}

/// Axum handler for `GET /api/search-suggestions`. Always succeeds.
///
/// Unparseable query strings are treated as an empty prefix.
#[cfg(feature = "server")]
pub async fn suggestions_handler(
    axum::extract::State(state): axum::extract::State<crate::app::AppState>,
    params: Result<axum::extract::Query<SuggestionQuery>, axum::extract::rejection::QueryRejection>,
) -> axum::Json<crate::models::search::SuggestionsResponse> {
    let params = params.map(|q| q.0).unwrap_or_default();
    axum::Json(crate::search::service::suggest(state.article_repo.as_ref(), &params.q).await)
}
