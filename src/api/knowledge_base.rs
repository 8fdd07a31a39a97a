use serde::Deserialize;

/// Query parameters of `GET /api/knowledge-base`.
#[derive(Debug, Default, Deserialize)]
pub struct KnowledgeBaseQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

/// Axum handler for `GET /api/knowledge-base`.
///
/// Lists every article, or only those matching `q` and/or `category`.
#[cfg(feature = "server")]
pub async fn list_handler(
    axum::extract::State(state): axum::extract::State<crate::app::AppState>,
    params: Result<
        axum::extract::Query<KnowledgeBaseQuery>,
        axum::extract::rejection::QueryRejection,
    >,
) -> Result<axum::Json<crate::models::search::KnowledgeBaseListing>, crate::error::AppError> {
    let axum::extract::Query(params) = params?;
    let listing = crate::search::service::list_knowledge_base(
        state.article_repo.as_ref(),
        params.q.as_deref(),
        params.category.as_deref(),
    )
    .await?;

    Ok(axum::Json(listing))
}

/// Axum handler for `GET /api/knowledge-base/{id}`.
#[cfg(feature = "server")]
pub async fn article_handler(
    axum::extract::State(state): axum::extract::State<crate::app::AppState>,
    id: Result<axum::extract::Path<u32>, axum::extract::rejection::PathRejection>,
) -> Result<axum::Json<crate::db::models::Article>, crate::error::AppError> {
    let axum::extract::Path(id) = id?;
    let article = crate::search::service::open_article(state.article_repo.as_ref(), id).await?;
    Ok(axum::Json(article))
}
