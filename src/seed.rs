use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::db::models::{Article, Category};
use crate::db::repository::ArticleRepository;
use crate::error::AppError;

const SAMPLE_KNOWLEDGE_BASE: &str = include_str!("../demo_data/knowledge_base.json");

/// On-disk layout of a knowledge-base seed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBaseFile {
    #[serde(default)]
    pub articles: Vec<Article>,
    /// Category names, highest priority first.
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Load a knowledge base from `path`, or the embedded sample when no path is given.
///
/// Files ending in `.yaml`/`.yml` are parsed as YAML, everything else as JSON.
pub fn load_knowledge_base(path: Option<&Path>) -> Result<KnowledgeBaseFile, AppError> {
    let Some(path) = path else {
        return parse_json(SAMPLE_KNOWLEDGE_BASE);
    };

    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Cannot read seed file {}: {e}", path.display()))
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&raw)
            .map_err(|e| AppError::Config(format!("Invalid seed file {}: {e}", path.display())))
    } else {
        parse_json(&raw)
    }
}

fn parse_json(raw: &str) -> Result<KnowledgeBaseFile, AppError> {
    serde_json::from_str(raw).map_err(|e| AppError::Config(format!("Invalid knowledge base: {e}")))
}

/// Populate an empty store. Returns the number of articles written.
///
/// A store that already holds articles is left untouched.
pub async fn seed_knowledge_base(
    repo: &dyn ArticleRepository,
    kb: KnowledgeBaseFile,
) -> Result<usize, AppError> {
    let existing = repo.count().await?;
    if existing > 0 {
        tracing::info!("Knowledge base already holds {} articles, skipping seed.", existing);
        return Ok(0);
    }

    tracing::info!("Seeding knowledge base...");

    let mut seeded = 0;
    for article in kb.articles {
        let id = article.id;
        repo.upsert(article).await?;
        tracing::debug!("Seeded article {}", id);
        seeded += 1;
    }

    repo.replace_categories(Category::from_names(kb.categories))
        .await?;

    tracing::info!("Knowledge base seeding complete: {} articles.", seeded);
    Ok(seeded)
}
