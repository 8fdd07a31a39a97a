//! Case-insensitive article matching and ranking.
//!
//! Everything here is pure: callers fetch articles and categories from the
//! store and hand them in.

use std::collections::HashMap;

use crate::db::models::{Article, Category};
use crate::models::search::{SuggestionEntry, SuggestionKind};

/// Prefixes shorter than this (in characters, after trimming) yield no
/// suggestions.
pub const MIN_SUGGESTION_LEN: usize = 2;

/// Maximum number of suggestions returned for a prefix.
pub const SUGGESTION_LIMIT: usize = 5;

/// Frequent support searches offered as suggestions alongside articles.
pub const COMMON_SEARCHES: &[&str] = &[
    "email setup",
    "vpn connect",
    "app crash",
    "storage full",
    "wifi password",
    "mdm profile",
    "ios update",
    "backup",
];

/// Category label attached to common-search suggestions.
pub const COMMON_SEARCH_CATEGORY: &str = "Common Search";

/// Where a query matched an article. Variants are ordered best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchStrength {
    Title,
    Tag,
    Body,
    /// Every keyword occurs somewhere, but not the query as a whole.
    Keywords,
}

/// Lookup table from category name to its declared priority.
#[derive(Debug, Clone, Default)]
pub struct CategoryPriority {
    ranks: HashMap<String, u32>,
}

impl CategoryPriority {
    pub fn new(categories: &[Category]) -> Self {
        Self {
            ranks: categories
                .iter()
                .map(|c| (c.name.clone(), c.priority))
                .collect(),
        }
    }

    /// Priority of a category; undeclared categories rank last.
    pub fn rank(&self, category: &str) -> u32 {
        self.ranks.get(category).copied().unwrap_or(u32::MAX)
    }
}

/// Normalize a raw query for matching: trimmed and lowercased.
pub fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Determine how strongly a normalized query matches an article.
///
/// `needle` must already be normalized (see [`normalize`]).
pub fn match_strength(article: &Article, needle: &str) -> Option<MatchStrength> {
    if needle.is_empty() {
        return None;
    }

    if contains_ci(&article.title, needle) {
        return Some(MatchStrength::Title);
    }
    if article.tags().iter().any(|tag| contains_ci(tag, needle)) {
        return Some(MatchStrength::Tag);
    }
    if article.body_fragments().any(|text| contains_ci(text, needle)) {
        return Some(MatchStrength::Body);
    }

    let keywords: Vec<&str> = needle.split_whitespace().collect();
    if keywords.len() < 2 {
        return None;
    }

    let all_found = keywords.iter().all(|keyword| {
        contains_ci(&article.title, keyword)
            || article.tags().iter().any(|tag| contains_ci(tag, keyword))
            || article.body_fragments().any(|text| contains_ci(text, keyword))
    });

    all_found.then_some(MatchStrength::Keywords)
}

/// Return the articles matching `query`, best first.
///
/// Order: match strength, then category priority, then the articles'
/// original order (the sort is stable).
pub fn rank_articles<'a>(
    articles: &'a [Article],
    query: &str,
    priorities: &CategoryPriority,
) -> Vec<&'a Article> {
    let needle = normalize(query);

    let mut matches: Vec<(MatchStrength, u32, &Article)> = articles
        .iter()
        .filter_map(|article| {
            match_strength(article, &needle)
                .map(|strength| (strength, priorities.rank(&article.category), article))
        })
        .collect();

    matches.sort_by_key(|(strength, rank, _)| (*strength, *rank));
    matches.into_iter().map(|(_, _, article)| article).collect()
}

/// Build the autocomplete list for a prefix.
///
/// Ranked article titles come first, then matching common searches; the
/// list is capped at [`SUGGESTION_LIMIT`]. Prefixes shorter than
/// [`MIN_SUGGESTION_LEN`] produce nothing.
pub fn suggestions(
    articles: &[Article],
    prefix: &str,
    priorities: &CategoryPriority,
) -> Vec<SuggestionEntry> {
    if !meets_suggestion_threshold(prefix) {
        return Vec::new();
    }

    let needle = normalize(prefix);

    let from_articles = rank_articles(articles, prefix, priorities)
        .into_iter()
        .map(|article| SuggestionEntry {
            text: article.title.clone(),
            category: Some(article.category.clone()),
            id: Some(article.id),
            kind: SuggestionKind::Article,
        });

    let from_common = COMMON_SEARCHES
        .iter()
        .filter(|phrase| phrase.contains(needle.as_str()))
        .map(|phrase| SuggestionEntry {
            text: (*phrase).to_string(),
            category: Some(COMMON_SEARCH_CATEGORY.to_string()),
            id: None,
            kind: SuggestionKind::SearchTerm,
        });

    from_articles
        .chain(from_common)
        .take(SUGGESTION_LIMIT)
        .collect()
}

/// Whether a prefix is long enough to trigger suggestions.
pub fn meets_suggestion_threshold(prefix: &str) -> bool {
    prefix.trim().chars().count() >= MIN_SUGGESTION_LEN
}
