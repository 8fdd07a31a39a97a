use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// How hard a knowledge-base fix is for an end user to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

/// Represents a knowledge-base article stored in MongoDB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Numeric article identifier, unique within the knowledge base.
    pub id: u32,
    /// Human-readable title, usually phrased as the user's problem.
    pub title: String,
    /// Category name (e.g. `Email`, `VPN`). Ranking uses the declared
    /// category list to break ties.
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Estimated time to resolve, e.g. `5 minutes`.
    #[serde(rename = "time", default)]
    pub estimated_time: String,
    /// Number of times the article was opened.
    #[serde(default)]
    pub views: u64,
    /// Date of the last editorial update.
    pub last_updated: NaiveDate,
    pub content: ArticleContent,
    /// Publication timestamp.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// The body of an article: the problem statement and the steps to fix it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleContent {
    pub problem: String,
    #[serde(default)]
    pub solution_steps: Vec<String>,
    /// Diagnostic scripts that help with this problem.
    #[serde(default)]
    pub related_scripts: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Article {
    pub fn tags(&self) -> &[String] {
        &self.content.tags
    }

    /// Iterate over the searchable body text (problem statement and steps).
    pub fn body_fragments(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.content.problem.as_str())
            .chain(self.content.solution_steps.iter().map(String::as_str))
    }
}

/// A declared knowledge-base category.
///
/// Lower `priority` values rank first when search results tie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub priority: u32,
}

impl Category {
    /// Build the category list from names in declaration order.
    pub fn from_names<I, S>(names: I) -> Vec<Category>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Category {
                name: name.into(),
                priority: index as u32,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_deserialization_defaults() {
        let json = r###"{
            "id": 7,
            "title": "Cannot connect to corporate email",
            "category": "Email",
            "last_updated": "2024-01-15",
            "content": {
                "problem": "Email app shows 'Cannot connect to server' error"
            }
        }"###;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id, 7);
        assert_eq!(article.difficulty, Difficulty::Easy);
        assert_eq!(article.views, 0);
        assert!(article.tags().is_empty());
        assert!(article.content.solution_steps.is_empty());
        assert_eq!(
            article.last_updated,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_article_time_field_is_renamed() {
        let json = r###"{
            "id": 2,
            "title": "MDM profile installation failed",
            "category": "Security",
            "difficulty": "Medium",
            "time": "10 minutes",
            "views": 892,
            "last_updated": "2024-01-10",
            "content": {
                "problem": "Profile installation failed",
                "solution_steps": ["Update iOS to latest version"],
                "related_scripts": ["mdm_checker"],
                "tags": ["mdm", "profile"]
            }
        }"###;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.estimated_time, "10 minutes");
        assert_eq!(article.difficulty, Difficulty::Medium);

        let value = serde_json::to_value(&article).unwrap();
        assert_eq!(value["time"], "10 minutes");
        assert!(value.get("estimated_time").is_none());
    }

    #[test]
    fn test_body_fragments_include_problem_and_steps() {
        let json = r###"{
            "id": 1,
            "title": "t",
            "category": "General",
            "last_updated": "2024-01-01",
            "content": {
                "problem": "p",
                "solution_steps": ["s1", "s2"]
            }
        }"###;
        let article: Article = serde_json::from_str(json).unwrap();
        let fragments: Vec<&str> = article.body_fragments().collect();
        assert_eq!(fragments, vec!["p", "s1", "s2"]);
    }

    #[test]
    fn test_categories_from_names_keep_declaration_order() {
        let categories = Category::from_names(["Email", "Wi-Fi", "VPN"]);
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[0].name, "Email");
        assert_eq!(categories[0].priority, 0);
        assert_eq!(categories[2].name, "VPN");
        assert_eq!(categories[2].priority, 2);
    }
}
