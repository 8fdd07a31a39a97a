use serde::{Deserialize, Serialize};

use crate::db::repository::ArticleRepository;
use crate::error::AppError;
use crate::scripts::runner::ScriptKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCount {
    pub issue: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub tickets: u32,
    pub deflected: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analytics {
    pub tickets_reduced: u32,
    pub deflection_rate: String,
    pub top_issues: Vec<IssueCount>,
    pub monthly_trend: Vec<MonthlyTrend>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptUsage {
    pub name: String,
    pub runs: u32,
    pub success_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub knowledge_base_articles: u64,
    pub active_users_today: u32,
    pub average_resolution_time: String,
    pub user_satisfaction: f32,
}

/// Response body of `GET /api/dashboard`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub analytics: Analytics,
    pub script_usage: Vec<ScriptUsage>,
    pub system_status: SystemStatus,
}

fn support_analytics() -> Analytics {
    let top_issues = [
        ("Email setup", 245),
        ("VPN connection", 189),
        ("App crashes", 156),
        ("Storage full", 123),
        ("MDM issues", 98),
    ];
    let monthly_trend = [
        ("Oct", 189, 120),
        ("Nov", 156, 102),
        ("Dec", 134, 92),
        ("Jan", 121, 82),
    ];

    Analytics {
        tickets_reduced: 342,
        deflection_rate: "68%".to_string(),
        top_issues: top_issues
            .into_iter()
            .map(|(issue, count)| IssueCount {
                issue: issue.to_string(),
                count,
            })
            .collect(),
        monthly_trend: monthly_trend
            .into_iter()
            .map(|(month, tickets, deflected)| MonthlyTrend {
                month: month.to_string(),
                tickets,
                deflected,
            })
            .collect(),
    }
}

fn script_usage() -> Vec<ScriptUsage> {
    ScriptKind::ALL
        .into_iter()
        .map(|kind| {
            let (runs, success_rate) = match kind {
                ScriptKind::NetworkValidator => (245, 92),
                ScriptKind::MdmChecker => (189, 88),
                ScriptKind::StorageCleaner => (312, 95),
            };
            ScriptUsage {
                name: kind.display_name().to_string(),
                runs,
                success_rate,
            }
        })
        .collect()
}

/// Assemble the dashboard. Figures are static apart from the live article count.
pub async fn build_dashboard(repo: &dyn ArticleRepository) -> Result<DashboardResponse, AppError> {
    let article_count = repo.count().await.map_err(|e| AppError::Retrieval(e.to_string()))?;

    Ok(DashboardResponse {
        analytics: support_analytics(),
        script_usage: script_usage(),
        system_status: SystemStatus {
            knowledge_base_articles: article_count,
            active_users_today: 42,
            average_resolution_time: "12 minutes".to_string(),
            user_satisfaction: 4.7,
        },
    })
}

/// Axum handler for `GET /api/dashboard`.
#[cfg(feature = "server")]
pub async fn dashboard_handler(
    axum::extract::State(state): axum::extract::State<crate::app::AppState>,
) -> Result<axum::Json<DashboardResponse>, AppError> {
    Ok(axum::Json(build_dashboard(state.article_repo.as_ref()).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::MockArticleRepository;

    #[tokio::test]
    async fn test_dashboard_reports_live_article_count() {
        let mut repo = MockArticleRepository::new();
        repo.expect_count().times(1).returning(|| Ok(17));

        let dashboard = build_dashboard(&repo).await.unwrap();
        assert_eq!(dashboard.system_status.knowledge_base_articles, 17);
        assert_eq!(dashboard.analytics.top_issues.len(), 5);
        assert_eq!(dashboard.script_usage.len(), 3);
        assert_eq!(dashboard.script_usage[2].name, "Storage Cleaner");
    }

    #[tokio::test]
    async fn test_dashboard_fails_when_store_is_down() {
        let mut repo = MockArticleRepository::new();
        repo.expect_count()
            .returning(|| Err(AppError::Database("down".into())));

        assert!(matches!(
            build_dashboard(&repo).await,
            Err(AppError::Retrieval(_))
        ));
    }
}
