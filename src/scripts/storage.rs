//! Simulated storage analyzer: capacity breakdown, per-app usage and a
//! cleanup plan.

use std::fmt::Write;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::scripts::runner::{pick, round1, round2, Severity};

/// Apps reported in the analysis, largest first.
const REPORTED_APPS: usize = 10;
const LARGE_APP_GB: f64 = 2.0;
const UNUSED_AFTER_DAYS: i64 = 60;

/// Apps and recommendations shown in the text report.
const TEXT_TOP_APPS: usize = 5;
const TEXT_TOP_RECOMMENDATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageCategory {
    Apps,
    Photos,
    Documents,
    System,
    Cache,
    Other,
}

impl StorageCategory {
    pub fn label(&self) -> &'static str {
        match self {
            StorageCategory::Apps => "Applications",
            StorageCategory::Photos => "Photos & Videos",
            StorageCategory::Documents => "Documents & Data",
            StorageCategory::System => "System",
            StorageCategory::Cache => "Cached Data",
            StorageCategory::Other => "Other",
        }
    }

    pub fn is_cleanable(&self) -> bool {
        matches!(
            self,
            StorageCategory::Cache | StorageCategory::Apps | StorageCategory::Photos
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSlice {
    pub category: String,
    pub size_gb: f64,
    pub percentage: f64,
    pub cleanable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSummary {
    /// Device capacity in GB.
    pub total: u32,
    pub used: u32,
    pub available: u32,
    pub percentage_used: f64,
    pub breakdown: Vec<StorageSlice>,
}

impl StorageSummary {
    fn slice(&self, category: StorageCategory) -> Option<&StorageSlice> {
        self.breakdown.iter().find(|s| s.category == category.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppCategory {
    System,
    Media,
    Communication,
    Productivity,
    Corporate,
    Browser,
    Entertainment,
    Social,
}

impl AppCategory {
    /// System and corporate apps are never suggested for removal.
    pub fn is_removable(&self) -> bool {
        !matches!(self, AppCategory::System | AppCategory::Corporate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStorage {
    pub name: String,
    #[serde(rename = "type")]
    pub app_type: AppCategory,
    pub cache_size: f64,
    pub app_size: f64,
    pub documents_size: f64,
    pub total_size: f64,
    pub last_used: NaiveDate,
    pub cleanable_cache: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageIssue {
    pub severity: Severity,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub message: String,
    pub impact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupRecommendation {
    pub action: String,
    pub steps: Vec<String>,
    pub savings_gb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupTask {
    pub task: String,
    pub time: String,
    pub savings: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupPlan {
    pub quick_clean: Vec<CleanupTask>,
    pub deep_clean: Vec<CleanupTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageReport {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub storage_summary: StorageSummary,
    pub app_analysis: Vec<AppStorage>,
    pub issues: Vec<StorageIssue>,
    pub recommendations: Vec<CleanupRecommendation>,
    pub cleanup_plan: CleanupPlan,
    pub potential_savings_gb: f64,
    pub next_steps: Vec<String>,
}

fn simulate_storage<R: Rng>(rng: &mut R) -> StorageSummary {
    let total = *pick(rng, &[64_u32, 128, 256, 512]);
    let used = rng.random_range(total / 2..=total - 5);

    let weights = [
        (StorageCategory::Apps, rng.random_range(30_u32..=60)),
        (StorageCategory::Photos, rng.random_range(10_u32..=40)),
        (StorageCategory::Documents, rng.random_range(5_u32..=20)),
        (StorageCategory::System, rng.random_range(10_u32..=20)),
        (StorageCategory::Cache, rng.random_range(5_u32..=15)),
        (StorageCategory::Other, rng.random_range(1_u32..=10)),
    ];
    let weight_sum: u32 = weights.iter().map(|(_, w)| w).sum();

    let breakdown = weights
        .into_iter()
        .map(|(category, weight)| {
            let percentage = round1(f64::from(weight) / f64::from(weight_sum) * 100.0);
            StorageSlice {
                category: category.label().to_string(),
                size_gb: round1(f64::from(used) * percentage / 100.0),
                percentage,
                cleanable: category.is_cleanable(),
            }
        })
        .collect();

    StorageSummary {
        total,
        used,
        available: total - used,
        percentage_used: round1(f64::from(used) / f64::from(total) * 100.0),
        breakdown,
    }
}

fn analyze_apps<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Vec<AppStorage> {
    let catalog = [
        ("Safari", AppCategory::System, 0.5, 2.5),
        ("Photos", AppCategory::Media, 1.0, 5.0),
        ("Messages", AppCategory::Communication, 0.3, 1.5),
        ("Mail", AppCategory::Productivity, 0.5, 2.0),
        ("Teams", AppCategory::Corporate, 0.8, 3.0),
        ("Slack", AppCategory::Corporate, 0.5, 2.5),
        ("Chrome", AppCategory::Browser, 0.7, 3.0),
        ("Spotify", AppCategory::Entertainment, 1.0, 4.0),
        ("YouTube", AppCategory::Entertainment, 1.5, 5.0),
        ("Instagram", AppCategory::Social, 0.8, 3.5),
        ("Camera", AppCategory::System, 0.1, 0.5),
        ("App Store", AppCategory::System, 0.2, 1.0),
    ];

    let mut apps: Vec<AppStorage> = catalog
        .into_iter()
        .map(|(name, app_type, cache_min, cache_max)| {
            let cache_size = rng.random_range(cache_min..cache_max);
            let app_size = rng.random_range(0.1..1.5);
            let documents_size = rng.random_range(0.0..2.0);
            let last_used = now - Duration::days(rng.random_range(0..=90));
            AppStorage {
                name: name.to_string(),
                app_type,
                cache_size,
                app_size,
                documents_size,
                total_size: round2(app_size + cache_size + documents_size),
                last_used: last_used.date_naive(),
                cleanable_cache: cache_size > 0.5,
            }
        })
        .collect();

    apps.sort_by(|a, b| b.total_size.total_cmp(&a.total_size));
    apps
}

/// Analyse a simulated device and build the cleanup report.
pub fn identify_storage_issues<R: Rng>(
    device_id: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> StorageReport {
    tracing::debug!(device_id, "Analysing device storage");

    let storage = simulate_storage(rng);
    let apps = analyze_apps(rng, now);
    let today = now.date_naive();

    let mut issues = Vec::new();
    let mut recommendations = Vec::new();
    let mut potential_savings = 0.0;

    if storage.percentage_used > 90.0 {
        issues.push(StorageIssue {
            severity: Severity::Critical,
            issue_type: "low_storage".to_string(),
            message: format!(
                "Device storage critically low ({}% used)",
                storage.percentage_used
            ),
            impact: "Device performance degraded, apps may crash".to_string(),
        });
    } else if storage.percentage_used > 80.0 {
        issues.push(StorageIssue {
            severity: Severity::High,
            issue_type: "low_storage".to_string(),
            message: format!("Device storage low ({}% used)", storage.percentage_used),
            impact: "Limited space for new apps and updates".to_string(),
        });
    }

    let cache = storage.slice(StorageCategory::Cache).map(|s| s.size_gb);
    if let Some(cache_gb) = cache.filter(|gb| *gb > 2.0) {
        issues.push(StorageIssue {
            severity: Severity::Medium,
            issue_type: "excessive_cache".to_string(),
            message: format!("Large cache data ({cache_gb} GB)"),
            impact: "Wasted storage space".to_string(),
        });
        potential_savings += cache_gb;
        recommendations.push(CleanupRecommendation {
            action: "Clear Safari cache".to_string(),
            steps: vec!["Settings > Safari > Clear History and Website Data".to_string()],
            savings_gb: round1(cache_gb * 0.3),
        });
    }

    let large_apps: Vec<&AppStorage> = apps
        .iter()
        .filter(|a| a.total_size > LARGE_APP_GB)
        .collect();
    if !large_apps.is_empty() {
        issues.push(StorageIssue {
            severity: Severity::Medium,
            issue_type: "large_apps".to_string(),
            message: format!("{} apps using over 2GB each", large_apps.len()),
            impact: "Significant storage consumption".to_string(),
        });

        for app in large_apps.iter().take(3).filter(|a| a.app_type.is_removable()) {
            let reclaimable = app.cache_size + app.documents_size;
            recommendations.push(CleanupRecommendation {
                action: format!("Review {} storage", app.name),
                steps: vec![
                    format!("Settings > General > iPhone Storage > {}", app.name),
                    "Consider offloading app or clearing cache".to_string(),
                ],
                savings_gb: round1(reclaimable),
            });
            potential_savings += reclaimable;
        }
    }

    let unused_apps: Vec<&AppStorage> = apps
        .iter()
        .filter(|a| (today - a.last_used).num_days() > UNUSED_AFTER_DAYS && a.app_type.is_removable())
        .collect();
    if !unused_apps.is_empty() {
        let unused_storage: f64 = unused_apps.iter().take(5).map(|a| a.total_size).sum();
        recommendations.push(CleanupRecommendation {
            action: "Remove unused apps".to_string(),
            steps: vec![
                "Settings > General > iPhone Storage".to_string(),
                "Review 'Unused Apps' section".to_string(),
                "Tap on apps and select 'Delete App'".to_string(),
            ],
            savings_gb: round1(unused_storage),
        });
        potential_savings += unused_storage;
    }

    if let Some(photos) = storage
        .slice(StorageCategory::Photos)
        .filter(|s| s.size_gb > 10.0)
    {
        recommendations.push(CleanupRecommendation {
            action: "Optimize photo storage".to_string(),
            steps: vec![
                "Settings > Photos".to_string(),
                "Select 'Optimize iPhone Storage'".to_string(),
                "Review 'Recently Deleted' album".to_string(),
            ],
            savings_gb: round1(photos.size_gb * 0.2),
        });
    }

    let mut cleanup_plan = CleanupPlan::default();
    if let Some(cache_gb) = cache.filter(|gb| *gb > 1.0) {
        cleanup_plan.quick_clean.push(CleanupTask {
            task: "Clear browser caches".to_string(),
            time: "2 minutes".to_string(),
            savings: format!("Up to {} GB", round1(cache_gb * 0.3)),
        });
    }
    if !unused_apps.is_empty() {
        let oldest: Vec<&&AppStorage> = unused_apps.iter().take(3).collect();
        let savings: f64 = oldest.iter().map(|a| a.total_size).sum();
        cleanup_plan.deep_clean.push(CleanupTask {
            task: format!("Remove {} unused apps", oldest.len()),
            time: "10 minutes".to_string(),
            savings: format!("Up to {} GB", round1(savings)),
        });
    }

    StorageReport {
        device_id: device_id.to_string(),
        timestamp: now,
        app_analysis: apps.iter().take(REPORTED_APPS).cloned().collect(),
        storage_summary: storage,
        issues,
        recommendations,
        cleanup_plan,
        potential_savings_gb: round1(potential_savings),
        next_steps: vec![
            "Review app storage in Settings > General > iPhone Storage".to_string(),
            "Enable iCloud Photo Library optimization".to_string(),
            "Set up automatic app offloading".to_string(),
        ],
    }
}

/// Plain-text cleanup report.
pub fn render_text(report: &StorageReport) -> String {
    let summary = &report.storage_summary;
    let mut out = String::new();

    let _ = writeln!(out, "iOS STORAGE OPTIMIZATION REPORT");
    let _ = writeln!(out, "{}", "=".repeat(47));
    let _ = writeln!(out, "Device: {}", report.device_id);
    let _ = writeln!(out, "Generated: {}", report.timestamp.to_rfc3339());
    let _ = writeln!(out);
    let _ = writeln!(out, "STORAGE SUMMARY:");
    let _ = writeln!(out, "- Total: {} GB", summary.total);
    let _ = writeln!(out, "- Used: {} GB", summary.used);
    let _ = writeln!(out, "- Available: {} GB", summary.available);
    let _ = writeln!(out, "- Usage: {}%", summary.percentage_used);
    let _ = writeln!(out);
    let _ = writeln!(out, "TOP STORAGE CONSUMERS:");
    for (i, app) in report.app_analysis.iter().take(TEXT_TOP_APPS).enumerate() {
        let _ = writeln!(
            out,
            "{}. {}: {:.2} GB (Cache: {:.2} GB){}",
            i + 1,
            app.name,
            app.total_size,
            app.cache_size,
            if app.cleanable_cache { " [cleanable]" } else { "" }
        );
    }

    if !report.issues.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "ISSUES DETECTED:");
        for issue in &report.issues {
            let _ = writeln!(
                out,
                "- [{}] {}",
                issue.severity.as_str().to_uppercase(),
                issue.message
            );
        }
    }

    if !report.recommendations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "RECOMMENDED ACTIONS:");
        for (i, recommendation) in report
            .recommendations
            .iter()
            .take(TEXT_TOP_RECOMMENDATIONS)
            .enumerate()
        {
            let _ = writeln!(out, "{}. {}", i + 1, recommendation.action);
            let _ = writeln!(out, "   Potential savings: {} GB", recommendation.savings_gb);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "POTENTIAL TOTAL SAVINGS: {} GB",
        report.potential_savings_gb
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "QUICK CLEANUP (under 5 minutes):");
    if report.cleanup_plan.quick_clean.is_empty() {
        let _ = writeln!(out, "- No quick cleanup tasks available");
    }
    for task in &report.cleanup_plan.quick_clean {
        let _ = writeln!(out, "- {} ({}) - {}", task.task, task.time, task.savings);
    }

    if !report.cleanup_plan.deep_clean.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "DEEP CLEANUP (10-15 minutes):");
        for task in &report.cleanup_plan.deep_clean {
            let _ = writeln!(out, "- {} ({}) - {}", task.task, task.time, task.savings);
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_storage_summary_is_consistent() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let summary = simulate_storage(&mut rng);

            assert!([64, 128, 256, 512].contains(&summary.total));
            assert!(summary.used >= summary.total / 2);
            assert!(summary.used <= summary.total - 5);
            assert_eq!(summary.available, summary.total - summary.used);
            assert_eq!(summary.breakdown.len(), 6);

            let percent_sum: f64 = summary.breakdown.iter().map(|s| s.percentage).sum();
            assert!((percent_sum - 100.0).abs() < 1.0, "sum was {percent_sum}");
        }
    }

    #[test]
    fn test_cleanable_categories() {
        assert!(StorageCategory::Cache.is_cleanable());
        assert!(StorageCategory::Photos.is_cleanable());
        assert!(!StorageCategory::System.is_cleanable());
    }

    #[test]
    fn test_apps_sorted_by_total_size() {
        let mut rng = StdRng::seed_from_u64(3);
        let apps = analyze_apps(&mut rng, Utc::now());
        assert_eq!(apps.len(), 12);
        assert!(apps.windows(2).all(|w| w[0].total_size >= w[1].total_size));
    }

    #[test]
    fn test_report_only_lists_top_apps() {
        let now = Utc::now();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let report = identify_storage_issues("ios-storage-1", now, &mut rng);

            assert_eq!(report.app_analysis.len(), REPORTED_APPS);
            assert_eq!(report.next_steps.len(), 3);
            assert!(report.potential_savings_gb >= 0.0);
            assert_eq!(
                report.issues.iter().any(|i| i.issue_type == "large_apps"),
                report.app_analysis.iter().any(|a| a.total_size > LARGE_APP_GB)
            );
        }
    }

    #[test]
    fn test_text_report_sections() {
        let now = Utc::now();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let report = identify_storage_issues("ios-storage-2", now, &mut rng);
            let text = render_text(&report);

            assert!(text.starts_with("iOS STORAGE OPTIMIZATION REPORT"));
            assert!(text.contains("Device: ios-storage-2"));
            assert!(text.contains(&format!("- Total: {} GB", report.storage_summary.total)));
            assert!(text.contains(&format!("1. {}:", report.app_analysis[0].name)));
            assert!(!text.contains(&format!("6. {}:", report.app_analysis[5].name)));
            assert!(text.contains(&format!(
                "POTENTIAL TOTAL SAVINGS: {} GB",
                report.potential_savings_gb
            )));
            assert_eq!(
                text.contains("No quick cleanup tasks available"),
                report.cleanup_plan.quick_clean.is_empty()
            );
            assert_eq!(
                text.contains("DEEP CLEANUP"),
                !report.cleanup_plan.deep_clean.is_empty()
            );
            for issue in &report.issues {
                assert!(text.contains(&issue.message));
            }
        }
    }

    #[test]
    fn test_system_and_corporate_apps_are_not_removable() {
        assert!(!AppCategory::System.is_removable());
        assert!(!AppCategory::Corporate.is_removable());
        assert!(AppCategory::Entertainment.is_removable());
    }

    #[test]
    fn test_no_removal_advice_for_protected_apps() {
        let now = Utc::now();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let report = identify_storage_issues("d", now, &mut rng);
            for name in ["Safari", "Teams", "Slack", "Camera", "App Store"] {
                let action = format!("Review {name} storage");
                assert!(!report.recommendations.iter().any(|r| r.action == action));
            }
        }
    }
}
