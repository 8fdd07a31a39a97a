//! Simulated network configuration validator.
//!
//! Produces a Wi-Fi / VPN / DNS health report with randomized findings.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::scripts::runner::{pick, Severity};

const TOTAL_CHECKS: u32 = 3;
const CORPORATE_VPN: &str = "Corporate_VPN";
const INTERNAL_DOMAIN: &str = "company.internal";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkIssue {
    pub category: String,
    pub severity: Severity,
    pub message: String,
    pub solution: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkRecommendation {
    pub action: String,
    pub priority: Severity,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiStatus {
    pub connected: bool,
    /// Signal strength in dBm.
    pub signal_strength: i32,
    pub ssid: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VpnStatus {
    Connected,
    Disconnected,
    Error,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpnConfiguration {
    pub name: String,
    pub status: VpnStatus,
    pub protocol: String,
    pub server: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpnReport {
    pub vpn_configurations: Vec<VpnConfiguration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    Resolved,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsResolution {
    pub domain: String,
    pub status: ResolutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsReport {
    pub dns_servers: Vec<String>,
    pub resolution_tests: Vec<DnsResolution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Healthy,
    NeedsAttention,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "HEALTHY",
            HealthStatus::NeedsAttention => "NEEDS_ATTENTION",
            HealthStatus::Unhealthy => "UNHEALTHY",
        }
    }

    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => HealthStatus::Healthy,
            50..=79 => HealthStatus::NeedsAttention,
            _ => HealthStatus::Unhealthy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub status: HealthStatus,
    pub total_checks: u32,
    pub passed_checks: u32,
    pub failed_checks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkReport {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    /// 0..=100, minus 20 per issue.
    pub health_score: u32,
    pub issues: Vec<NetworkIssue>,
    pub recommendations: Vec<NetworkRecommendation>,
    pub wifi: WifiStatus,
    pub vpn: VpnReport,
    pub dns: DnsReport,
    pub summary: NetworkSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_fixes: Vec<String>,
}

#[derive(Default)]
struct Findings {
    issues: Vec<NetworkIssue>,
    recommendations: Vec<NetworkRecommendation>,
}

impl Findings {
    fn issue(&mut self, category: &str, severity: Severity, message: String, solution: &str) {
        self.issues.push(NetworkIssue {
            category: category.to_string(),
            severity,
            message,
            solution: solution.to_string(),
        });
    }
}

fn check_wifi<R: Rng>(rng: &mut R, findings: &mut Findings) -> WifiStatus {
    let wifi = WifiStatus {
        connected: rng.random_bool(0.75),
        signal_strength: rng.random_range(-80..=-30),
        ssid: rng.random_bool(0.7).then(|| "Corporate_WiFi".to_string()),
        ip_address: rng
            .random_bool(0.8)
            .then(|| format!("192.168.1.{}", rng.random_range(2..=254))),
    };

    if !wifi.connected {
        findings.issue(
            "Wi-Fi",
            Severity::High,
            "Device not connected to Wi-Fi".to_string(),
            "Connect to corporate Wi-Fi network 'Corp-Employee'",
        );
    } else if wifi.signal_strength < -70 {
        findings.issue(
            "Wi-Fi",
            Severity::Medium,
            format!("Weak Wi-Fi signal ({} dBm)", wifi.signal_strength),
            "Move closer to access point or restart Wi-Fi",
        );
    }

    wifi
}

fn check_vpn<R: Rng>(rng: &mut R, findings: &mut Findings) -> VpnReport {
    let configurations = vec![
        VpnConfiguration {
            name: CORPORATE_VPN.to_string(),
            status: *pick(
                rng,
                &[VpnStatus::Connected, VpnStatus::Disconnected, VpnStatus::Error],
            ),
            protocol: "IKEv2".to_string(),
            server: "vpn.company.com".to_string(),
        },
        VpnConfiguration {
            name: "Backup_VPN".to_string(),
            status: VpnStatus::Disabled,
            protocol: "IPSec".to_string(),
            server: "vpn-backup.company.com".to_string(),
        },
    ];

    for vpn in &configurations {
        match vpn.status {
            VpnStatus::Error => findings.issue(
                "VPN",
                Severity::High,
                format!("VPN {} configuration error", vpn.name),
                "Reinstall VPN profile from Company Portal app",
            ),
            VpnStatus::Disconnected if vpn.name == CORPORATE_VPN => {
                findings.recommendations.push(NetworkRecommendation {
                    action: "Connect VPN".to_string(),
                    priority: Severity::High,
                    steps: vec![
                        "Open Settings > VPN".to_string(),
                        format!("Toggle {CORPORATE_VPN} to ON"),
                        "Enter credentials if prompted".to_string(),
                    ],
                })
            }
            _ => {}
        }
    }

    VpnReport {
        vpn_configurations: configurations,
    }
}

fn check_dns<R: Rng>(rng: &mut R, findings: &mut Findings) -> DnsReport {
    let tests = [
        ("apple.com", true),
        (INTERNAL_DOMAIN, rng.random_bool(0.5)),
        ("mdm.company.com", rng.random_bool(2.0 / 3.0)),
    ];

    let resolution_tests = tests
        .into_iter()
        .map(|(domain, resolves)| {
            if resolves {
                let ip = format!(
                    "{}.{}.{}.{}",
                    rng.random_range(1..=255),
                    rng.random_range(1..=255),
                    rng.random_range(1..=255),
                    rng.random_range(1..=255)
                );
                return DnsResolution {
                    domain: domain.to_string(),
                    status: ResolutionStatus::Resolved,
                    ip: Some(ip),
                    error: None,
                };
            }

            if domain == INTERNAL_DOMAIN {
                findings.issue(
                    "DNS",
                    Severity::High,
                    format!("Cannot resolve internal domain: {domain}"),
                    "Update DNS settings to use corporate DNS servers: 10.0.0.1, 10.0.0.2",
                );
            }
            DnsResolution {
                domain: domain.to_string(),
                status: ResolutionStatus::Failed,
                ip: None,
                error: Some("NXDOMAIN".to_string()),
            }
        })
        .collect();

    DnsReport {
        dns_servers: ["8.8.8.8", "8.8.4.4", "10.0.0.1", "10.0.0.2"]
            .map(String::from)
            .to_vec(),
        resolution_tests,
    }
}

/// Run every network check and compile the health report.
pub fn generate_health_report<R: Rng>(
    device_id: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> NetworkReport {
    tracing::debug!(device_id, "Starting network diagnostics");

    let mut findings = Findings::default();
    let wifi = check_wifi(rng, &mut findings);
    let vpn = check_vpn(rng, &mut findings);
    let dns = check_dns(rng, &mut findings);

    let issue_count = findings.issues.len() as u32;
    let health_score = 100_u32.saturating_sub(issue_count * 20);

    let quick_fixes = if issue_count > 0 {
        vec![
            "Restart Wi-Fi: Turn off/on Wi-Fi in Settings".to_string(),
            "Forget and rejoin corporate network".to_string(),
            "Restart device if issues persist".to_string(),
        ]
    } else {
        Vec::new()
    };

    NetworkReport {
        device_id: device_id.to_string(),
        timestamp: now,
        health_score,
        issues: findings.issues,
        recommendations: findings.recommendations,
        wifi,
        vpn,
        dns,
        summary: NetworkSummary {
            status: HealthStatus::from_score(health_score),
            total_checks: TOTAL_CHECKS,
            passed_checks: TOTAL_CHECKS.saturating_sub(issue_count),
            failed_checks: issue_count,
        },
        quick_fixes,
    }
}

/// Plain-text health report.
pub fn render_text(report: &NetworkReport) -> String {
    let rule = "=".repeat(40);
    let thin = "-".repeat(40);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "iOS NETWORK HEALTH REPORT");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Device: {}", report.device_id);
    let _ = writeln!(out, "Time: {}", report.timestamp.to_rfc3339());
    let _ = writeln!(out, "Health Score: {}/100", report.health_score);
    let _ = writeln!(out, "Status: {}", report.summary.status.as_str());
    let _ = writeln!(out);
    let _ = writeln!(out, "{thin}");
    let _ = writeln!(out, "ISSUES FOUND ({}):", report.issues.len());
    let _ = writeln!(out, "{thin}");
    for (i, issue) in report.issues.iter().enumerate() {
        let _ = writeln!(out, "{}. [{}] {}", i + 1, issue.category, issue.message);
        let _ = writeln!(out, "   Solution: {}", issue.solution);
    }

    if !report.recommendations.is_empty() {
        let _ = writeln!(out, "{thin}");
        let _ = writeln!(out, "RECOMMENDED ACTIONS:");
        let _ = writeln!(out, "{thin}");
        for recommendation in &report.recommendations {
            let _ = writeln!(
                out,
                "- {} ({} priority)",
                recommendation.action,
                recommendation.priority.as_str().to_uppercase()
            );
        }
    }

    if !report.quick_fixes.is_empty() {
        let _ = writeln!(out, "{thin}");
        let _ = writeln!(out, "QUICK FIXES:");
        for fix in &report.quick_fixes {
            let _ = writeln!(out, "- {fix}");
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
    fn test_health_status_thresholds() {
        assert_eq!(HealthStatus::from_score(100), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_score(80), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_score(60), HealthStatus::NeedsAttention);
        assert_eq!(HealthStatus::from_score(40), HealthStatus::Unhealthy);
        assert_eq!(HealthStatus::from_score(0), HealthStatus::Unhealthy);
    }

    #[test]
    fn test_report_is_internally_consistent() {
        let now = Utc::now();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let report = generate_health_report("ios-sim-1000", now, &mut rng);
            let issues = report.issues.len() as u32;

            assert_eq!(report.health_score, 100_u32.saturating_sub(issues * 20));
            assert_eq!(report.summary.failed_checks, issues);
            assert_eq!(
                report.summary.passed_checks + report.summary.failed_checks,
                TOTAL_CHECKS
            );
            assert_eq!(report.quick_fixes.is_empty(), issues == 0);
            assert_eq!(report.dns.resolution_tests.len(), 3);
            assert_eq!(report.vpn.vpn_configurations.len(), 2);
            assert!((-80..=-30).contains(&report.wifi.signal_strength));
        }
    }

    #[test]
    fn test_failed_internal_dns_is_an_issue() {
        let now = Utc::now();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let report = generate_health_report("d", now, &mut rng);

            let internal_failed = report
                .dns
                .resolution_tests
                .iter()
                .any(|t| t.domain == INTERNAL_DOMAIN && t.status == ResolutionStatus::Failed);
            let dns_issue = report.issues.iter().any(|i| i.category == "DNS");
            assert_eq!(internal_failed, dns_issue);
        }
    }

    #[test]
    fn test_disconnected_vpn_recommends_connecting() {
        let now = Utc::now();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let report = generate_health_report("d", now, &mut rng);
            let corporate = &report.vpn.vpn_configurations[0];

            let recommended = report
                .recommendations
                .iter()
                .any(|r| r.action == "Connect VPN");
            assert_eq!(corporate.status == VpnStatus::Disconnected, recommended);
        }
    }

    #[test]
    fn test_text_report_lists_issues_and_actions() {
        let now = Utc::now();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let report = generate_health_report("ios-net-9", now, &mut rng);
            let text = render_text(&report);

            assert!(text.starts_with(&"=".repeat(40)));
            assert!(text.contains("Device: ios-net-9"));
            assert!(text.contains(&format!("Health Score: {}/100", report.health_score)));
            assert!(text.contains(&format!("Status: {}", report.summary.status.as_str())));
            assert!(text.contains(&format!("ISSUES FOUND ({}):", report.issues.len())));
            for issue in &report.issues {
                assert!(text.contains(&format!("[{}] {}", issue.category, issue.message)));
            }
            assert_eq!(
                text.contains("RECOMMENDED ACTIONS:"),
                !report.recommendations.is_empty()
            );
            if !report.recommendations.is_empty() {
                assert!(text.contains("- Connect VPN (HIGH priority)"));
            }
        }
    }

    #[test]
    fn test_healthy_report_omits_quick_fixes() {
        let report = NetworkReport {
            device_id: "d".into(),
            timestamp: Utc::now(),
            health_score: 100,
            issues: vec![],
            recommendations: vec![],
            wifi: WifiStatus {
                connected: true,
                signal_strength: -40,
                ssid: None,
                ip_address: None,
            },
            vpn: VpnReport {
                vpn_configurations: vec![],
            },
            dns: DnsReport {
                dns_servers: vec![],
                resolution_tests: vec![],
            },
            summary: NetworkSummary {
                status: HealthStatus::Healthy,
                total_checks: 3,
                passed_checks: 3,
                failed_checks: 0,
            },
            quick_fixes: vec![],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("quick_fixes").is_none());
        assert_eq!(value["summary"]["status"], "HEALTHY");
    }
}
