//! Simulated MDM profile and security compliance checker.

use std::fmt::Write;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::scripts::runner::{pick, Severity};

pub const REQUIRED_PROFILES: &[&str] = &[
    "Corporate_MDM",
    "VPN_Configuration",
    "Wi-Fi_Certificate",
    "Email_Profile",
];

pub const REQUIRED_APPS: &[&str] = &["Company_Portal", "Authenticator", "Secure_Mail", "VPN_Client"];

pub const MIN_PASSCODE_LENGTH: u32 = 6;

/// Passcode, short passcode and jailbreak checks.
const SECURITY_CHECKS: u32 = 3;

/// Profiles expiring in fewer days than this are reported.
const EXPIRY_WARNING_DAYS: i64 = 30;

/// At or below this many days an expiring profile is high severity.
const EXPIRY_URGENT_DAYS: i64 = 7;

const COMPLIANT_SCORE: u32 = 90;

/// Minimum score for the certificate's security sign-off.
const SECURITY_COMPLIANT_SCORE: u32 = 80;

const CERTIFICATE_VALID_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub name: String,
    pub installed: bool,
    pub expiry: DateTime<Utc>,
    pub organization: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasscodeComplexity {
    None,
    Numeric,
    Alphanumeric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasscodeStatus {
    pub enabled: bool,
    pub length: u32,
    pub complexity: PasscodeComplexity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoLockStatus {
    pub enabled: bool,
    pub minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionStatus {
    pub data_protection: bool,
    pub filevault: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub jailbroken: bool,
    pub os_version: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityStatus {
    pub passcode: PasscodeStatus,
    pub auto_lock: AutoLockStatus,
    pub encryption: EncryptionStatus,
    pub device: DeviceInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporateApp {
    pub name: String,
    pub installed: bool,
    pub version: String,
}

/// A failed compliance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComplianceIssue {
    MissingProfile {
        profile: String,
        severity: Severity,
        action: String,
    },
    ExpiringProfile {
        profile: String,
        days_remaining: i64,
        severity: Severity,
        action: String,
    },
    Security {
        issue: String,
        severity: Severity,
        action: String,
    },
}

impl ComplianceIssue {
    pub fn severity(&self) -> Severity {
        match self {
            ComplianceIssue::MissingProfile { severity, .. }
            | ComplianceIssue::ExpiringProfile { severity, .. }
            | ComplianceIssue::Security { severity, .. } => *severity,
        }
    }

    pub fn action(&self) -> &str {
        match self {
            ComplianceIssue::MissingProfile { action, .. }
            | ComplianceIssue::ExpiringProfile { action, .. }
            | ComplianceIssue::Security { action, .. } => action,
        }
    }

    /// One-line description of the failed check.
    pub fn describe(&self) -> String {
        match self {
            ComplianceIssue::MissingProfile { profile, .. } => format!("Missing profile {profile}"),
            ComplianceIssue::ExpiringProfile {
                profile,
                days_remaining,
                ..
            } => format!("Profile {profile} expires in {days_remaining} days"),
            ComplianceIssue::Security { issue, .. } => issue.clone(),
        }
    }
}

/// A required app that is missing, serialized with `"type": "app"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename = "app")]
pub struct AppRecommendation {
    pub app: String,
    pub priority: Severity,
    pub action: String,
    pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "COMPLIANT",
            ComplianceStatus::NonCompliant => "NON_COMPLIANT",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub total_checks: u32,
    pub passed_checks: u32,
    pub failed_checks: u32,
    pub critical_issues: usize,
    pub high_priority: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdmReport {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub compliance_score: u32,
    pub status: ComplianceStatus,
    pub profiles: Vec<DeviceProfile>,
    pub security: SecurityStatus,
    pub apps: Vec<CorporateApp>,
    pub issues: Vec<ComplianceIssue>,
    pub recommendations: Vec<AppRecommendation>,
    pub summary: ComplianceSummary,
}

/// Compliance certificate issued from a finished check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceCertificate {
    /// `CMP-` followed by five digits.
    pub certificate_id: String,
    pub device_id: String,
    pub issue_date: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub compliance_status: ComplianceStatus,
    pub score: u32,
    pub issuer: String,
    pub signature: String,
    pub details: CertificateDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateDetails {
    pub profiles_installed: usize,
    pub security_compliant: bool,
    pub apps_installed: usize,
}

fn profile<R: Rng>(
    rng: &mut R,
    now: DateTime<Utc>,
    name: &str,
    installed_probability: f64,
    expiry_days: std::ops::RangeInclusive<i64>,
    organization: &str,
    identifier: &str,
) -> DeviceProfile {
    DeviceProfile {
        name: name.to_string(),
        installed: rng.random_bool(installed_probability),
        expiry: now + Duration::days(rng.random_range(expiry_days)),
        organization: organization.to_string(),
        identifier: identifier.to_string(),
    }
}

fn simulate_profiles<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Vec<DeviceProfile> {
    vec![
        profile(rng, now, "Corporate_MDM", 2.0 / 3.0, -10..=90, "IT Department", "com.company.mdm.profile"),
        profile(rng, now, "VPN_Configuration", 0.5, 30..=365, "Network Team", "com.company.vpn.profile"),
        profile(rng, now, "Email_Profile", 1.0, 60..=365, "Exchange Team", "com.company.email.profile"),
        profile(rng, now, "Wi-Fi_Certificate", 0.5, -5..=180, "Security Team", "com.company.wifi.cert"),
        profile(rng, now, "Security_Policy", 0.75, 100..=365, "Compliance Office", "com.company.security.policy"),
    ]
}

fn simulate_security<R: Rng>(rng: &mut R) -> SecurityStatus {
    SecurityStatus {
        passcode: PasscodeStatus {
            enabled: rng.random_bool(0.75),
            length: rng.random_range(4..=8),
            complexity: *pick(
                rng,
                &[
                    PasscodeComplexity::None,
                    PasscodeComplexity::Numeric,
                    PasscodeComplexity::Alphanumeric,
                ],
            ),
        },
        auto_lock: AutoLockStatus {
            enabled: true,
            minutes: *pick(rng, &[1, 2, 5, 10, 30]),
        },
        encryption: EncryptionStatus {
            data_protection: rng.random_bool(2.0 / 3.0),
            filevault: true,
        },
        device: DeviceInfo {
            jailbroken: rng.random_bool(0.25),
            os_version: format!("iOS {}", pick(rng, &["16.7", "17.2", "17.3", "17.4"])),
            model: pick(rng, &["iPhone 14 Pro", "iPhone 15", "iPhone 13", "iPad Pro"]).to_string(),
        },
    }
}

fn simulate_apps<R: Rng>(rng: &mut R) -> Vec<CorporateApp> {
    let apps = [
        ("Company_Portal", 0.5, "4.8.1"),
        ("Authenticator", 2.0 / 3.0, "6.7.2"),
        ("Secure_Mail", 0.5, "5.3.0"),
        ("VPN_Client", 0.75, "3.2.1"),
        ("Teams", 1.0, "5.9.1"),
        ("OneDrive", 1.0, "14.8.1"),
    ];

    apps.into_iter()
        .map(|(name, probability, version)| CorporateApp {
            name: name.to_string(),
            installed: rng.random_bool(probability),
            version: version.to_string(),
        })
        .collect()
}

/// Evaluate the compliance rules against a simulated device state.
fn evaluate(
    now: DateTime<Utc>,
    profiles: &[DeviceProfile],
    security: &SecurityStatus,
    apps: &[CorporateApp],
) -> (Vec<ComplianceIssue>, Vec<AppRecommendation>) {
    let mut issues = Vec::new();

    for required in REQUIRED_PROFILES {
        let installed = profiles
            .iter()
            .any(|p| p.installed && p.name == *required);
        if !installed {
            issues.push(ComplianceIssue::MissingProfile {
                profile: required.to_string(),
                severity: Severity::High,
                action: format!("Install {required} profile from Company Portal"),
            });
        }
    }

    for profile in profiles.iter().filter(|p| p.installed) {
        let days_remaining = (profile.expiry - now).num_days();
        if days_remaining < EXPIRY_WARNING_DAYS {
            issues.push(ComplianceIssue::ExpiringProfile {
                profile: profile.name.clone(),
                days_remaining,
                severity: if days_remaining > EXPIRY_URGENT_DAYS {
                    Severity::Medium
                } else {
                    Severity::High
                },
                action: format!("Renew {} profile before expiry", profile.name),
            });
        }
    }

    if !security.passcode.enabled {
        issues.push(ComplianceIssue::Security {
            issue: "Passcode not enabled".to_string(),
            severity: Severity::Critical,
            action: "Enable passcode in Settings > Face ID & Passcode".to_string(),
        });
    }

    if security.passcode.length < MIN_PASSCODE_LENGTH {
        issues.push(ComplianceIssue::Security {
            issue: format!(
                "Passcode too short ({} characters)",
                security.passcode.length
            ),
            severity: Severity::High,
            action: format!(
                "Increase passcode length to at least {MIN_PASSCODE_LENGTH} characters"
            ),
        });
    }

    if security.device.jailbroken {
        issues.push(ComplianceIssue::Security {
            issue: "Device is jailbroken".to_string(),
            severity: Severity::Critical,
            action: "Contact IT security immediately. Jailbroken devices cannot access corporate resources.".to_string(),
        });
    }

    let recommendations = REQUIRED_APPS
        .iter()
        .filter(|required| !apps.iter().any(|a| a.installed && a.name == **required))
        .map(|app| AppRecommendation {
            app: app.to_string(),
            priority: Severity::Medium,
            action: format!("Install {app} from App Store"),
            link: "https://apps.company.com/install".to_string(),
        })
        .collect();

    (issues, recommendations)
}

/// Score out of 100: the share of checks that passed, rounded down.
pub fn compliance_score(failed_checks: u32, total_checks: u32) -> u32 {
    if total_checks == 0 {
        return 100;
    }
    100_u32.saturating_sub(failed_checks * 100 / total_checks)
}

/// Run the full compliance check for a device.
pub fn run_compliance_check<R: Rng>(device_id: &str, now: DateTime<Utc>, rng: &mut R) -> MdmReport {
    tracing::debug!(device_id, "Running MDM compliance check");

    let profiles = simulate_profiles(rng, now);
    let security = simulate_security(rng);
    let apps = simulate_apps(rng);

    let (issues, recommendations) = evaluate(now, &profiles, &security, &apps);

    let total_checks = (REQUIRED_PROFILES.len() + REQUIRED_APPS.len()) as u32 + SECURITY_CHECKS;
    let failed_checks = issues.len() as u32;
    let score = compliance_score(failed_checks, total_checks);

    let summary = ComplianceSummary {
        total_checks,
        passed_checks: total_checks.saturating_sub(failed_checks),
        failed_checks,
        critical_issues: issues
            .iter()
            .filter(|i| i.severity() == Severity::Critical)
            .count(),
        high_priority: issues
            .iter()
            .filter(|i| i.severity() == Severity::High)
            .count(),
    };

    MdmReport {
        device_id: device_id.to_string(),
        timestamp: now,
        compliance_score: score,
        status: if score >= COMPLIANT_SCORE {
            ComplianceStatus::Compliant
        } else {
            ComplianceStatus::NonCompliant
        },
        profiles,
        security,
        apps,
        issues,
        recommendations,
        summary,
    }
}

/// Issue a compliance certificate, valid for 30 days from `now`, for a finished check.
pub fn generate_certificate<R: Rng>(
    report: &MdmReport,
    now: DateTime<Utc>,
    rng: &mut R,
) -> ComplianceCertificate {
    ComplianceCertificate {
        certificate_id: format!("CMP-{}", rng.random_range(10_000..=99_999)),
        device_id: report.device_id.clone(),
        issue_date: now,
        valid_until: now + Duration::days(CERTIFICATE_VALID_DAYS),
        compliance_status: report.status,
        score: report.compliance_score,
        issuer: "Corporate IT Compliance Authority".to_string(),
        signature: "Verified by Company MDM System".to_string(),
        details: CertificateDetails {
            profiles_installed: report.profiles.iter().filter(|p| p.installed).count(),
            security_compliant: report.compliance_score >= SECURITY_COMPLIANT_SCORE,
            apps_installed: report.apps.iter().filter(|a| a.installed).count(),
        },
    }
}

/// Plain-text compliance report.
pub fn render_text(report: &MdmReport) -> String {
    let rule = "=".repeat(40);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "MDM COMPLIANCE REPORT");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Device: {}", report.device_id);
    let _ = writeln!(out, "Time: {}", report.timestamp.to_rfc3339());
    let _ = writeln!(out, "Compliance Score: {}/100", report.compliance_score);
    let _ = writeln!(out, "Status: {}", report.status.as_str());
    let _ = writeln!(
        out,
        "Checks: {} passed, {} failed",
        report.summary.passed_checks, report.summary.failed_checks
    );

    if !report.issues.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "ISSUES ({}):", report.issues.len());
        for (i, issue) in report.issues.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. [{}] {}",
                i + 1,
                issue.severity().as_str().to_uppercase(),
                issue.describe()
            );
            let _ = writeln!(out, "   Action: {}", issue.action());
        }
    }

    if !report.recommendations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "MISSING APPS:");
        for recommendation in &report.recommendations {
            let _ = writeln!(out, "- {}", recommendation.action);
        }
    }

    out.trim_end().to_string()
}

/// Plain-text compliance certificate.
pub fn render_certificate_text(certificate: &ComplianceCertificate) -> String {
    let rule = "=".repeat(40);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "COMPLIANCE CERTIFICATE {}", certificate.certificate_id);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Device: {}", certificate.device_id);
    let _ = writeln!(out, "Status: {}", certificate.compliance_status.as_str());
    let _ = writeln!(out, "Score: {}/100", certificate.score);
    let _ = writeln!(out, "Issued: {}", certificate.issue_date.to_rfc3339());
    let _ = writeln!(out, "Valid until: {}", certificate.valid_until.to_rfc3339());
    let _ = writeln!(out, "Profiles installed: {}", certificate.details.profiles_installed);
    let _ = writeln!(out, "Apps installed: {}", certificate.details.apps_installed);
    let _ = writeln!(
        out,
        "Security compliant: {}",
        if certificate.details.security_compliant { "yes" } else { "no" }
    );
    let _ = writeln!(out, "Issuer: {}", certificate.issuer);
    let _ = write!(out, "Signature: {}", certificate.signature);

    out
}
