use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::scripts::mdm::{self, MdmReport};
use crate::scripts::network::{self, NetworkReport};
use crate::scripts::storage::{self, StorageReport};

/// The diagnostic scripts the portal can run.
///
/// All of them are simulations: they never talk to a real device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    NetworkValidator,
    MdmChecker,
    StorageCleaner,
}

impl ScriptKind {
    pub const ALL: [ScriptKind; 3] = [
        ScriptKind::NetworkValidator,
        ScriptKind::MdmChecker,
        ScriptKind::StorageCleaner,
    ];

    /// The identifier used in URLs and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptKind::NetworkValidator => "network_validator",
            ScriptKind::MdmChecker => "mdm_checker",
            ScriptKind::StorageCleaner => "storage_cleaner",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ScriptKind::NetworkValidator => "Network Validator",
            ScriptKind::MdmChecker => "MDM Checker",
            ScriptKind::StorageCleaner => "Storage Cleaner",
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScriptKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::UnknownScript(s.to_string()))
    }
}

/// The report produced by a script run; one variant per [`ScriptKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptReport {
    Network(NetworkReport),
    Mdm(MdmReport),
    Storage(StorageReport),
}

impl ScriptReport {
    pub fn kind(&self) -> ScriptKind {
        match self {
            ScriptReport::Network(_) => ScriptKind::NetworkValidator,
            ScriptReport::Mdm(_) => ScriptKind::MdmChecker,
            ScriptReport::Storage(_) => ScriptKind::StorageCleaner,
        }
    }

    /// Plain-text rendering of the report for terminals.
    pub fn render_text(&self) -> String {
        match self {
            ScriptReport::Network(r) => network::render_text(r),
            ScriptReport::Mdm(r) => mdm::render_text(r),
            ScriptReport::Storage(r) => storage::render_text(r),
        }
    }

    /// Number of issues the run reported.
    pub fn issue_count(&self) -> usize {
        match self {
            ScriptReport::Network(r) => r.issues.len(),
            ScriptReport::Mdm(r) => r.issues.len(),
            ScriptReport::Storage(r) => r.issues.len(),
        }
    }
}

/// How serious a reported issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// Run a simulated script for a device.
pub fn run_script<R: Rng>(
    kind: ScriptKind,
    device_id: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> ScriptReport {
    match kind {
        ScriptKind::NetworkValidator => {
            ScriptReport::Network(network::generate_health_report(device_id, now, rng))
        }
        ScriptKind::MdmChecker => {
            ScriptReport::Mdm(mdm::run_compliance_check(device_id, now, rng))
        }
        ScriptKind::StorageCleaner => {
            ScriptReport::Storage(storage::identify_storage_issues(device_id, now, rng))
        }
    }
}

/// Device id used when the caller does not provide one.
pub fn default_device_id(now: DateTime<Utc>) -> String {
    format!("user-{}", now.timestamp())
}

/// Pick one element of a non-empty constant table.
pub(crate) fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
