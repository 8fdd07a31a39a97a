use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::scripts::runner::{self, ScriptKind, ScriptReport};

/// Optional body of `POST /api/run-script/{name}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunScriptRequest {
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Response of a successful script run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunScriptResponse {
    pub success: bool,
    pub script: ScriptKind,
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub result: ScriptReport,
}

/// Parse the request body. An empty body means "no options".
pub fn parse_run_request(body: &[u8]) -> Result<RunScriptRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RunScriptRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}

/// Core script execution logic, separated from the HTTP layer for testability.
///
/// Resolves the script name, picks a device id and runs the simulation.
pub fn process_run_script<R: Rng>(
    script_name: &str,
    request: RunScriptRequest,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<RunScriptResponse, AppError> {
    let kind: ScriptKind = script_name.parse()?;

    let device_id = request
        .device_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| runner::default_device_id(now));

    let result = runner::run_script(kind, &device_id, now, rng);

    tracing::info!(
        script = %kind,
        device_id = %device_id,
        issues = result.issue_count(),
        status = "success",
        "Script execution"
    );

    Ok(RunScriptResponse {
        success: true,
        script: kind,
        device_id,
        timestamp: now,
        result,
    })
}

/// Axum handler for `POST /api/run-script/{name}`.
#[cfg(feature = "server")]
pub async fn run_script_handler(
    axum::extract::Path(script_name): axum::extract::Path<String>,
    body: axum::body::Bytes,
) -> Result<axum::Json<RunScriptResponse>, AppError> {
    let request = parse_run_request(&body)?;
    let response = process_run_script(&script_name, request, Utc::now(), &mut rand::rng())
        .inspect_err(|e| tracing::warn!(script = %script_name, "Script execution failed: {e}"))?;
    Ok(axum::Json(response))
}
