use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use supportdesk::api::scripts::RunScriptResponse;
use supportdesk::models::search::{SearchResponse, SuggestionsResponse};

/// Thin HTTP client for the supportdesk API.
pub struct SupportDeskClient {
    http: reqwest::Client,
    base_url: String,
}

impl SupportDeskClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn search(&self, query: &str, category: Option<&str>) -> Result<SearchResponse> {
        let mut params = vec![("q", query)];
        if let Some(category) = category {
            params.push(("category", category));
        }

        let response = self
            .http
            .get(self.url("/api/search"))
            .query(&params)
            .send()
            .await
            .context("search request failed")?;

        decode(response).await
    }

    pub async fn suggest(&self, prefix: &str) -> Result<SuggestionsResponse> {
        let response = self
            .http
            .get(self.url("/api/search-suggestions"))
            .query(&[("q", prefix)])
            .send()
            .await
            .context("suggestions request failed")?;

        decode(response).await
    }

    pub async fn run_script(
        &self,
        script: &str,
        device_id: Option<&str>,
    ) -> Result<RunScriptResponse> {
        let response = self
            .http
            .post(self.url(&format!("/api/run-script/{script}")))
            .json(&serde_json::json!({ "device_id": device_id }))
            .send()
            .await
            .context("run-script request failed")?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .context("unexpected response body");
    }

    let body: serde_json::Value = response.json().await.unwrap_or_default();
    bail!(api_error_message(status, &body))
}

/// Human-readable message for an API error response.
pub fn api_error_message(status: StatusCode, body: &serde_json::Value) -> String {
    let error = body["error"].as_str().unwrap_or("request failed");
    let mut message = format!("{status}: {error}");

    if let Some(available) = body["available_scripts"].as_array() {
        let names: Vec<&str> = available.iter().filter_map(|v| v.as_str()).collect();
        message.push_str(&format!(" (available: {})", names.join(", ")));
    }
    message
}
