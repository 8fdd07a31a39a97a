use std::fmt::Write;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rand::Rng;
use supportdesk::api::scripts::RunScriptResponse;
use supportdesk::models::search::{SearchResponse, SuggestionKind, SuggestionsResponse};
use supportdesk::scripts::mdm;
use supportdesk::scripts::runner::{ScriptKind, ScriptReport};
use supportdesk::search::history::{HistorySession, HistorySlot, SearchHistory};

use crate::client::SupportDeskClient;

/// Search the knowledge base and remember the query once the search succeeded.
pub async fn search<S: HistorySlot>(
    client: &SupportDeskClient,
    session: &mut HistorySession<S>,
    query: &str,
    category: Option<&str>,
) -> Result<String> {
    let response = client.search(query, category).await?;
    session.record(query)?;
    Ok(render_results(&response))
}

pub async fn suggest(client: &SupportDeskClient, prefix: &str) -> Result<String> {
    Ok(render_suggestions(&client.suggest(prefix).await?))
}

/// How script results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

pub async fn run_script(
    client: &SupportDeskClient,
    script: &str,
    device_id: Option<&str>,
    format: OutputFormat,
    certificate: bool,
) -> Result<String> {
    if certificate && script != ScriptKind::MdmChecker.as_str() {
        bail!("--certificate is only available for {}", ScriptKind::MdmChecker);
    }

    let response = client.run_script(script, device_id).await?;
    render_run(&response, format, certificate, Utc::now(), &mut rand::rng())
}

/// Render a script run, or the compliance certificate issued from an MDM run.
pub fn render_run<R: Rng>(
    response: &RunScriptResponse,
    format: OutputFormat,
    certificate: bool,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<String> {
    if certificate {
        let ScriptReport::Mdm(report) = &response.result else {
            bail!("{} did not return a compliance report", response.script);
        };
        let issued = mdm::generate_certificate(report, now, rng);
        return Ok(match format {
            OutputFormat::Json => serde_json::to_string_pretty(&issued)?,
            OutputFormat::Text => mdm::render_certificate_text(&issued),
        });
    }

    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(response)?,
        OutputFormat::Text => response.result.render_text(),
    })
}

/// Show the history, or clear it first when asked to.
pub fn history<S: HistorySlot>(
    session: &mut HistorySession<S>,
    clear: bool,
    now: DateTime<Utc>,
) -> Result<String> {
    if clear {
        session.clear()?;
        return Ok("Search history cleared.".to_string());
    }
    Ok(render_history(session.history(), now))
}

pub fn render_results(response: &SearchResponse) -> String {
    if response.results.is_empty() {
        return "No articles found.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} article(s), view: {}", response.count, response.view);
    for article in &response.results {
        let _ = writeln!(
            out,
            "  [{}] {} ({}, {:?}, {})",
            article.id, article.title, article.category, article.difficulty, article.estimated_time
        );
    }
    out.trim_end().to_string()
}

pub fn render_suggestions(response: &SuggestionsResponse) -> String {
    if response.suggestions.is_empty() {
        return "No suggestions.".to_string();
    }

    response
        .suggestions
        .iter()
        .map(|s| match (s.kind, s.id) {
            (SuggestionKind::Article, Some(id)) => format!("  [{id}] {}", s.text),
            _ => format!("  {}", s.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_history(history: &SearchHistory, now: DateTime<Utc>) -> String {
    if history.is_empty() {
        return "No recent searches.".to_string();
    }

    history
        .entries()
        .iter()
        .map(|entry| format!("  {} ({})", entry.query, time_ago(entry.timestamp, now)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Coarse relative time, e.g. `3m ago`.
pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds().max(0);
    match seconds {
        0..=59 => "just now".to_string(),
        60..=3_599 => format!("{}m ago", seconds / 60),
        3_600..=86_399 => format!("{}h ago", seconds / 3_600),
        _ => format!("{}d ago", seconds / 86_400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use supportdesk::api::scripts::{process_run_script, RunScriptRequest};
    use supportdesk::db::models::{Article, ArticleContent, Difficulty};
    use supportdesk::models::search::SuggestionEntry;
    use supportdesk::search::history::FileHistorySlot;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_render_results() {
        let response = SearchResponse {
            results: vec![Article {
                id: 3,
                title: "VPN keeps disconnecting".to_string(),
                category: "VPN".to_string(),
                difficulty: Difficulty::Medium,
                estimated_time: "10 minutes".to_string(),
                views: 0,
                last_updated: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
                content: ArticleContent {
                    problem: "drops".to_string(),
                    solution_steps: vec![],
                    related_scripts: vec![],
                    tags: vec![],
                },
                created_at: now(),
            }],
            count: 1,
            view: "/search?q=vpn".to_string(),
        };

        assert_eq!(
            render_results(&response),
            "1 article(s), view: /search?q=vpn\n  [3] VPN keeps disconnecting (VPN, Medium, 10 minutes)"
        );
    }

    #[test]
    fn test_render_empty_results() {
        let response = SearchResponse {
            results: vec![],
            count: 0,
            view: "/search?q=x".to_string(),
        };
        assert_eq!(render_results(&response), "No articles found.");
    }

    #[test]
    fn test_render_suggestions() {
        let response = SuggestionsResponse {
            suggestions: vec![
                SuggestionEntry {
                    text: "VPN keeps disconnecting".to_string(),
                    category: Some("VPN".to_string()),
                    id: Some(3),
                    kind: SuggestionKind::Article,
                },
                SuggestionEntry {
                    text: "vpn connect".to_string(),
                    category: Some("Common Search".to_string()),
                    id: None,
                    kind: SuggestionKind::SearchTerm,
                },
            ],
        };
        assert_eq!(
            render_suggestions(&response),
            "  [3] VPN keeps disconnecting\n  vpn connect"
        );
        assert_eq!(
            render_suggestions(&SuggestionsResponse::default()),
            "No suggestions."
        );
    }

    /// A script run as the CLI receives it, decoded from the wire format.
    fn received_run(script: &str, seed: u64) -> RunScriptResponse {
        let response = process_run_script(
            script,
            RunScriptRequest {
                device_id: Some("ios-cli-1".to_string()),
            },
            now(),
            &mut StdRng::seed_from_u64(seed),
        )
        .unwrap();
        serde_json::from_str(&serde_json::to_string(&response).unwrap()).unwrap()
    }

    fn render(run: &RunScriptResponse, format: OutputFormat, certificate: bool) -> Result<String> {
        render_run(run, format, certificate, now(), &mut StdRng::seed_from_u64(9))
    }

    #[test]
    fn test_render_run_text_per_script() {
        let network = received_run("network_validator", 1);
        let text = render(&network, OutputFormat::Text, false).unwrap();
        assert!(text.contains("iOS NETWORK HEALTH REPORT"));
        assert!(text.contains("Device: ios-cli-1"));

        let storage = received_run("storage_cleaner", 2);
        let text = render(&storage, OutputFormat::Text, false).unwrap();
        assert!(text.starts_with("iOS STORAGE OPTIMIZATION REPORT"));

        let mdm_run = received_run("mdm_checker", 3);
        let text = render(&mdm_run, OutputFormat::Text, false).unwrap();
        assert!(text.contains("MDM COMPLIANCE REPORT"));
    }

    #[test]
    fn test_render_run_json_keeps_envelope() {
        let run = received_run("storage_cleaner", 4);
        let json = render(&run, OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["script"], "storage_cleaner");
        assert_eq!(value["device_id"], "ios-cli-1");
    }

    #[test]
    fn test_render_certificate() {
        let run = received_run("mdm_checker", 5);
        let ScriptReport::Mdm(report) = &run.result else {
            panic!("expected an MDM report");
        };

        let json = render(&run, OutputFormat::Json, true).unwrap();
        let certificate: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(certificate["certificate_id"].as_str().unwrap().starts_with("CMP-"));
        assert_eq!(certificate["device_id"], "ios-cli-1");
        assert_eq!(certificate["score"], report.compliance_score);
        assert_eq!(
            certificate["valid_until"],
            serde_json::to_value(now() + Duration::days(30)).unwrap()
        );

        let text = render(&run, OutputFormat::Text, true).unwrap();
        assert!(text.contains("COMPLIANCE CERTIFICATE CMP-"));
    }

    #[test]
    fn test_certificate_requires_mdm_report() {
        let run = received_run("network_validator", 6);
        let err = render(&run, OutputFormat::Text, true).unwrap_err();
        assert!(err.to_string().contains("compliance report"));
    }

    #[test]
    fn test_time_ago() {
        assert_eq!(time_ago(now(), now()), "just now");
        assert_eq!(time_ago(now() - Duration::minutes(5), now()), "5m ago");
        assert_eq!(time_ago(now() - Duration::hours(2), now()), "2h ago");
        assert_eq!(time_ago(now() - Duration::days(3), now()), "3d ago");
        assert_eq!(time_ago(now() + Duration::minutes(1), now()), "just now");
    }

    #[test]
    fn test_history_command_lists_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = HistorySession::open(FileHistorySlot::in_dir(dir.path())).unwrap();

        assert_eq!(history(&mut session, false, now()).unwrap(), "No recent searches.");

        session.record("vpn").unwrap();
        session.record("email setup").unwrap();
        let listing = history(&mut session, false, Utc::now()).unwrap();
        assert!(listing.starts_with("  email setup (just now)"));
        assert!(listing.contains("  vpn (just now)"));

        assert_eq!(
            history(&mut session, true, now()).unwrap(),
            "Search history cleared."
        );

        let reopened = HistorySession::open(FileHistorySlot::in_dir(dir.path())).unwrap();
        assert!(reopened.history().is_empty());
    }
}
