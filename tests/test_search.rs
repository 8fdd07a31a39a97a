mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn search_ranks_title_matches_before_body_matches() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let response = server
        .get("/api/search")
        .add_query_param("q", "connect")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    // Title matches first (Email before VPN), then body matches by category priority.
    assert_eq!(common::ids(&body["results"]), vec![1, 3, 4, 7, 2, 8]);
    assert_eq!(body["count"], 6);
    assert_eq!(body["view"], "/search?q=connect");
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let lower: serde_json::Value = server
        .get("/api/search")
        .add_query_param("q", "vpn")
        .await
        .json();
    let upper: serde_json::Value = server
        .get("/api/search")
        .add_query_param("q", "VPN")
        .await
        .json();

    assert_eq!(common::ids(&lower["results"]), vec![3]);
    assert_eq!(lower["results"], upper["results"]);
}

#[tokio::test]
async fn search_view_path_is_url_encoded() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let body: serde_json::Value = server
        .get("/api/search")
        .add_query_param("q", "email setup")
        .await
        .json();

    assert_eq!(body["view"], "/search?q=email%20setup");
}

#[tokio::test]
async fn search_falls_back_to_keywords() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    // Neither article contains the phrase, but both words occur in article 1.
    let body: serde_json::Value = server
        .get("/api/search")
        .add_query_param("q", "exchange server")
        .await
        .json();

    assert_eq!(common::ids(&body["results"]), vec![1]);
}

#[tokio::test]
async fn search_with_category_filter() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let body: serde_json::Value = server
        .get("/api/search")
        .add_query_param("q", "connect")
        .add_query_param("category", "General")
        .await
        .json();

    assert_eq!(common::ids(&body["results"]), vec![8]);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn search_without_matches_returns_empty_results() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let body: serde_json::Value = server
        .get("/api/search")
        .add_query_param("q", "printer toner")
        .await
        .json();

    assert_eq!(body["count"], 0);
    assert!(body["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn search_rejects_blank_query() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    let response = server
        .get("/api/search")
        .add_query_param("q", "   ")
        .await;
    response.assert_status_bad_request();

    let response = server.get("/api/search").await;
    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn search_reports_unavailable_store() {
    let env = common::TestEnv::unavailable();
    let server = env.server_permissive();

    let response = server
        .get("/api/search")
        .add_query_param("q", "email")
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert!(body.get("results").is_none());
    assert!(body["error"].as_str().unwrap().contains("unavailable"));
}
