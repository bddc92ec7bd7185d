mod common;

use common::{test_config, TestApp};
use resource_service::config::ErrorStatusPolicy;
use resource_service::services::providers::mock::{MockReply, MockTextProvider, SAMPLE_BUNDLE};
use resource_service::services::providers::ProviderError;
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn fenced_json_is_returned_parsed() {
    let provider = Arc::new(MockTextProvider::always("```json\n{\"a\":1}\n```"));
    let app = TestApp::spawn(provider).await;

    let (status, body) = app.fetch_resources().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"a": 1}));
}

#[tokio::test]
async fn sample_bundle_is_relayed_losslessly() {
    let app = TestApp::spawn(Arc::new(MockTextProvider::sample())).await;

    let (status, body) = app.fetch_resources().await;

    assert_eq!(status, StatusCode::OK);
    for key in [
        "scholarships_grants",
        "career_opportunities",
        "mentorship_programs",
        "skill_development",
    ] {
        assert!(body[key].is_array(), "missing {}", key);
    }
    assert_eq!(body["mentorship_programs"][0]["mentors_available"], 40);
    assert!(SAMPLE_BUNDLE.contains("Women in STEM Scholarship"));
    assert_eq!(
        body["scholarships_grants"][0]["title"],
        "Women in STEM Scholarship"
    );
}

#[tokio::test]
async fn integers_wider_than_64_bits_keep_every_digit() {
    let provider = Arc::new(MockTextProvider::always(
        "```json\n{\"amount\": 123456789012345678901234567890, \"id\": 18446744073709551616, \"ratio\": 0.1}\n```",
    ));
    let app = TestApp::spawn(provider).await;

    let response = app.get("/fetch_resources").await;
    assert_eq!(response.status(), StatusCode::OK);

    let text = response.text().await.expect("Failed to read body");
    assert!(text.contains("123456789012345678901234567890"), "{}", text);
    assert!(text.contains("18446744073709551616"), "{}", text);
    assert!(text.contains("0.1"), "{}", text);
}

#[tokio::test]
async fn empty_text_is_reported() {
    let provider = Arc::new(MockTextProvider::scripted([MockReply::text("")]));
    let app = TestApp::spawn(provider).await;

    let (status, body) = app.fetch_resources().await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Empty response from Gemini API"}));
}

#[tokio::test]
async fn missing_text_is_reported_as_empty() {
    let provider = Arc::new(MockTextProvider::scripted([MockReply::Empty]));
    let app = TestApp::spawn(provider).await;

    let (_, body) = app.fetch_resources().await;

    assert_eq!(body, json!({"error": "Empty response from Gemini API"}));
}

#[tokio::test]
async fn whitespace_only_text_is_invalid_json() {
    let provider = Arc::new(MockTextProvider::always("  \n"));
    let app = TestApp::spawn(provider).await;

    let (status, body) = app.fetch_resources().await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({"error": "Invalid JSON format returned from Gemini"})
    );
}

#[tokio::test]
async fn non_json_text_is_reported() {
    let provider = Arc::new(MockTextProvider::always("not json"));
    let app = TestApp::spawn(provider).await;

    let (status, body) = app.fetch_resources().await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({"error": "Invalid JSON format returned from Gemini"})
    );
}

#[tokio::test]
async fn provider_failure_is_reported_and_server_keeps_serving() {
    let provider = Arc::new(MockTextProvider::scripted([
        MockReply::Fail(ProviderError::NetworkError("connection refused".into())),
        MockReply::text("{\"ok\": true}"),
    ]));
    let app = TestApp::spawn(provider).await;

    let (status, body) = app.fetch_resources().await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({"error": "Error fetching resources: Network error: connection refused"})
    );

    let (status, body) = app.fetch_resources().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn legacy_policy_answers_200_with_error_body() {
    let mut config = test_config();
    config.resources.error_status = ErrorStatusPolicy::Legacy;
    let provider = Arc::new(MockTextProvider::scripted([MockReply::Fail(
        ProviderError::RateLimited,
    )]));
    let app = TestApp::spawn_with(config, provider).await;

    let (status, body) = app.fetch_resources().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"error": "Error fetching resources: Rate limited"})
    );
}

#[tokio::test]
async fn slow_provider_yields_gateway_timeout() {
    let mut config = test_config();
    config.provider.timeout_secs = 1;
    let provider =
        Arc::new(MockTextProvider::always("{\"a\":1}").with_delay(Duration::from_secs(3)));
    let app = TestApp::spawn_with(config, provider).await;

    let (status, body) = app.fetch_resources().await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body, json!({"error": "Error fetching resources: Timed out after 1s"}));
}

#[tokio::test]
async fn transient_failure_is_retried_when_enabled() {
    let mut config = test_config();
    config.provider.max_retries = 1;
    let provider = Arc::new(MockTextProvider::scripted([
        MockReply::Fail(ProviderError::ApiError {
            status: 503,
            message: "The model is overloaded.".into(),
        }),
        MockReply::text("{\"a\":1}"),
    ]));
    let app = TestApp::spawn_with(config, provider.clone()).await;

    let (status, body) = app.fetch_resources().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"a": 1}));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn schema_validation_coerces_key_spelling() {
    let mut config = test_config();
    config.resources.validate_schema = true;
    let provider = Arc::new(MockTextProvider::always(
        r#"```json
{"education_resources": {
  "Scholarships & Grants": [{"title": "Merit Award", "amount": "$1,000"}],
  "Career Opportunities": [],
  "Mentorship Programs": [],
  "Skill Development": []
}}
```"#,
    ));
    let app = TestApp::spawn_with(config, provider).await;

    let (status, body) = app.fetch_resources().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "scholarships_grants": [{"title": "Merit Award", "amount": "$1,000"}],
            "career_opportunities": [],
            "mentorship_programs": [],
            "skill_development": []
        })
    );
}

#[tokio::test]
async fn schema_validation_rejects_unrelated_json() {
    let mut config = test_config();
    config.resources.validate_schema = true;
    let app = TestApp::spawn_with(config, Arc::new(MockTextProvider::always("{\"a\":1}"))).await;

    let (status, body) = app.fetch_resources().await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body,
        json!({"error": "Resource schema mismatch: missing category 'scholarships_grants'"})
    );
}

#[tokio::test]
async fn only_get_is_allowed() {
    let app = TestApp::spawn(Arc::new(MockTextProvider::sample())).await;

    let response = app
        .client
        .post(format!("{}/fetch_resources", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn concurrent_requests_get_their_own_responses() {
    let provider = Arc::new(
        MockTextProvider::scripted([
            MockReply::text("{\"call\": 1}"),
            MockReply::text("{\"call\": 2}"),
        ])
        .with_delay(Duration::from_millis(100)),
    );
    let app = TestApp::spawn(provider.clone()).await;

    let (first, second) = tokio::join!(app.fetch_resources(), app.fetch_resources());

    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);

    let mut calls = vec![
        first.1["call"].as_i64().unwrap(),
        second.1["call"].as_i64().unwrap(),
    ];
    calls.sort();
    assert_eq!(calls, vec![1, 2]);
    assert_eq!(provider.calls(), 2);
}
