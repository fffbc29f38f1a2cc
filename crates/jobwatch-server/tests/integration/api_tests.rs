use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use jobwatch_core::platform::Platform;
use jobwatch_core::testutil::{ChatCall, MockFilterStore, make_category};
use jobwatch_core::traits::{FilterStore, MessageRef};

use crate::integration::common::{
    TEST_TOKEN, action_body, form_request, setup_test_app, setup_test_app_with_db,
};

fn slash_body(token: &str) -> String {
    format!("token={token}&trigger_id=13345224609.738474920.8088930838d88f008e0&user_name=ada&text=")
}

#[tokio::test]
async fn health_returns_200_when_database_is_up() {
    let (app, _container) = setup_test_app_with_db().await;

    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn health_returns_503_when_database_is_down() {
    let app = setup_test_app(MockFilterStore::new());

    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["database"], "error");
}

#[tokio::test]
async fn wrong_token_returns_403() {
    let app = setup_test_app(MockFilterStore::new());

    let response = app
        .router
        .oneshot(form_request("/categories/guru", slash_body("wrong-token")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "Access forbidden");
    assert!(app.chat.calls().is_empty());
}

#[tokio::test]
async fn unknown_platform_returns_400() {
    let app = setup_test_app(MockFilterStore::new());

    let response = app
        .router
        .oneshot(form_request("/categories/upwork", slash_body(TEST_TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "unknown_platform");
}

#[tokio::test]
async fn categories_command_posts_category_list() {
    let filters = MockFilterStore::new()
        .with_category(make_category(Platform::Guru, "web", true))
        .with_category(make_category(Platform::Guru, "design", false));
    let app = setup_test_app(filters);

    let response = app
        .router
        .oneshot(form_request("/categories/guru", slash_body(TEST_TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        app.chat.calls(),
        vec![ChatCall::Categories {
            platform: Platform::Guru,
            selected: vec!["web".to_string()],
        }]
    );
}

#[tokio::test]
async fn keywords_command_opens_dialog_with_trigger() {
    let filters = MockFilterStore::new().with_keywords(Platform::Freelancer, &["rust"]);
    let app = setup_test_app(filters);

    let response = app
        .router
        .oneshot(form_request("/keywords/freelancer", slash_body(TEST_TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        app.chat.calls(),
        vec![ChatCall::KeywordsDialog {
            platform: Platform::Freelancer,
            trigger_id: "13345224609.738474920.8088930838d88f008e0".to_string(),
            keywords: vec!["rust".to_string()],
        }]
    );
}

#[tokio::test]
async fn category_button_toggles_and_edits_message() {
    let filters = MockFilterStore::new()
        .with_category(make_category(Platform::Guru, "web", false))
        .with_category(make_category(Platform::Guru, "design", true));
    let app = setup_test_app(filters);

    let payload = json!({
        "type": "interactive_message",
        "token": TEST_TOKEN,
        "callback_id": "guru_category",
        "channel": {"id": "C1", "name": "jobs"},
        "original_message": {"ts": "1700000000.000100"},
        "actions": [{"name": "web", "type": "button", "value": "web"}],
    });

    let response = app
        .router
        .oneshot(form_request("/action", action_body(&payload)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        app.chat.calls(),
        vec![ChatCall::Updated {
            platform: Platform::Guru,
            message: MessageRef {
                channel: "C1".into(),
                ts: "1700000000.000100".into(),
            },
            selected: vec!["web".to_string(), "design".to_string()],
        }]
    );
}

#[tokio::test]
async fn unknown_category_reports_error_in_chat() {
    let filters = MockFilterStore::new().with_category(make_category(Platform::Guru, "web", false));
    let app = setup_test_app(filters);

    let payload = json!({
        "token": TEST_TOKEN,
        "callback_id": "guru_category",
        "channel": {"id": "C1"},
        "original_message": {"ts": "1.1"},
        "actions": [{"value": "gone"}],
    });

    let response = app
        .router
        .oneshot(form_request("/action", action_body(&payload)))
        .await
        .unwrap();

    // Store errors are surfaced to the user, not to Slack's HTTP client.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        app.chat.calls(),
        vec![ChatCall::Error {
            platform: Platform::Guru
        }]
    );
}

#[tokio::test]
async fn keyword_dialog_submission_replaces_keywords() {
    let filters = MockFilterStore::new().with_keywords(Platform::Freelancer, &["old"]);
    let app = setup_test_app(filters);

    let payload = json!({
        "type": "dialog_submission",
        "token": TEST_TOKEN,
        "callback_id": "freelancer_keywords",
        "channel": {"id": "C1"},
        "submission": {"keywords": "rust, axum\n tokio"},
    });

    let response = app
        .router
        .oneshot(form_request("/action", action_body(&payload)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stored: Vec<String> = app
        .filters
        .list_keywords(Platform::Freelancer)
        .await
        .unwrap()
        .into_iter()
        .map(|k| k.value)
        .collect();
    assert_eq!(stored, vec!["rust", "axum", "tokio"]);
}

#[tokio::test]
async fn action_with_wrong_token_returns_403() {
    let app = setup_test_app(MockFilterStore::new().with_keywords(Platform::Guru, &["keep"]));

    let payload = json!({
        "token": "nope",
        "callback_id": "guru_keywords",
        "submission": {"keywords": ""},
    });

    let response = app
        .router
        .oneshot(form_request("/action", action_body(&payload)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.filters.list_keywords(Platform::Guru).await.unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_payload_returns_400() {
    let app = setup_test_app(MockFilterStore::new());

    let response = app
        .router
        .oneshot(form_request("/action", "payload=not-json".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
