use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use http_body_util::BodyExt;
use mailer::{Dispatcher, MailTransport, OutgoingMail, TransportError};
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use server::{ServerState, TokenKeys, router};
use tower::ServiceExt;

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<OutgoingMail>>,
    reject: HashSet<String>,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: OutgoingMail) -> Result<(), TransportError> {
        if self.reject.contains(&mail.to) {
            return Err(TransportError::Smtp("550 rejected".to_string()));
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

async fn app_with(transport: Arc<RecordingTransport>) -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder().database(db).build().await.unwrap();
    let dispatcher = Dispatcher::builder()
        .transport(transport)
        .sender("splitmail@example.com")
        .build()
        .unwrap();
    let tokens = TokenKeys::new(b"test-secret", Duration::seconds(3_600));

    router(ServerState::new(engine, dispatcher, tokens))
}

async fn call(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Register `username` and return `(token, user_id)`.
async fn sign_up(app: &Router, username: &str) -> (String, String) {
    let credentials = json!({"username": username, "password": "password"});
    let (status, _) = call(app, "POST", "/register", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(app, "POST", "/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["auth"], json!(true));
    (
        body["token"].as_str().unwrap().to_string(),
        body["user_id"].as_str().unwrap().to_string(),
    )
}

fn lunch_request() -> Value {
    json!({
        "friends": ["Alice"],
        "friendEmails": ["a@x.com"],
        "distribution": {
            "Alice": {"Bob": [{"description": "lunch", "amount": 10.00, "paid": false}]}
        }
    })
}

#[tokio::test]
async fn register_and_login() {
    let app = app_with(Arc::default()).await;
    sign_up(&app, "alice").await;

    let credentials = json!({"username": "alice", "password": "password"});
    let (status, body) = call(&app, "POST", "/register", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let wrong = json!({"username": "alice", "password": "nope"});
    let (status, body) = call(&app, "POST", "/login", None, Some(wrong)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Invalid password"));

    let unknown = json!({"username": "bob", "password": "password"});
    let (status, body) = call(&app, "POST", "/login", None, Some(unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("User not found"));
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = app_with(Arc::default()).await;

    let (status, _) = call(&app, "POST", "/send-distribution-email", None, Some(lunch_request())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        "POST",
        "/send-distribution-email",
        Some("garbage"),
        Some(lunch_request()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sends_one_email_per_friend() {
    let transport = Arc::new(RecordingTransport::default());
    let app = app_with(transport.clone()).await;
    let (token, _) = sign_up(&app, "alice").await;

    let (status, body) = call(
        &app,
        "POST",
        "/send-distribution-email",
        Some(&token),
        Some(lunch_request()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Emails sent successfully."));
    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@x.com");
    assert_eq!(sent[0].subject, "Money Distribution Details for Alice");
    assert!(sent[0].body.contains("Total amount due by Bob: 10.00"));
}

#[tokio::test]
async fn missing_fields_are_rejected_without_sending() {
    let transport = Arc::new(RecordingTransport::default());
    let app = app_with(transport.clone()).await;
    let (token, _) = sign_up(&app, "alice").await;

    for body in [
        json!({"friendEmails": ["a@x.com"], "distribution": {"Alice": {}}}),
        json!({"friends": ["Alice"], "distribution": {"Alice": {}}}),
        json!({"friends": ["Alice"], "friendEmails": ["a@x.com"]}),
        json!({"friends": [], "friendEmails": [], "distribution": {}}),
    ] {
        let (status, response) =
            call(&app, "POST", "/send-distribution-email", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], json!("Missing required data."));
    }
    assert!(transport.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn one_failed_delivery_fails_the_request() {
    let transport = Arc::new(RecordingTransport {
        reject: HashSet::from(["c@x.com".to_string()]),
        ..RecordingTransport::default()
    });
    let app = app_with(transport.clone()).await;
    let (token, _) = sign_up(&app, "alice").await;
    let body = json!({
        "friends": ["Alice", "Carol"],
        "friendEmails": ["a@x.com", "c@x.com"],
        "distribution": {
            "Alice": {"Bob": [{"description": "lunch", "amount": 10, "paid": false}]},
            "Carol": {"Bob": [{"description": "lunch", "amount": 10, "paid": true}]}
        }
    });

    let (status, response) =
        call(&app, "POST", "/send-distribution-email", Some(&token), Some(body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["error"], json!("Failed to send emails."));
}

#[tokio::test]
async fn distributions_are_saved_and_listed_per_user() {
    let app = app_with(Arc::default()).await;
    let (token, user_id) = sign_up(&app, "alice").await;
    let (other_token, other_id) = sign_up(&app, "carol").await;

    let record = json!({
        "amount": 22.5,
        "friends": "Alice, Carol",
        "spender": "Bob",
        "description": "Dinner",
        "distribution": {
            "Alice": {
                "Zoe": [{"description": "taxi", "amount": 4, "paid": true}],
                "Bob": [{"description": "dinner", "amount": 18.5, "paid": false}]
            }
        }
    });
    let (status, body) = call(&app, "POST", "/distribution", Some(&token), Some(record)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], json!("Distribution saved successfully"));

    let uri = format!("/distributions/{user_id}");
    let (status, body) = call(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["amount"], json!(22.5));
    assert_eq!(records[0]["description"], json!("Dinner"));
    let spenders: Vec<_> = records[0]["distribution"]["Alice"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(spenders.len(), 2);

    let (status, body) = call(&app, "GET", &format!("/distributions/{other_id}"), Some(&other_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = call(&app, "GET", &uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn distribution_for_another_user_is_forbidden() {
    let app = app_with(Arc::default()).await;
    let (token, _) = sign_up(&app, "alice").await;
    let (_, other_id) = sign_up(&app, "carol").await;

    let record = json!({"user_id": other_id, "amount": 1, "distribution": {}});
    let (status, _) = call(&app, "POST", "/distribution", Some(&token), Some(record)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn negative_payment_is_unprocessable() {
    let transport = Arc::new(RecordingTransport::default());
    let app = app_with(transport.clone()).await;
    let (token, _) = sign_up(&app, "alice").await;
    let body = json!({
        "friends": ["Alice"],
        "friendEmails": ["a@x.com"],
        "distribution": {"Alice": {"Bob": [{"description": "x", "amount": -3, "paid": false}]}}
    });

    let (status, _) = call(&app, "POST", "/send-distribution-email", Some(&token), Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(transport.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_roster_wins_over_invalid_amounts() {
    let transport = Arc::new(RecordingTransport::default());
    let app = app_with(transport.clone()).await;
    let (token, _) = sign_up(&app, "alice").await;
    let body = json!({
        "friends": [],
        "friendEmails": ["a@x.com"],
        "distribution": {"Alice": {"Bob": [{"description": "x", "amount": -3, "paid": false}]}}
    });

    let (status, response) =
        call(&app, "POST", "/send-distribution-email", Some(&token), Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], json!("Missing required data."));
    assert!(transport.sent.lock().unwrap().is_empty());
}
