mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn test_setup_user_creates_profile_once() {
    let app = TestApp::new().await;

    let (status, _) = app.post("/api/auth/setup-user", None, json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, first) = app.post("/api/auth/setup-user", Some("ada"), json!({})).await;
    assert_eq!(status, StatusCode::CREATED, "{}", first);
    assert_eq!(first["externalId"], "ada");
    assert_eq!(first["email"], "ada@campus.edu");
    assert_eq!(first["bio"], "");
    assert_eq!(first["followers"], json!([]));
    assert!(first.get("user").is_none());

    let (status, second) = app.post("/api/auth/setup-user", Some("ada"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["externalId"], "ada");

    let (status, err) = app.post("/api/auth/setup-user", Some("ghost_1"), json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["kind"], "not_found");
}

#[tokio::test]
async fn test_invalid_token_is_anonymous() {
    let app = TestApp::new().await;
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/auth/setup-user")
        .header("authorization", "Bearer not-a-session")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_find_users() {
    let app = TestApp::new().await;
    app.post("/api/auth/setup-user", Some("ada"), json!({})).await;
    app.post("/api/auth/setup-user", Some("grace"), json!({})).await;

    let (status, all) = app.get("/api/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, by_username) = app.get("/api/users?username=grace").await;
    assert_eq!(by_username.as_array().unwrap().len(), 1);
    assert_eq!(by_username[0]["externalId"], "grace");

    let (_, preferred) = app.get("/api/users?externalId=ada&username=grace").await;
    assert_eq!(preferred.as_array().unwrap().len(), 1);
    assert_eq!(preferred[0]["username"], "ada");

    let (_, none) = app.get("/api/users?username=nobody").await;
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn test_explicit_profile_creation() {
    let app = TestApp::new().await;
    let body = json!({
        "email": "Lin@Campus.edu",
        "username": "lin_c",
        "firstName": "Lin",
        "lastName": "Chen",
        "socialLinks": {"instagram": "@lin"}
    });

    let (status, created) = app.post("/api/users", Some("lin"), body.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["email"], "lin@campus.edu");
    assert_eq!(created["socialLinks"]["instagram"], "@lin");

    let (status, err) = app.post("/api/users", Some("lin"), body.clone()).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["kind"], "conflict");

    // Same username under a different identity
    let (status, _) = app.post("/api/users", Some("other"), body).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, err) = app
        .post(
            "/api/users",
            Some("kim"),
            json!({"email": "kim", "username": "k", "firstName": "Kim"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details: Vec<String> = serde_json::from_value(err["details"].clone()).unwrap();
    assert!(details.contains(&"email format is invalid".to_string()));
    assert!(details.contains(&"username must be at least 3 characters".to_string()));
    assert!(details.contains(&"lastName is required".to_string()));
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::new().await;

    let (status, _) = app
        .call(Method::PUT, "/api/users/me", Some("ada"), Some(json!({"bio": "hi"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.post("/api/auth/setup-user", Some("ada"), json!({})).await;
    let (status, updated) = app
        .call(
            Method::PUT,
            "/api/users/me",
            Some("ada"),
            Some(json!({"bio": "Math major", "website": "https://ada.dev"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    assert_eq!(updated["bio"], "Math major");
    assert_eq!(updated["website"], "https://ada.dev");
    assert_eq!(updated["username"], "ada");

    let (status, _) = app
        .call(Method::PUT, "/api/users/me", Some("ada"), Some(json!({"username": "root"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Method::PUT, "/api/users/me", Some("ada"), Some(json!({"website": "ftp:nope"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
