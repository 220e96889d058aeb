// Shared fixtures for the HTTP API tests: fake collaborators and request helpers

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use campus_market::api::create_router;
use campus_market::config::Config;
use campus_market::infrastructure::{
    DocumentStore, EmailMessage, Identity, IdentityProvider, ImageHost, Mailer, ProfileAttributes,
    SqliteStore, UploadOptions, UploadedImage,
};
use campus_market::{AppError, AppResult, AppState};

pub const BOUNDARY: &str = "campus-market-test-boundary";

/// Bearer token for an external id
pub fn token(external_id: &str) -> String {
    format!("token-{}", external_id)
}

/// Tokens are `token-<external id>`; ids starting with `ghost` have no provider profile
pub struct FakeIdentity;

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify(&self, token: &str) -> AppResult<Identity> {
        token
            .strip_prefix("token-")
            .map(Identity::new)
            .ok_or_else(|| AppError::Unauthorized("bad token".to_string()))
    }

    async fn profile(&self, external_id: &str) -> AppResult<Option<ProfileAttributes>> {
        if external_id.starts_with("ghost") {
            return Ok(None);
        }
        Ok(Some(ProfileAttributes {
            email: Some(format!("{}@campus.edu", external_id)),
            username: Some(external_id.to_string()),
            first_name: Some(external_id.to_string()),
            last_name: Some("Student".to_string()),
            image_url: None,
        }))
    }
}

#[derive(Default)]
pub struct FakeImageHost {
    pub uploads: AtomicUsize,
    pub destroyed: AtomicUsize,
    /// Fail the upload of any file whose data URL has this mime type
    pub reject_mime: Mutex<Option<String>>,
}

#[async_trait]
impl ImageHost for FakeImageHost {
    async fn upload(&self, data_url: String, options: &UploadOptions) -> AppResult<UploadedImage> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        let rejected = self.reject_mime.lock().unwrap().clone();
        if let Some(mime) = rejected {
            if data_url.starts_with(&format!("data:{};", mime)) {
                return Err(AppError::Upstream("image host refused the file".to_string()));
            }
        }
        Ok(UploadedImage {
            url: format!("https://img.test/{}/{}.jpg", options.folder, n),
            public_id: format!("{}/{}", options.folder, n),
            width: 800,
            height: 600,
        })
    }

    async fn destroy(&self, _public_id: &str) -> AppResult<()> {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub images: Arc<FakeImageHost>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_store(SqliteStore::new_in_memory().await.unwrap()).await
    }

    pub async fn with_store(store: SqliteStore) -> Self {
        let mut config = Config::from_env().unwrap();
        config.server.allowed_origins = Vec::new();
        config.server.node_id = 1;

        let images = Arc::new(FakeImageHost::default());
        let mailer = Arc::new(RecordingMailer::default());
        let store: Arc<dyn DocumentStore> = Arc::new(store);
        let state = AppState::with_collaborators(
            config,
            store,
            Arc::new(FakeIdentity),
            images.clone(),
            mailer.clone(),
        )
        .await
        .unwrap();

        Self {
            router: create_router(state),
            images,
            mailer,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, user: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, user, Some(body)).await
    }

    /// Multipart upload of `(file name, content type, bytes)` parts in field `images`
    pub async fn upload(&self, user: Option<&str>, files: &[(&str, &str, Vec<u8>)]) -> (StatusCode, Value) {
        let mut body = Vec::new();
        for (name, content_type, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, name, content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user)));
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub fn sent_mail(&self) -> Vec<EmailMessage> {
        self.mailer.sent.lock().unwrap().clone()
    }
}

/// Minimal valid listing body
pub fn listing_body(title: &str, category: &str, price: f64) -> Value {
    serde_json::json!({
        "title": title,
        "description": format!("{} in good shape", title),
        "price": price,
        "category": category,
        "condition": "good",
        "location": "Campus A"
    })
}

/// Create a listing as `seller` and return its id
pub async fn create_listing(app: &TestApp, seller: &str, title: &str, category: &str, price: f64) -> String {
    let (status, body) = app
        .post("/api/listings", Some(seller), listing_body(title, category, price))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}
