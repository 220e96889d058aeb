mod common;

use axum::http::{Method, StatusCode};
use futures::future::join_all;
use serde_json::{json, Value};

use campus_market::config::DatabaseConfig;
use campus_market::infrastructure::SqliteStore;
use common::TestApp;

fn donated_item() -> Value {
    json!({
        "donorName": "Dana",
        "donorEmail": "dana@campus.edu",
        "title": "Lab Coat",
        "description": "Size M, washed",
        "category": "lab-equipment",
        "condition": "good"
    })
}

#[tokio::test]
async fn test_donated_item_borrowed_once() {
    let app = TestApp::new().await;

    let mut body = donated_item();
    body["available"] = json!(false);
    let (status, item) = app.post("/api/donated-items", None, body).await;
    assert_eq!(status, StatusCode::CREATED, "{}", item);
    assert_eq!(item["available"], true);
    assert!(item.get("borrowedBy").is_none());
    let borrow_uri = format!("/api/donated-items/{}/borrow", item["id"].as_str().unwrap());

    let (status, err) = app.post(&borrow_uri, None, json!({"borrowerEmail": "x@y.z"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["kind"], "validation_error");

    let (status, borrowed) = app
        .post(&borrow_uri, None, json!({"borrowerName": "Sam", "borrowerPhone": "555-0100"}))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", borrowed);
    assert_eq!(borrowed["available"], false);
    assert_eq!(borrowed["borrowedBy"], "Sam");
    let borrowed_at = borrowed["borrowedAt"].clone();
    assert!(borrowed_at.is_string());

    let mail = app.sent_mail();
    assert_eq!(mail.len(), 1);
    assert_eq!(mail[0].to, "dana@campus.edu");
    assert!(mail[0].text.contains("Sam"));

    let (status, err) = app.post(&borrow_uri, None, json!({"borrowerName": "Alex"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["kind"], "conflict");

    let (_, page) = app.get("/api/donated-items?available=false").await;
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["items"][0]["borrowedBy"], "Sam");
    assert_eq!(page["items"][0]["borrowedAt"], borrowed_at);

    let (status, _) = app
        .post("/api/donated-items/31337/borrow", None, json!({"borrowerName": "Sam"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_donated_item_listing_filters() {
    let app = TestApp::new().await;
    app.post("/api/donated-items", None, donated_item()).await;
    let mut books = donated_item();
    books["category"] = json!("books");
    books["title"] = json!("Linear Algebra");
    app.post("/api/donated-items", None, books).await;

    let (status, page) = app.get("/api/donated-items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"], json!({"page": 1, "limit": 20, "total": 2, "pages": 1}));
    assert_eq!(page["items"][0]["title"], "Linear Algebra");

    let (_, page) = app.get("/api/donated-items?category=books&available=true").await;
    assert_eq!(page["pagination"]["total"], 1);

    let (status, _) = app.get("/api/donated-items?category=spaceships").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut bad = donated_item();
    bad["title"] = json!("t".repeat(201));
    let (status, err) = app.post("/api/donated-items", None, bad).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["details"], json!(["title cannot exceed 200 characters"]));
}

fn event(title: &str, date: &str, max_attendees: i64) -> Value {
    json!({
        "title": title,
        "eventDate": date,
        "organizer": "Student Union",
        "maxAttendees": max_attendees,
        "currentAttendees": 40
    })
}

#[tokio::test]
async fn test_event_rsvp_respects_capacity() {
    let app = TestApp::new().await;

    let (status, created) = app
        .post("/api/events", None, event("Career Fair", "2031-04-12T09:00:00Z", 2))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["currentAttendees"], 0);
    assert_eq!(created["status"], "active");
    let rsvp_uri = format!("/api/events/{}/rsvp", created["id"].as_str().unwrap());

    for expected in 1..=2 {
        let (status, updated) = app.call(Method::POST, &rsvp_uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["currentAttendees"], expected);
    }

    let (status, err) = app.call(Method::POST, &rsvp_uri, None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "Event is full");

    let (status, _) = app.call(Method::POST, "/api/events/5150/rsvp", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inactive_and_unlimited_events() {
    let app = TestApp::new().await;

    let mut cancelled = event("Gala", "2031-05-01", 0);
    cancelled["status"] = json!("cancelled");
    let (_, gala) = app.post("/api/events", None, cancelled).await;
    let (status, err) = app
        .call(Method::POST, &format!("/api/events/{}/rsvp", gala["id"].as_str().unwrap()), None, None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "Event is not active");

    let (_, open) = app.post("/api/events", None, event("Open Mic", "2031-03-01", 0)).await;
    let open_uri = format!("/api/events/{}/rsvp", open["id"].as_str().unwrap());
    for _ in 0..5 {
        let (status, _) = app.call(Method::POST, &open_uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, events) = app.get("/api/events").await;
    let titles: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Open Mic", "Gala"]);

    let (_, active) = app.get("/api/events?status=active").await;
    assert_eq!(active.as_array().unwrap().len(), 1);

    let (status, err) = app
        .post("/api/events", None, json!({"title": "No date", "organizer": "Club"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["details"], json!(["eventDate is required"]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rsvps_never_exceed_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        url: format!("sqlite:{}", dir.path().join("market.db").display()),
        max_connections: 5,
        acquire_timeout_secs: 10,
    };
    let store = SqliteStore::connect(&config).await.unwrap();
    let app = TestApp::with_store(store).await;

    let (_, created) = app
        .post("/api/events", None, event("Hackathon", "2031-06-01", 5))
        .await;
    let rsvp_uri = format!("/api/events/{}/rsvp", created["id"].as_str().unwrap());

    let calls = (0..20).map(|_| app.call(Method::POST, &rsvp_uri, None, None));
    let results = join_all(calls).await;

    let accepted = results.iter().filter(|(s, _)| *s == StatusCode::OK).count();
    let refused = results.iter().filter(|(s, _)| *s == StatusCode::CONFLICT).count();
    assert_eq!(accepted, 5);
    assert_eq!(refused, 15);

    let (_, events) = app.get("/api/events").await;
    assert_eq!(events[0]["currentAttendees"], 5);
}

#[tokio::test]
async fn test_donations_hide_anonymous_donors() {
    let app = TestApp::new().await;
    let (_, recipient) = app.post("/api/auth/setup-user", Some("rita"), json!({})).await;
    let recipient_id = recipient["id"].as_str().unwrap().to_string();

    let (status, donation) = app
        .post(
            "/api/donations",
            Some("dave"),
            json!({"recipientId": recipient_id, "amount": 25, "paymentMethod": "card", "message": "Good luck"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", donation);
    assert_eq!(donation["status"], "pending");
    assert_eq!(donation["currency"], "USD");
    assert_eq!(donation["donor"]["username"], "dave");
    assert_eq!(donation["recipient"]["username"], "rita");
    assert!(donation["transactionId"].as_str().unwrap().len() >= 32);

    let (status, anonymous) = app
        .post(
            "/api/donations",
            Some("erin"),
            json!({"recipientId": recipient_id, "amount": 10, "paymentMethod": "card", "isAnonymous": true}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(anonymous.get("donor").is_none());
    assert!(anonymous.get("donorId").is_none());

    let (_, page) = app
        .get(&format!("/api/donations?recipientId={}", recipient_id))
        .await;
    assert_eq!(page["pagination"]["total"], 2);
    assert_eq!(page["items"][0]["isAnonymous"], true);
    assert!(page["items"][0].get("donor").is_none());
    assert_eq!(page["items"][1]["donor"]["username"], "dave");
    assert_ne!(
        page["items"][0]["transactionId"],
        page["items"][1]["transactionId"]
    );
}

#[tokio::test]
async fn test_donation_validation_and_missing_recipient() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post("/api/donations", None, json!({"recipientId": "1", "amount": 5, "paymentMethod": "card"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, err) = app
        .post(
            "/api/donations",
            Some("dave"),
            json!({"recipientId": "1", "amount": 0, "paymentMethod": "card"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["details"], json!(["amount must be at least 0.01"]));

    let (status, err) = app
        .post(
            "/api/donations",
            Some("dave"),
            json!({"recipientId": "98765", "amount": 5, "paymentMethod": "card"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["kind"], "not_found");
}
