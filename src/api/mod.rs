// HTTP API - axum router for the marketplace, mounted under /api

pub mod donated_items;
pub mod donations;
pub mod events;
pub mod extract;
pub mod listings;
pub mod upload;
pub mod users;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app_state::AppState;
use crate::error::AppResult;
use crate::infrastructure::middleware::viewer_context_middleware;

use donated_items::*;
use donations::*;
use events::*;
use listings::*;
use upload::*;
use users::*;

pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.store.health_check().await?;
    Ok(Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// Permissive when no origins are configured
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn api_router() -> Router<AppState> {
    Router::new()
        // Listing catalog
        .route("/listings", get(list_listings_handler).post(create_listing_handler))
        .route(
            "/listings/{id}",
            get(get_listing_handler)
                .put(update_listing_handler)
                .delete(delete_listing_handler),
        )
        .route("/listings/{id}/purchase", post(purchase_listing_handler))
        .route(
            "/listings/{id}/reviews",
            get(list_reviews_handler).post(create_review_handler),
        )
        .route("/listings/{id}/like", post(toggle_like_handler))
        .route("/listings/{id}/views", post(record_view_handler))
        // Donation/borrow registry
        .route(
            "/donated-items",
            get(list_donated_items_handler).post(create_donated_item_handler),
        )
        .route("/donated-items/{id}/borrow", post(borrow_donated_item_handler))
        // Event board
        .route("/events", get(list_events_handler).post(create_event_handler))
        .route("/events/{id}/rsvp", post(rsvp_event_handler))
        // Monetary donations
        .route("/donations", get(list_donations_handler).post(create_donation_handler))
        // User directory
        .route("/users", get(list_users_handler).post(create_user_handler))
        .route("/users/me", put(update_profile_handler))
        .route("/auth/setup-user", post(setup_user_handler))
        // Media
        .route(
            "/upload",
            post(upload_images_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_router())
        .route("/health", get(health_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            viewer_context_middleware::<AppState>,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(state.config.request_timeout()))
                .layer(cors_layer(&state.config.server.allowed_origins)),
        )
        .with_state(state)
}
