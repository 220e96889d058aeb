// ViewerContext Middleware - verifies the bearer session, if any, and injects
// the resulting ViewerContext into request extensions

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::infrastructure::{identity::IdentityProvider, viewer::ViewerContext};

/// Application state that can verify session tokens
pub trait HasIdentityProvider {
    fn identity_provider(&self) -> &Arc<dyn IdentityProvider>;
}

/// A missing or unverifiable session yields an anonymous viewer; handlers that
/// need a caller reject it themselves
pub async fn viewer_context_middleware<T>(
    State(app_state): State<T>,
    mut request: Request,
    next: Next,
) -> Response
where
    T: HasIdentityProvider + Clone + Send + Sync + 'static,
{
    let request_id = request_id_from(request.headers());
    let token = bearer_token(request.headers());

    let viewer_context = match token {
        Some(token) => match app_state.identity_provider().verify(&token).await {
            Ok(identity) => ViewerContext::authenticated(identity, request_id),
            Err(e) => {
                tracing::debug!(request_id = %request_id, error = %e, "session rejected");
                ViewerContext::anonymous(request_id)
            }
        },
        None => ViewerContext::anonymous(request_id),
    };

    request.extensions_mut().insert(Arc::new(viewer_context));
    next.run(request).await
}

/// Token from `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn request_id_from(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| format!("req-{}", Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer token123"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("token123"));
    }

    #[test]
    fn test_other_schemes_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_request_id_passthrough() {
        let mut headers = HeaderMap::new();
        assert!(request_id_from(&headers).starts_with("req-"));

        headers.insert("x-request-id", HeaderValue::from_static("abc-123"));
        assert_eq!(request_id_from(&headers), "abc-123");
    }
}
