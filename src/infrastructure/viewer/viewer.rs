use crate::error::{AppError, AppResult};
use crate::infrastructure::identity::Identity;

/// Who is making the current request; anonymous unless a session verified
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub request_id: String,
    pub identity: Option<Identity>,
}

impl ViewerContext {
    pub fn anonymous(request_id: String) -> Self {
        ViewerContext {
            request_id,
            identity: None,
        }
    }

    pub fn authenticated(identity: Identity, request_id: String) -> Self {
        ViewerContext {
            request_id,
            identity: Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn require_identity(&self) -> AppResult<&Identity> {
        self.identity
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_viewer_requires_login() {
        let vc = ViewerContext::anonymous("req-1".to_string());
        assert!(!vc.is_authenticated());
        assert!(matches!(vc.require_identity(), Err(AppError::Unauthorized(_))));

        let vc = ViewerContext::authenticated(Identity::new("user_1"), "req-2".to_string());
        assert_eq!(vc.require_identity().unwrap().external_id, "user_1");
    }
}
