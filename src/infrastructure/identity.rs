// Identity Provider - verifies session tokens and serves profile attributes
// Sessions are HS256 JWTs whose `sub` claim is the external user id

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::IdentityConfig;
use crate::error::{AppError, AppResult};

/// A verified caller, identified by the provider's subject id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub external_id: String,
}

impl Identity {
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
        }
    }
}

/// Profile fields the provider knows about a user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileAttributes {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a bearer token; any failure is `Unauthorized`
    async fn verify(&self, token: &str) -> AppResult<Identity>;

    /// `None` when the provider has no such user
    async fn profile(&self, external_id: &str) -> AppResult<Option<ProfileAttributes>>;
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
}

#[derive(Debug, Deserialize)]
struct ProviderEmail {
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
    #[serde(default)]
    email_addresses: Vec<ProviderEmail>,
}

impl From<ProviderUser> for ProfileAttributes {
    fn from(user: ProviderUser) -> Self {
        ProfileAttributes {
            email: user.email_addresses.into_iter().next().map(|e| e.email_address),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            image_url: user.image_url,
        }
    }
}

/// Identity provider backed by a shared session secret and the provider's REST API
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        let decoding_key = if config.session_secret.is_empty() {
            None
        } else {
            Some(DecodingKey::from_secret(config.session_secret.as_bytes()))
        };

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            decoding_key,
            validation,
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify(&self, token: &str) -> AppResult<Identity> {
        let key = self
            .decoding_key
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("Session verification is not configured".to_string()))?;

        let data = decode::<SessionClaims>(token, key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid session: {}", e)))?;

        if data.claims.sub.is_empty() {
            return Err(AppError::Unauthorized("Session has no subject".to_string()));
        }
        Ok(Identity::new(data.claims.sub))
    }

    async fn profile(&self, external_id: &str) -> AppResult<Option<ProfileAttributes>> {
        let url = format!("{}/users/{}", self.api_url, external_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let user: ProviderUser = response.json().await?;
                Ok(Some(user.into()))
            }
            status => Err(AppError::Upstream(format!(
                "Identity provider returned {} for user {}",
                status, external_id
            ))),
        }
    }
}
