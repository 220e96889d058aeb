use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub identity: IdentityConfig,
    pub image_host: ImageHostConfig,
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    /// Origins allowed by CORS; empty means permissive (development only)
    pub allowed_origins: Vec<String>,
    /// Node id embedded in generated document ids
    pub node_id: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub session_secret: String,
    pub issuer: Option<String>,
    pub api_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageHostConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// HTTP relay endpoint; when unset mail is only logged
    pub relay_url: Option<String>,
    pub relay_token: Option<String>,
    pub from: String,
    pub timeout_secs: u64,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let session_secret = env::var("SESSION_SECRET").unwrap_or_default();
        if session_secret.is_empty() {
            tracing::warn!("SESSION_SECRET is not set; every bearer token will be rejected");
        }

        Ok(Self {
            database: DatabaseConfig {
                url: var_or("DATABASE_URL", "sqlite:campus_market.db"),
                max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 5),
                acquire_timeout_secs: parsed_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 5),
            },
            server: ServerConfig {
                host: var_or("SERVER_HOST", "0.0.0.0"),
                port: parsed_or("SERVER_PORT", 3000),
                request_timeout_secs: parsed_or("REQUEST_TIMEOUT_SECS", 30),
                allowed_origins: env::var("ALLOWED_ORIGINS")
                    .map(|v| {
                        v.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
                node_id: parsed_or("NODE_ID", 0),
            },
            cache: CacheConfig {
                capacity: parsed_or("CACHE_CAPACITY", 1000),
            },
            identity: IdentityConfig {
                session_secret,
                issuer: env::var("SESSION_ISSUER").ok(),
                api_url: var_or("IDENTITY_API_URL", "https://api.clerk.com/v1"),
                api_key: env::var("IDENTITY_API_KEY").unwrap_or_default(),
                timeout_secs: parsed_or("IDENTITY_TIMEOUT_SECS", 5),
            },
            image_host: ImageHostConfig {
                cloud_name: env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
                api_key: env::var("CLOUDINARY_API_KEY").unwrap_or_default(),
                api_secret: env::var("CLOUDINARY_API_SECRET").unwrap_or_default(),
                folder: var_or("CLOUDINARY_FOLDER", "marketplace"),
                timeout_secs: parsed_or("CLOUDINARY_TIMEOUT_SECS", 20),
            },
            mail: MailConfig {
                relay_url: env::var("MAIL_RELAY_URL").ok(),
                relay_token: env::var("MAIL_RELAY_TOKEN").ok(),
                from: var_or("MAIL_FROM", "\"Marketplace\" <noreply@marketplace.com>"),
                timeout_secs: parsed_or("MAIL_TIMEOUT_SECS", 10),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}
