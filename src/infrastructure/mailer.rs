// Mailer - outbound transactional email through an HTTP relay

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::config::MailConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> AppResult<()>;
}

pub struct HttpMailer {
    client: reqwest::Client,
    relay_url: String,
    relay_token: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(relay_url: &str, config: &MailConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            relay_url: relay_url.to_string(),
            relay_token: config.relay_token.clone(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        let mut request = self.client.post(&self.relay_url).json(&json!({
            "from": self.from,
            "to": message.to,
            "subject": message.subject,
            "text": message.text,
            "html": message.html,
        }));
        if let Some(token) = &self.relay_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Mail relay returned {}",
                response.status()
            )));
        }

        tracing::info!(to = %message.to, subject = %message.subject, "email sent");
        Ok(())
    }
}

/// Used when no relay is configured: messages are logged and dropped
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "no mail relay configured, email not delivered"
        );
        Ok(())
    }
}

pub fn mailer_from_config(config: &MailConfig) -> AppResult<Arc<dyn Mailer>> {
    match &config.relay_url {
        Some(url) if !url.is_empty() => Ok(Arc::new(HttpMailer::new(url, config)?)),
        _ => Ok(Arc::new(LogMailer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(relay_url: Option<&str>) -> MailConfig {
        MailConfig {
            relay_url: relay_url.map(str::to_string),
            relay_token: None,
            from: "noreply@campus.test".to_string(),
            timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        let mailer = mailer_from_config(&config(None)).unwrap();
        let message = EmailMessage {
            to: "a@b.c".to_string(),
            subject: "hi".to_string(),
            text: "hi".to_string(),
            html: "<p>hi</p>".to_string(),
        };
        mailer.send(&message).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_an_upstream_error() {
        let mailer = mailer_from_config(&config(Some("http://127.0.0.1:9/send"))).unwrap();
        let message = EmailMessage {
            to: "a@b.c".to_string(),
            subject: "hi".to_string(),
            text: "hi".to_string(),
            html: "<p>hi</p>".to_string(),
        };
        let err = mailer.send(&message).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
