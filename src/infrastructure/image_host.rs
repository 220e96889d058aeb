// Image Host - forwards encoded images to the CDN and returns canonical URLs

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::config::ImageHostConfig;
use crate::error::{AppError, AppResult};

/// Folder and named transformation applied by the host on ingest
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOptions {
    pub folder: String,
    pub transformation: String,
}

impl UploadOptions {
    /// Bounded to 800x600 with automatic quality
    pub fn listing_photo(folder: &str) -> Self {
        Self {
            folder: folder.to_string(),
            transformation: "c_limit,w_800,h_600,q_auto".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// `data_url` is `data:<mime>;base64,<payload>`
    async fn upload(&self, data_url: String, options: &UploadOptions) -> AppResult<UploadedImage>;

    async fn destroy(&self, public_id: &str) -> AppResult<()>;
}

#[derive(Debug, Deserialize)]
struct CloudinaryUpload {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    error: CloudinaryErrorMessage,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorMessage {
    message: String,
}

/// Signed-upload client for the Cloudinary REST API
pub struct CloudinaryHost {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl CloudinaryHost {
    pub fn new(config: &ImageHostConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("https://api.cloudinary.com/v1_1/{}/image", config.cloud_name),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    async fn post_signed(
        &self,
        action: &str,
        params: Vec<(&'static str, String)>,
        file: Option<String>,
    ) -> AppResult<reqwest::Response> {
        let signature = sign_params(&params, &self.api_secret);

        let mut form = reqwest::multipart::Form::new()
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (name, value) in params {
            form = form.text(name, value);
        }
        if let Some(file) = file {
            form = form.text("file", file);
        }

        let response = self
            .client
            .post(format!("{}/{}", self.base_url, action))
            .multipart(form)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let message = response
            .json::<CloudinaryErrorBody>()
            .await
            .map(|body| body.error.message)
            .unwrap_or_else(|_| "no error message".to_string());
        Err(AppError::Upstream(format!(
            "Image host {} failed with {}: {}",
            action, status, message
        )))
    }
}

/// SHA-256 over the alphabetically sorted `key=value` pairs followed by the secret
pub fn sign_params(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, data_url: String, options: &UploadOptions) -> AppResult<UploadedImage> {
        let params = vec![
            ("folder", options.folder.clone()),
            ("timestamp", Utc::now().timestamp().to_string()),
            ("transformation", options.transformation.clone()),
        ];

        let response = self.post_signed("upload", params, Some(data_url)).await?;
        let uploaded: CloudinaryUpload = response.json().await?;

        Ok(UploadedImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            width: uploaded.width,
            height: uploaded.height,
        })
    }

    async fn destroy(&self, public_id: &str) -> AppResult<()> {
        let params = vec![
            ("public_id", public_id.to_string()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];
        self.post_signed("destroy", params, None).await?;
        Ok(())
    }
}
