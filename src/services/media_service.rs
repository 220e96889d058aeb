// Media Ingestion - validates uploaded images and forwards them to the image host
// A batch is all or nothing: one bad file rejects it before the host is contacted

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::future::join_all;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::infrastructure::{ImageHost, UploadOptions, UploadedImage};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// One file taken from the multipart `images` field
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

/// Every problem in the batch, in file order
pub fn check_batch(files: &[ImageFile]) -> AppResult<()> {
    if files.is_empty() {
        return Err(AppError::validation("No images provided"));
    }

    let mut details = Vec::new();
    for file in files {
        if !file.content_type.starts_with("image/") {
            details.push(format!("{} is not an image", file.file_name));
        }
        if file.bytes.len() > MAX_IMAGE_BYTES {
            details.push(format!("{} exceeds the 5 MB size limit", file.file_name));
        }
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation {
            message: "Invalid image upload".to_string(),
            details,
        })
    }
}

#[derive(Clone)]
pub struct MediaService {
    images: Arc<dyn ImageHost>,
    options: UploadOptions,
}

impl MediaService {
    pub fn new(images: Arc<dyn ImageHost>, folder: &str) -> Self {
        Self {
            images,
            options: UploadOptions::listing_photo(folder),
        }
    }

    pub async fn upload(&self, files: Vec<ImageFile>) -> AppResult<Vec<UploadedImage>> {
        check_batch(&files)?;

        let uploads = files
            .iter()
            .map(|file| self.images.upload(file.data_url(), &self.options));
        let results = join_all(uploads).await;

        let mut uploaded = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(image) => uploaded.push(image),
                Err(e) => {
                    tracing::error!(file = %file.file_name, error = %e, "image upload failed");
                    failures.push(format!("{}: {}", file.file_name, e));
                }
            }
        }

        if failures.is_empty() {
            tracing::info!(count = uploaded.len(), "images uploaded");
            return Ok(uploaded);
        }

        // Successful uploads from a failed batch are orphans
        for image in &uploaded {
            if let Err(e) = self.images.destroy(&image.public_id).await {
                tracing::warn!(public_id = %image.public_id, error = %e, "failed to remove orphaned upload");
            }
        }
        Err(AppError::Upstream(format!(
            "Failed to upload images: {}",
            failures.join("; ")
        )))
    }
}
