// Upload handler - /api/upload (multipart, field `images`)

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    Json,
};
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::infrastructure::middleware::Vc;
use crate::services::ImageFile;

/// Room for several full-size images in one request; per-file limits are checked later
pub const MAX_UPLOAD_BODY_BYTES: usize = 26 * 1024 * 1024;

fn multipart_error(e: MultipartError) -> AppError {
    AppError::Validation {
        message: "Invalid multipart upload".to_string(),
        details: vec![e.body_text()],
    }
}

pub async fn upload_images_handler(
    State(state): State<AppState>,
    vc: Vc,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Value>> {
    let identity = vc.require_identity()?;
    let mut multipart = multipart.map_err(|rejection| AppError::Validation {
        message: "Invalid multipart upload".to_string(),
        details: vec![rejection.body_text()],
    })?;

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("images") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        files.push(ImageFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    tracing::debug!(external_id = %identity.external_id, files = files.len(), "upload received");
    let images = state.media.upload(files).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("{} image(s) uploaded successfully", images.len()),
        "images": images,
    })))
}
