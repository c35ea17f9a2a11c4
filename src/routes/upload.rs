/**
 * Upload Routes
 * Admin image uploads forwarded to the image host
 */
use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::auth::gate::AdminSession;
use crate::error::{AppError, AppResult};
use crate::media::{UploadFile, UploadedMedia};
use crate::state::AppState;

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024; // 5MB
/// Body cap for the upload route: one file plus multipart framing.
pub const MAX_REQUEST_SIZE: usize = MAX_FILE_SIZE + 64 * 1024;

/// Detect the image type from its leading bytes.
fn detect_image_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }
    match bytes {
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        // GIF: 47 49 46 38
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        // WebP: 52 49 46 46 ... 57 45 42 50
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Check an uploaded file and attach its detected content type.
fn inspect(bytes: Vec<u8>, file_name: Option<String>) -> AppResult<UploadFile> {
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Empty file".to_string()));
    }
    if bytes.len() > MAX_FILE_SIZE {
        return Err(AppError::BadRequest(
            "File too large. Maximum size is 5MB.".to_string(),
        ));
    }
    let content_type = detect_image_type(&bytes).ok_or_else(|| {
        AppError::BadRequest("File content does not match an allowed image type.".to_string())
    })?;

    let file_name = file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("upload.{}", extension_for(content_type)));

    Ok(UploadFile {
        bytes,
        file_name,
        content_type,
    })
}

/// POST /api/uploads
pub async fn upload_image(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadedMedia>> {
    let uploader = state
        .media
        .clone()
        .ok_or(AppError::Unconfigured("Image upload"))?;

    let mut file = None;
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            tracing::warn!("Multipart error: {}", e);
            AppError::BadRequest("Invalid multipart data".to_string())
        })?;
        let Some(field) = field else { break };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read upload bytes: {}", e);
            AppError::BadRequest("Failed to read file data".to_string())
        })?;
        file = Some(inspect(bytes.to_vec(), file_name)?);
        break;
    }

    let file = file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let size = file.bytes.len();
    let uploaded = uploader.upload(file).await?;

    tracing::info!(
        admin = %admin.email,
        public_id = %uploaded.public_id,
        size,
        "Image uploaded"
    );
    Ok(Json(uploaded))
}
