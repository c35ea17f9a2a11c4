/*!
 * Media Uploads
 * Hands image files to the external image host and returns the public URL
 */
use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::UploadConfig;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("request to image host failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image host rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// A validated file ready to be sent.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: &'static str,
}

/// Where an uploaded file ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, file: UploadFile) -> Result<UploadedMedia, MediaError>;
}

/// Name of the asset on the host: the client file name without its extension.
pub fn public_id_from_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => base.to_string(),
    }
}

/// Hex SHA-256 over `k=v` pairs sorted by key and joined with `&`, followed
/// by the API secret.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct CloudinaryResponse {
    secure_url: String,
    public_id: String,
}

/// Signed uploads to the Cloudinary image API.
pub struct CloudinaryUploader {
    client: reqwest::Client,
    config: UploadConfig,
}

impl CloudinaryUploader {
    pub fn new(config: UploadConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        )
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, file: UploadFile) -> Result<UploadedMedia, MediaError> {
        let public_id = public_id_from_file_name(&file.file_name);
        let params = vec![
            ("folder", self.config.folder.clone()),
            ("overwrite", "true".to_string()),
            ("public_id", public_id),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];
        let signature = sign_params(&params, &self.config.api_secret);

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(file.content_type)?;
        let mut form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value);
        }
        let form = form.part("file", part);

        let res = self.client.post(self.endpoint()).multipart(form).send().await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: CloudinaryResponse = res.json().await?;
        tracing::info!(public_id = %uploaded.public_id, "Image uploaded");
        Ok(UploadedMedia {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }
}
