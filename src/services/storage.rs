//! Image uploads to S3. The rest of the system only ever sees the returned
//! public URL string.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const KEY_PREFIX: &str = "renthouse-images";

pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

pub fn extension_allowed(extension: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&extension)
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

pub async fn upload_image(state: &AppState, filename: &str, bytes: Vec<u8>) -> AppResult<String> {
    let extension = file_extension(filename)
        .filter(|ext| extension_allowed(ext))
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "unsupported image type; allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

    if bytes.is_empty() {
        return Err(AppError::BadRequest("empty upload".to_string()));
    }
    if bytes.len() > state.config.upload_max_bytes {
        return Err(AppError::BadRequest(format!(
            "image exceeds the {} byte limit",
            state.config.upload_max_bytes
        )));
    }

    let client = state.s3_client.as_ref().ok_or_else(|| {
        AppError::Dependency("object storage is not configured. Set S3_BUCKET.".to_string())
    })?;
    let bucket = state.config.s3_bucket.as_deref().ok_or_else(|| {
        AppError::Dependency("object storage is not configured. Set S3_BUCKET.".to_string())
    })?;
    let base = state.config.public_storage_base().ok_or_else(|| {
        AppError::Dependency("object storage is not configured. Set S3_BUCKET.".to_string())
    })?;

    let key = format!("{KEY_PREFIX}/{}.{extension}", Uuid::new_v4());
    client
        .put_object()
        .bucket(bucket)
        .key(&key)
        .content_type(content_type_for(&extension))
        .body(aws_sdk_s3::primitives::ByteStream::from(bytes))
        .send()
        .await
        .map_err(|err| {
            tracing::error!(error = %err, key = %key, "S3 upload failed");
            AppError::Dependency("image upload failed".to_string())
        })?;

    Ok(format!("{base}/{key}"))
}

#[cfg(test)]
mod tests {
    use super::{content_type_for, extension_allowed, file_extension};

    #[test]
    fn extracts_and_lowercases_extension() {
        assert_eq!(file_extension("photo.JPG"), Some("jpg".to_string()));
        assert_eq!(file_extension("a.b.webp"), Some("webp".to_string()));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn filters_unsupported_types() {
        assert!(extension_allowed("png"));
        assert!(extension_allowed("jpeg"));
        assert!(!extension_allowed("svg"));
        assert!(!extension_allowed("exe"));
    }

    #[test]
    fn maps_content_types() {
        assert_eq!(content_type_for("jpg"), "image/jpeg");
        assert_eq!(content_type_for("webp"), "image/webp");
    }
}
