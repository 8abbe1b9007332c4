//! Common utilities for the upload handlers

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use std::path::Path;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tubely_core::{AppError, Video};
use tubely_db::VideoRepository;
use tubely_storage::Storage;
use uuid::Uuid;

pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";
pub const THUMBNAIL_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// An uploaded file written to a temporary path, removed when dropped.
#[derive(Debug)]
pub struct SpooledUpload {
    path: TempPath,
    pub size: u64,
}

impl SpooledUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the temporary file now instead of at drop.
    pub fn close(self) {
        let path = self.path.to_path_buf();
        if let Err(e) = self.path.close() {
            tracing::warn!(error = %e, path = %path.display(), "Failed to remove upload temp file");
        }
    }
}

/// An uploaded image held in memory.
#[derive(Debug)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub media_type: String,
}

impl ImageUpload {
    /// File extension for the stored asset, taken from the media subtype.
    pub fn extension(&self) -> &str {
        self.media_type
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .unwrap_or("bin")
    }
}

pub fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput("Invalid video ID".to_string()))
}

/// Normalize a Content-Type header value to a bare `type/subtype` media type.
///
/// Parameters are stripped and the result is lowercased
/// (e.g. "Video/MP4; codecs=avc1" -> "video/mp4").
pub fn parse_media_type(content_type: &str) -> Result<String, AppError> {
    let essence = content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let valid = match essence.split_once('/') {
        Some((kind, subtype)) => {
            !kind.is_empty()
                && !subtype.is_empty()
                && !subtype.contains('/')
                && essence
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "/+-.".contains(c))
        }
        None => false,
    };

    if !valid {
        return Err(AppError::InvalidInput("Invalid Content-Type".to_string()));
    }
    Ok(essence)
}

/// Load a video and check that `user_id` owns it.
pub async fn load_owned_video(
    videos: &dyn VideoRepository,
    video_id: Uuid,
    user_id: Uuid,
) -> Result<Video, AppError> {
    let video = videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;

    if !video.is_owned_by(user_id) {
        tracing::warn!(video_id = %video_id, user_id = %user_id, "Rejected access to video owned by another user");
        return Err(AppError::Unauthorized(
            "Not authorized to modify this video".to_string(),
        ));
    }
    Ok(video)
}

/// Delete an object stored for a request that then failed.
pub async fn discard_stored(storage: &dyn Storage, storage_key: &str) {
    if let Err(e) = storage.delete(storage_key).await {
        tracing::warn!(
            error = %e,
            key = %storage_key,
            "Failed to remove stored object after failed update"
        );
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", e))
    }
}

fn too_large(max_size: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File size exceeds maximum allowed size of {} MB",
        max_size / 1024 / 1024
    ))
}

fn field_media_type(field: &Field<'_>, field_name: &str) -> Result<String, AppError> {
    let content_type = field.content_type().ok_or_else(|| {
        AppError::InvalidInput(format!("Missing Content-Type for {}", field_name))
    })?;
    parse_media_type(content_type)
}

/// Stream the multipart field `field_name` into a temporary `.mp4` file.
///
/// The field must be `video/mp4` and no larger than `max_size` bytes.
/// Other fields are skipped.
pub async fn spool_video_field(
    mut multipart: Multipart,
    field_name: &str,
    max_size: usize,
) -> Result<SpooledUpload, AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(field_name) {
            continue;
        }

        let media_type = field_media_type(&field, field_name)?;
        if media_type != VIDEO_CONTENT_TYPE {
            return Err(AppError::InvalidInput(
                "Cannot upload content of that type".to_string(),
            ));
        }

        let named = tempfile::Builder::new()
            .prefix("tubely-upload-")
            .suffix(".mp4")
            .tempfile()?;
        let (std_file, path) = named.into_parts();
        let mut file = tokio::fs::File::from_std(std_file);

        let mut size: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            size += chunk.len() as u64;
            if size > max_size as u64 {
                return Err(too_large(max_size));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = size,
            "Upload written to temporary file"
        );
        return Ok(SpooledUpload { path, size });
    }

    Err(AppError::InvalidInput(format!(
        "Missing multipart field '{}'",
        field_name
    )))
}

/// Read the multipart field `field_name` as a JPEG or PNG image of at most `max_size` bytes.
pub async fn read_image_field(
    mut multipart: Multipart,
    field_name: &str,
    max_size: usize,
) -> Result<ImageUpload, AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(field_name) {
            continue;
        }

        let media_type = field_media_type(&field, field_name)?;
        if !THUMBNAIL_CONTENT_TYPES.contains(&media_type.as_str()) {
            return Err(AppError::InvalidInput(format!(
                "Invalid content type. Allowed types: {}",
                THUMBNAIL_CONTENT_TYPES.join(", ")
            )));
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if data.len() + chunk.len() > max_size {
                return Err(too_large(max_size));
            }
            data.extend_from_slice(&chunk);
        }
        return Ok(ImageUpload { data, media_type });
    }

    Err(AppError::InvalidInput(format!(
        "Missing multipart field '{}'",
        field_name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_media_type_strips_parameters() {
        assert_eq!(parse_media_type("video/mp4").unwrap(), "video/mp4");
        assert_eq!(
            parse_media_type("Video/MP4; codecs=\"avc1.42E01E\"").unwrap(),
            "video/mp4"
        );
        assert_eq!(parse_media_type(" image/png ;q=1").unwrap(), "image/png");
    }

    #[test]
    fn test_parse_media_type_rejects_garbage() {
        for value in ["", "video", "video/", "/mp4", "video/mp4/x", "video mp4"] {
            assert!(
                matches!(parse_media_type(value), Err(AppError::InvalidInput(_))),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_video_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_video_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_video_id("not-a-uuid"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_image_extension() {
        let upload = ImageUpload {
            data: vec![],
            media_type: "image/jpeg".to_string(),
        };
        assert_eq!(upload.extension(), "jpeg");
    }
}
