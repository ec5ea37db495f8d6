//! Image uploads for the editor
//!
//! Validates an image client-side before anything is sent to object
//! storage:
//! - declared content type must be an accepted image type
//! - magic bytes must agree with the declared type
//! - size must be within the configured limit

use crate::config::UploadConfig;
use crate::error::{UploadError, UploadResult};
use uuid::Uuid;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Get file extension for the format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// Detect format from a MIME type
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }

    /// Detect format from magic bytes
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // GIF: GIF87a or GIF89a
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && data.len() >= 12 && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::Webp);
        }

        None
    }
}

/// An image the user picked, not yet uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A validated upload ready for object storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedUpload {
    /// Object storage path, `<prefix>/<uid>/<uuid>.<ext>`
    pub path: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Check an image against the upload rules and pick its storage path
pub fn prepare_upload(
    upload: ImageUpload,
    user_id: &str,
    config: &UploadConfig,
) -> UploadResult<PreparedUpload> {
    let declared = upload.content_type.trim().to_lowercase();
    let allowed = config
        .allowed_types
        .iter()
        .any(|t| t.eq_ignore_ascii_case(&declared));

    let format = ImageFormat::from_mime(&declared)
        .filter(|_| allowed)
        .ok_or_else(|| UploadError::UnsupportedType {
            content_type: upload.content_type.clone(),
        })?;

    if upload.bytes.is_empty() {
        return Err(UploadError::Empty);
    }

    if upload.bytes.len() > config.max_bytes {
        return Err(UploadError::TooLarge {
            size: upload.bytes.len(),
            max_size: config.max_bytes,
        });
    }

    if ImageFormat::from_bytes(&upload.bytes) != Some(format) {
        return Err(UploadError::ContentMismatch {
            content_type: format.mime_type().to_string(),
        });
    }

    let path = format!(
        "{}/{}/{}.{}",
        config.path_prefix.trim_end_matches('/'),
        user_id,
        Uuid::new_v4().simple(),
        format.extension()
    );
    log::debug!("Prepared upload {} as {}", upload.file_name, path);

    Ok(PreparedUpload {
        path,
        format,
        bytes: upload.bytes,
    })
}

#[cfg(test)]
pub(crate) fn png_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.resize(len.max(8), 0);
    bytes
}
