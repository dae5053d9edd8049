//! Decoding and validation of images submitted inline as base64 data URLs.
//!
//! Recipe images and avatars both arrive as `data:image/png;base64,...`
//! strings. The payload is decoded, size-checked and sniffed with the
//! `image` crate; the declared MIME type is ignored in favour of the
//! detected one.

use std::io::Cursor;

use base64::Engine;
use image::{ImageFormat, ImageReader};

use crate::error::ImageError;

/// Allowed image formats for recipe photos and avatars.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum decoded size for images (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// A decoded, validated image ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub data: Vec<u8>,
    /// Detected content type (e.g., "image/png").
    pub content_type: String,
}

/// Decodes a `data:image/...;base64,` URL into validated image bytes.
pub fn decode_data_url(input: &str) -> Result<DecodedImage, ImageError> {
    let (header, payload) = input
        .trim()
        .split_once(',')
        .ok_or(ImageError::NotADataUrl)?;

    if !header.starts_with("data:image/") || !header.ends_with(";base64") {
        return Err(ImageError::NotADataUrl);
    }

    let data = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| ImageError::InvalidBase64)?;

    if data.len() > MAX_FILE_SIZE {
        return Err(ImageError::TooLarge {
            size: data.len(),
            max: MAX_FILE_SIZE,
        });
    }

    let content_type = validate_image(&data)?;
    Ok(DecodedImage { data, content_type })
}

/// Validate image data: check format is allowed and that it decodes.
///
/// Returns the content type on success (e.g., "image/jpeg").
pub fn validate_image(data: &[u8]) -> Result<String, ImageError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::Unreadable(format!("Failed to read image: {}", e)))?;

    let format = reader
        .format()
        .ok_or_else(|| ImageError::Unreadable("Could not detect image format".to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ImageError::Unreadable(format!(
            "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        )));
    }

    reader
        .decode()
        .map_err(|e| ImageError::Unreadable(format!("Failed to decode image: {}", e)))?;

    Ok(format.to_mime_type().to_string())
}
