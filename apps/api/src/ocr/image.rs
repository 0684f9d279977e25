//! Upload constraints for essay photos, checked before any model call.

use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

/// Largest decoded image accepted (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp"];

/// Image rejected before any model call. `Display` is the localized message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("이미지 데이터 형식이 올바르지 않습니다.")]
    MalformedDataUri,

    #[error("PNG, JPEG, WEBP 형식의 이미지만 지원합니다.")]
    UnsupportedType(String),

    #[error("이미지 데이터를 읽을 수 없습니다.")]
    InvalidBase64,

    #[error("이미지 파일이 비어 있습니다.")]
    Empty,

    #[error("이미지 파일은 5MB를 초과할 수 없습니다.")]
    TooLarge { bytes: usize },
}

/// A `data:<mime>;base64,<payload>` URI that passed the upload constraints.
/// The payload is kept encoded; it is forwarded to the model as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDataUri<'a> {
    pub mime_type: String,
    pub payload: &'a str,
    pub byte_len: usize,
}

impl<'a> ImageDataUri<'a> {
    pub fn parse(raw: &'a str) -> Result<Self, ImageError> {
        let rest = raw
            .trim()
            .strip_prefix("data:")
            .ok_or(ImageError::MalformedDataUri)?;
        let (header, payload) = rest.split_once(',').ok_or(ImageError::MalformedDataUri)?;

        let mut params = header.split(';');
        let mime_type = params
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(ImageError::MalformedDataUri);
        }

        if !ACCEPTED_IMAGE_TYPES.contains(&mime_type.as_str()) {
            return Err(ImageError::UnsupportedType(mime_type));
        }

        // Decoded size is at most 3/4 of the encoded length; skip decoding
        // payloads that cannot possibly fit.
        let upper_bound = payload.len() / 4 * 3;
        if upper_bound > MAX_IMAGE_BYTES + 2 {
            return Err(ImageError::TooLarge { bytes: upper_bound });
        }

        let bytes = STANDARD
            .decode(payload)
            .map_err(|_| ImageError::InvalidBase64)?;

        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge { bytes: bytes.len() });
        }

        Ok(Self {
            mime_type,
            payload,
            byte_len: bytes.len(),
        })
    }
}
