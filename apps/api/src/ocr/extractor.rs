use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::schema::{object, string};
use crate::llm_client::{call_json, GenerationRequest, GenerativeModel};
use crate::ocr::image::ImageDataUri;
use crate::ocr::prompts::{build_ocr_prompt, OCR_SYSTEM};

const FIELD_EXTRACTED_TEXT: &str = "extractedText";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrReply {
    pub extracted_text: String,
}

fn ocr_schema() -> Value {
    object(vec![(
        FIELD_EXTRACTED_TEXT,
        string("Text transcribed from the image, with original line breaks"),
    )])
}

/// Transcribes the essay in an uploaded photo.
///
/// The data URI is checked against the upload constraints before the model
/// is called. Leading and trailing blank space is dropped; inner line breaks
/// are returned untouched.
pub async fn extract_text(
    photo_data_uri: &str,
    model: &dyn GenerativeModel,
) -> Result<String, AppError> {
    let image = ImageDataUri::parse(photo_data_uri)?;
    info!("OCR on {} image ({} bytes)", image.mime_type, image.byte_len);

    let request = GenerationRequest::text(OCR_SYSTEM, build_ocr_prompt(FIELD_EXTRACTED_TEXT))
        .with_inline_data(&image.mime_type, image.payload)
        .with_schema(ocr_schema())
        .with_temperature(0.0);

    let reply: OcrReply = call_json(model, &request)
        .await
        .map_err(|e| AppError::Ocr(e.to_string()))?;

    let text = reply.extracted_text.trim();
    if text.is_empty() {
        warn!("OCR returned no text");
        return Err(AppError::NoTextFound);
    }

    Ok(text.to_string())
}
