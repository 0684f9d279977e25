// OCR prompt templates.

/// System prompt for essay transcription.
pub const OCR_SYSTEM: &str = "You are a careful transcriber of student essays. \
    You copy text exactly as written and never summarize, translate or correct it. \
    You MUST respond with valid JSON only.";

/// Transcription instruction sent alongside the image.
/// Replace `{text_field}` before sending.
pub const OCR_PROMPT_TEMPLATE: &str = "Please extract any text you can find in the attached image. \
The image is a student's essay, which might be handwritten or typed. \
Transcribe it as accurately as possible, keeping spelling and grammar mistakes exactly as written. \
Preserve the original line breaks and paragraph formatting. \
If the image contains no readable text, return an empty string. \
Put only the extracted text in the \"{text_field}\" field.";

pub fn build_ocr_prompt(text_field: &str) -> String {
    OCR_PROMPT_TEMPLATE.replace("{text_field}", text_field)
}
