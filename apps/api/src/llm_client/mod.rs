/// LLM Client — the single point of entry for all Gemini API calls in Critique.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All model interactions MUST go through `GenerativeModel`.
///
/// Model: gemini-2.0-flash (hardcoded — text analysis and OCR share the same vision-capable model)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;
pub mod schema;
#[cfg(test)]
pub mod testing;

/// The model used for all generation calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.0-flash";
const MAX_OUTPUT_TOKENS: u32 = 8192;
const RETRY_BASE_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Prompt blocked by the model: {0}")]
    Blocked(String),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Provider-neutral request / response
// ────────────────────────────────────────────────────────────────────────────

/// One piece of user content sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    /// Base64 payload with its MIME type, e.g. an uploaded essay photo.
    InlineData { mime_type: String, data: String },
}

/// Everything a single generation call needs.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system: &'static str,
    pub parts: Vec<Part>,
    /// JSON schema the reply must follow. `None` means free text.
    pub response_schema: Option<Value>,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn text(system: &'static str, prompt: String) -> Self {
        Self {
            system,
            parts: vec![Part::Text(prompt)],
            response_schema: None,
            temperature: 0.4,
        }
    }

    pub fn with_inline_data(mut self, mime_type: &str, data: &str) -> Self {
        self.parts.push(Part::InlineData {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        });
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// All text parts joined with blank lines.
    #[cfg(test)]
    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

impl LlmResponse {
    #[cfg(test)]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            finish_reason: Some("STOP".to_string()),
            usage: Usage::default(),
        }
    }

    /// Returns the reply text, treating whitespace-only output as absent.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// A remote generative model. `GeminiClient` is the production backend;
/// tests swap in a scripted implementation.
///
/// Carried in `AppState` as `Arc<dyn GenerativeModel>`.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse, LlmError>;
}

/// Calls the model and deserializes the reply text as JSON.
/// The request should carry a response schema or the prompt must demand JSON.
pub async fn call_json<T: DeserializeOwned>(
    model: &dyn GenerativeModel,
    request: &GenerationRequest,
) -> Result<T, LlmError> {
    let response = model.generate(request).await?;

    let text = response.text().ok_or(LlmError::EmptyContent)?;

    // Strip markdown code fences if the model wraps JSON in them
    let text = strip_json_fences(text);

    serde_json::from_str(text).map_err(LlmError::Parse)
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum GeminiPart<'a> {
    Text(&'a str),
    InlineData(GeminiBlob<'a>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

impl<'a> GeminiRequest<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        let parts = request
            .parts
            .iter()
            .map(|p| match p {
                Part::Text(t) => GeminiPart::Text(t),
                Part::InlineData { mime_type, data } => GeminiPart::InlineData(GeminiBlob {
                    mime_type,
                    data,
                }),
            })
            .collect();

        let schema = request.response_schema.as_ref();

        Self {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart::Text(request.system)],
            },
            contents: vec![GeminiContent {
                role: Some("user"),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: schema.map(|_| "application/json"),
                response_schema: schema,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GeminiResponse {
    fn into_llm_response(self) -> Result<LlmResponse, LlmError> {
        let usage = self
            .usage_metadata
            .map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(LlmError::Blocked(reason));
        };

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(LlmError::Blocked("SAFETY".to_string()));
        }

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        Ok(LlmResponse {
            text: Some(text).filter(|t| !t.is_empty()),
            finish_reason: candidate.finish_reason,
            usage,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini client
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the Gemini `generateContent` API with optional retry logic.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    max_retries: u32,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.gemini_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            endpoint: generate_endpoint(&config.gemini_api_base),
            max_retries: config.gemini_max_retries,
        })
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    /// Makes a call to the Gemini API. Retries on 429 (rate limit), 5xx and
    /// transport errors with exponential backoff, up to `max_retries` times.
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse, LlmError> {
        let request_body = GeminiRequest::from_request(request);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = retry_delay(attempt);
                warn!(
                    "Gemini call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .header("x-goog-api-key", &self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Gemini API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
            }

            let gemini_response: GeminiResponse = response.json().await?;
            let llm_response = gemini_response.into_llm_response()?;

            debug!(
                "Gemini call succeeded: input_tokens={}, output_tokens={}, finish_reason={:?}",
                llm_response.usage.input_tokens,
                llm_response.usage.output_tokens,
                llm_response.finish_reason
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: self.max_retries,
        }))
    }
}

fn generate_endpoint(api_base: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        api_base.trim_end_matches('/'),
        MODEL
    )
}

/// Exponential backoff: 1s, 2s, 4s, ...
fn retry_delay(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(6);
    Duration::from_millis(RETRY_BASE_MS * (1 << exponent))
}

/// Pulls `error.message` out of a Gemini error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<GeminiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            generate_endpoint("https://generativelanguage.googleapis.com/"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_retry_delay_doubles() {
        assert_eq!(retry_delay(1), Duration::from_millis(1000));
        assert_eq!(retry_delay(2), Duration::from_millis(2000));
        assert_eq!(retry_delay(3), Duration::from_millis(4000));
    }

    #[test]
    fn test_request_wire_shape_with_image_and_schema() {
        let request = GenerationRequest::text("system text", "prompt text".to_string())
            .with_inline_data("image/png", "aGVsbG8=")
            .with_schema(json!({"type": "OBJECT"}));

        let wire = serde_json::to_value(GeminiRequest::from_request(&request)).unwrap();

        assert_eq!(wire["systemInstruction"]["parts"][0]["text"], "system text");
        assert!(wire["systemInstruction"].get("role").is_none());
        assert_eq!(wire["contents"][0]["role"], "user");
        assert_eq!(wire["contents"][0]["parts"][0]["text"], "prompt text");
        assert_eq!(
            wire["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/png"
        );
        assert_eq!(
            wire["contents"][0]["parts"][1]["inlineData"]["data"],
            "aGVsbG8="
        );
        assert_eq!(
            wire["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(wire["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_request_without_schema_omits_json_mime() {
        let request = GenerationRequest::text("s", "p".to_string());
        let wire = serde_json::to_value(GeminiRequest::from_request(&request)).unwrap();
        assert!(wire["generationConfig"].get("responseMimeType").is_none());
        assert!(wire["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_response_joins_text_parts_and_reads_usage() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 30}
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
        let response = parsed.into_llm_response().unwrap();
        assert_eq!(response.text(), Some("{\"a\":1}"));
        assert_eq!(response.usage.input_tokens, 120);
        assert_eq!(response.usage.output_tokens, 30);
    }

    #[test]
    fn test_response_without_candidates_is_blocked() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
        let err = parsed.into_llm_response().unwrap_err();
        assert!(matches!(err, LlmError::Blocked(reason) if reason == "SAFETY"));
    }

    #[test]
    fn test_safety_finish_reason_is_blocked() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "{\"partial\":"}], "role": "model"},
                "finishReason": "SAFETY"
            }]
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
        let err = parsed.into_llm_response().unwrap_err();
        assert!(matches!(err, LlmError::Blocked(reason) if reason == "SAFETY"));
    }

    #[test]
    fn test_api_error_message_extracts_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body.to_string()), "API key not valid");
        assert_eq!(api_error_message("plain".to_string()), "plain");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        value: u32,
    }

    #[tokio::test]
    async fn test_call_json_strips_fences_and_parses() {
        let model = ScriptedModel::new().push_text("```json\n{\"value\": 7}\n```");
        let request = GenerationRequest::text("s", "p".to_string());
        let probe: Probe = call_json(&model, &request).await.unwrap();
        assert_eq!(probe, Probe { value: 7 });
    }

    #[tokio::test]
    async fn test_call_json_rejects_blank_reply() {
        let model = ScriptedModel::new().push_text("   ");
        let request = GenerationRequest::text("s", "p".to_string());
        let err = call_json::<Probe>(&model, &request).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_call_json_reports_schema_mismatch() {
        let model = ScriptedModel::new().push_text("{\"value\": \"seven\"}");
        let request = GenerationRequest::text("s", "p".to_string());
        let err = call_json::<Probe>(&model, &request).await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }
}
