//! Standalone summary flows: a short Korean summary of an essay, and an
//! overall synthesis built from per-criterion analysis summaries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::prompts::{
    build_korean_summary_prompt, build_overall_summary_prompt, KOREAN_SUMMARY_SYSTEM,
    OVERALL_SUMMARY_SYSTEM,
};
use crate::analysis::schema::{contains_hangul, FIELD_OVERALL_SUMMARY};
use crate::analysis::validation::{validate_essay, validate_summary_input};
use crate::errors::AppError;
use crate::llm_client::schema::{object, string};
use crate::llm_client::{call_json, GenerationRequest, GenerativeModel};

const FIELD_SUMMARY: &str = "summary";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KoreanSummary {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    pub overall_summary: String,
}

fn korean_summary_schema() -> Value {
    object(vec![(FIELD_SUMMARY, string("에세이 내용을 3~5문장으로 요약한 한국어 글"))])
}

fn overall_summary_schema() -> Value {
    object(vec![(
        FIELD_OVERALL_SUMMARY,
        string("분석 요약을 4~6문장으로 종합한 한국어 평가"),
    )])
}

/// Rejects blank or non-Korean model text.
fn require_korean_text(field: &str, text: String) -> Result<String, AppError> {
    let text = text.trim().to_string();
    if text.is_empty() || !contains_hangul(&text) {
        return Err(AppError::Model(format!(
            "model reply broke the summary schema: {field} is empty or not Korean"
        )));
    }
    Ok(text)
}

/// Summarizes an essay in 3–5 Korean sentences.
pub async fn korean_summary(
    essay: &str,
    model: &dyn GenerativeModel,
) -> Result<KoreanSummary, AppError> {
    let essay = validate_essay(essay)?;

    let request = GenerationRequest::text(
        KOREAN_SUMMARY_SYSTEM,
        build_korean_summary_prompt(essay, FIELD_SUMMARY),
    )
    .with_schema(korean_summary_schema());

    let reply: KoreanSummary = call_json(model, &request)
        .await
        .map_err(|e| AppError::Model(e.to_string()))?;

    Ok(KoreanSummary {
        summary: require_korean_text(FIELD_SUMMARY, reply.summary)?,
    })
}

/// Synthesizes per-criterion summaries into a 4–6 sentence Korean overview.
pub async fn overall_summary(
    summary: &str,
    model: &dyn GenerativeModel,
) -> Result<OverallSummary, AppError> {
    let summary = validate_summary_input(summary)?;

    let request = GenerationRequest::text(
        OVERALL_SUMMARY_SYSTEM,
        build_overall_summary_prompt(summary, FIELD_OVERALL_SUMMARY),
    )
    .with_schema(overall_summary_schema());

    let reply: OverallSummary = call_json(model, &request)
        .await
        .map_err(|e| AppError::Model(e.to_string()))?;

    Ok(OverallSummary {
        overall_summary: require_korean_text(FIELD_OVERALL_SUMMARY, reply.overall_summary)?,
    })
}
