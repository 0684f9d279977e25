//! Essay analysis — one prompt, one model call, one schema-checked result.
//!
//! Flow: validate_essay → build_analysis_prompt → model (with response schema)
//!       → parse → conform → check examples against the essay
//!       → warn on ungrounded quotes → return.

use tracing::{info, warn};

use crate::analysis::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};
use crate::analysis::schema::{response_schema, EssayAnalysis};
use crate::analysis::validation::validate_essay;
use crate::errors::AppError;
use crate::llm_client::{call_json, GenerationRequest, GenerativeModel};

/// Validates the essay, then asks the model for a full analysis.
///
/// Out-of-bounds input returns `AppError::Validation` without touching the
/// model. Endpoint failures, unparsable replies and schema violations all
/// surface as `AppError::Model`.
pub async fn analyze_essay(
    essay: &str,
    model: &dyn GenerativeModel,
) -> Result<EssayAnalysis, AppError> {
    let essay = validate_essay(essay)?;

    let request = GenerationRequest::text(ANALYSIS_SYSTEM, build_analysis_prompt(essay))
        .with_schema(response_schema());

    let analysis: EssayAnalysis = call_json(model, &request)
        .await
        .map_err(|e| AppError::Model(e.to_string()))?;

    let analysis = analysis
        .conform()
        .and_then(|a| a.check_examples(essay).map(|_| a))
        .map_err(|e| AppError::Model(format!("model reply broke the analysis schema: {e}")))?;

    let ungrounded = analysis.ungrounded_examples(essay);
    if !ungrounded.is_empty() {
        warn!(
            "{} example(s) not found verbatim in the essay: {}",
            ungrounded.len(),
            ungrounded.join(", ")
        );
    }

    info!(
        "Essay analysed: strengths={}, weaknesses={}",
        analysis
            .criteria()
            .iter()
            .map(|(_, d)| d.strengths.len())
            .sum::<usize>(),
        analysis
            .criteria()
            .iter()
            .map(|(_, d)| d.weaknesses.len())
            .sum::<usize>()
    );

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::example::EXAMPLE_ESSAY;
    use crate::analysis::fixtures::sample_analysis_json;
    use crate::analysis::schema::Criterion;
    use crate::analysis::validation::ValidationError;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::LlmError;

    #[tokio::test]
    async fn test_short_essay_never_reaches_model() {
        let model = ScriptedModel::new().push_text(sample_analysis_json());
        let err = analyze_essay("Too short to analyse.", &model).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::TooShort { .. })
        ));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_long_essay_never_reaches_model() {
        let model = ScriptedModel::new().push_text(sample_analysis_json());
        let essay = "word ".repeat(2_001);
        let err = analyze_essay(&essay, &model).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::TooLong { .. })
        ));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_essay_makes_exactly_one_call() {
        let model = ScriptedModel::new().push_text(sample_analysis_json());
        let analysis = analyze_essay(EXAMPLE_ESSAY, &model).await.unwrap();
        assert_eq!(model.call_count(), 1);

        let order: Vec<Criterion> = analysis.criteria().iter().map(|(c, _)| *c).collect();
        assert_eq!(order, Criterion::ALL.to_vec());
        for (_, detail) in analysis.criteria() {
            assert!(!detail.korean_analysis.is_empty());
            assert!(!detail.strengths.is_empty());
            assert!(detail.strengths.iter().all(|f| !f.example.is_empty()));
        }
    }

    #[tokio::test]
    async fn test_request_carries_schema_and_essay() {
        let model = ScriptedModel::new().push_text(sample_analysis_json());
        analyze_essay(EXAMPLE_ESSAY, &model).await.unwrap();

        let request = model.last_request().unwrap();
        assert_eq!(request.system, ANALYSIS_SYSTEM);
        assert!(request.prompt_text().contains(EXAMPLE_ESSAY));
        assert_eq!(request.response_schema, Some(response_schema()));
    }

    #[tokio::test]
    async fn test_endpoint_error_becomes_model_error() {
        let model = ScriptedModel::new().push_error(LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        });
        let err = analyze_essay(EXAMPLE_ESSAY, &model).await.unwrap_err();
        assert!(matches!(err, AppError::Model(msg) if msg.contains("overloaded")));
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unparsable_reply_becomes_model_error() {
        let model = ScriptedModel::new().push_text("죄송하지만 분석할 수 없습니다.");
        let err = analyze_essay(EXAMPLE_ESSAY, &model).await.unwrap_err();
        assert!(matches!(err, AppError::Model(msg) if msg.contains("JSON parse error")));
    }

    #[tokio::test]
    async fn test_partial_reply_becomes_model_error() {
        let model = ScriptedModel::new()
            .push_text(r#"{"summaryInKorean": "요약", "contentAnalysis": {"koreanAnalysis": "좋음", "strengths": [], "weaknesses": []}}"#);
        let err = analyze_essay(EXAMPLE_ESSAY, &model).await.unwrap_err();
        assert!(matches!(err, AppError::Model(_)));
    }

    #[tokio::test]
    async fn test_schema_violation_becomes_model_error() {
        let mut reply: serde_json::Value = serde_json::from_str(&sample_analysis_json()).unwrap();
        reply["grammarAnalysis"]["weaknesses"] = serde_json::json!([]);
        let model = ScriptedModel::new().push_text(reply.to_string());

        let err = analyze_essay(EXAMPLE_ESSAY, &model).await.unwrap_err();
        assert!(
            matches!(err, AppError::Model(msg) if msg.contains("grammarAnalysis.weaknesses"))
        );
    }

    #[tokio::test]
    async fn test_fenced_reply_is_accepted() {
        let model =
            ScriptedModel::new().push_text(format!("```json\n{}\n```", sample_analysis_json()));
        assert!(analyze_essay(EXAMPLE_ESSAY, &model).await.is_ok());
    }

    #[tokio::test]
    async fn test_hangul_gloss_quoted_from_essay_is_accepted() {
        let essay = "My favorite food is kimchi (김치), which my grandmother makes every winter. \
                     She says the secret is patience and a little extra garlic.";
        let quote = "My favorite food is kimchi (김치), which my grandmother makes every winter.";
        let mut reply: serde_json::Value = serde_json::from_str(&sample_analysis_json()).unwrap();
        reply["contentAnalysis"]["strengths"][0]["example"] = serde_json::json!(quote);
        let model = ScriptedModel::new().push_text(reply.to_string());

        let analysis = analyze_essay(essay, &model).await.unwrap();
        assert_eq!(analysis.content_analysis.strengths[0].example, quote);
    }

    #[tokio::test]
    async fn test_invented_korean_example_becomes_model_error() {
        let mut reply: serde_json::Value = serde_json::from_str(&sample_analysis_json()).unwrap();
        reply["grammarAnalysis"]["strengths"][0]["example"] = serde_json::json!("한국 문화의 영향");
        let model = ScriptedModel::new().push_text(reply.to_string());

        let err = analyze_essay(EXAMPLE_ESSAY, &model).await.unwrap_err();
        assert!(
            matches!(err, AppError::Model(msg) if msg.contains("grammarAnalysis.strengths[0].example"))
        );
    }
}
