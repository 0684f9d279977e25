// Essay analysis prompt templates.
// Field names and list bounds are pulled from `analysis::schema` so the
// instruction text and the response schema cannot drift apart.

use crate::analysis::schema::{
    Criterion, FIELD_DESCRIPTION, FIELD_EXAMPLE, FIELD_KOREAN_ANALYSIS, FIELD_OVERALL_SUMMARY,
    FIELD_STRENGTHS, FIELD_SUMMARY_IN_KOREAN, FIELD_WEAKNESSES, MAX_STRENGTHS, MAX_WEAKNESSES,
    MIN_STRENGTHS, MIN_WEAKNESSES,
};
use crate::llm_client::prompts::{
    JSON_ONLY_SYSTEM, KOREAN_OUTPUT_INSTRUCTION, STRENGTH_BIAS_INSTRUCTION,
    VERBATIM_QUOTE_INSTRUCTION,
};

/// System prompt for essay analysis.
pub const ANALYSIS_SYSTEM: &str = "당신은 한국의 영어 교사를 돕는 영어 작문 평가 전문가입니다. \
    학생의 영어 에세이를 읽고 교사가 수업에 바로 활용할 수 있는 한국어 피드백을 작성합니다. \
    반드시 지정된 JSON 스키마에 맞는 JSON 객체만 출력하세요. \
    JSON 바깥에 어떤 문장도 덧붙이지 말고, 마크다운 코드 블록을 사용하지 마세요.";

/// Analysis prompt template.
/// Replace: {criteria}, {field_rules}, {strength_bias}, {korean_rule},
///          {quote_rule}, then {essay} last.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"다음 학생 영어 에세이를 내용, 구조, 문법, 어휘의 네 가지 기준으로 분석하세요.

평가 기준:
{criteria}

출력 필드 규칙:
{field_rules}

{strength_bias}

{korean_rule}

{quote_rule}

학생 에세이:
"""
{essay}
""""#;

/// System prompt for the Korean essay summary.
pub const KOREAN_SUMMARY_SYSTEM: &str = JSON_ONLY_SYSTEM;

/// Korean summary prompt template. Replace `{summary_field}`, then `{essay}`.
pub const KOREAN_SUMMARY_PROMPT_TEMPLATE: &str = r#"다음 영어 에세이의 내용을 한국어 3~5문장으로 요약하세요.
글쓴이의 핵심 주장과 주요 근거가 드러나야 합니다.
요약은 "{summary_field}" 필드에 담으세요.

에세이:
"""
{essay}
""""#;

/// System prompt for the overall synthesis.
pub const OVERALL_SUMMARY_SYSTEM: &str = "당신은 에세이 분석 결과를 종합하는 영어 작문 평가 전문가입니다. \
    반드시 지정된 JSON 스키마에 맞는 JSON 객체만 출력하세요.";

/// Overall synthesis prompt template. Replace `{overall_field}`, then `{summary}`.
pub const OVERALL_SUMMARY_PROMPT_TEMPLATE: &str = r#"아래는 한 학생 에세이의 내용, 구조, 문법, 어휘 분석 요약입니다.
이를 바탕으로 학생의 전반적인 수준과 가장 중요한 개선 방향을 한국어 4~6문장으로 종합하세요.
종합 평가는 "{overall_field}" 필드에 담으세요.

분석 요약:
"""
{summary}
""""#;

/// One line per criterion: label, JSON field, focus.
fn criteria_block() -> String {
    Criterion::ALL
        .iter()
        .map(|c| {
            format!(
                "- {} ({}, \"{}\"): {}",
                c.korean_label(),
                c.english_label(),
                c.field_name(),
                c.focus()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn field_rules_block() -> String {
    let criterion_fields = Criterion::ALL
        .iter()
        .map(|c| format!("\"{}\"", c.field_name()))
        .collect::<Vec<_>>()
        .join(", ");

    [
        format!("- \"{FIELD_SUMMARY_IN_KOREAN}\": 에세이 전체 내용을 한국어 2~3문장으로 요약합니다."),
        format!(
            "- 기준별 객체 {criterion_fields} 안의 \"{FIELD_KOREAN_ANALYSIS}\": 해당 기준에 대한 한국어 총평입니다."
        ),
        format!(
            "- \"{FIELD_STRENGTHS}\": 강점 목록입니다. 최소 {MIN_STRENGTHS}개, 최대 {MAX_STRENGTHS}개를 작성합니다."
        ),
        format!(
            "- \"{FIELD_WEAKNESSES}\": 약점 목록입니다. 최소 {MIN_WEAKNESSES}개, 최대 {MAX_WEAKNESSES}개를 작성합니다."
        ),
        format!("- 각 항목의 \"{FIELD_DESCRIPTION}\": 강점 또는 약점을 구체적으로 설명하는 한국어 문장입니다."),
        format!(
            "- 각 항목의 \"{FIELD_EXAMPLE}\": 설명을 뒷받침하는 영어 문장으로, 에세이 원문에서 글자 그대로 복사합니다. 이 필드만 영어로 작성합니다."
        ),
        format!(
            "- \"{FIELD_OVERALL_SUMMARY}\": 네 가지 분석을 종합한 한국어 최종 평가와 지도 제언입니다 (4~6문장)."
        ),
    ]
    .join("\n")
}

/// Builds the full analysis instruction for one essay.
/// The essay is substituted last so braces inside student text stay literal.
pub fn build_analysis_prompt(essay: &str) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{criteria}", &criteria_block())
        .replace("{field_rules}", &field_rules_block())
        .replace("{strength_bias}", STRENGTH_BIAS_INSTRUCTION)
        .replace("{korean_rule}", KOREAN_OUTPUT_INSTRUCTION)
        .replace("{quote_rule}", VERBATIM_QUOTE_INSTRUCTION)
        .replace("{essay}", essay)
}

pub fn build_korean_summary_prompt(essay: &str, summary_field: &str) -> String {
    KOREAN_SUMMARY_PROMPT_TEMPLATE
        .replace("{summary_field}", summary_field)
        .replace("{essay}", essay)
}

pub fn build_overall_summary_prompt(summary: &str, overall_field: &str) -> String {
    OVERALL_SUMMARY_PROMPT_TEMPLATE
        .replace("{overall_field}", overall_field)
        .replace("{summary}", summary)
}
