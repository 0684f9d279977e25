//! Deterministic presentation of an analysis: ordered blocks plus Markdown.

use axum::{extract::rejection::JsonRejection, Json};
use serde::Serialize;
use tracing::info;

use crate::analysis::schema::{
    Criterion, EssayAnalysis, Finding, FIELD_OVERALL_SUMMARY, FIELD_SUMMARY_IN_KOREAN,
};
use crate::analysis::validation::ValidationError;
use crate::errors::{AppError, Outcome};

const SUMMARY_TITLE: &str = "요약 (Summary)";
const OVERALL_TITLE: &str = "종합 평가 (Overall)";
const STRENGTHS_HEADING: &str = "강점";
const WEAKNESSES_HEADING: &str = "개선할 점";

// ────────────────────────────────────────────────────────────────────────────
// Report types
// ────────────────────────────────────────────────────────────────────────────

/// One rendered section. Summary and overall blocks carry no findings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBlock {
    /// JSON field the block was rendered from, e.g. `grammarAnalysis`.
    pub key: &'static str,
    pub title: String,
    pub body: String,
    pub strengths: Vec<Finding>,
    pub weaknesses: Vec<Finding>,
}

impl ReportBlock {
    fn text(key: &'static str, title: &str, body: &str) -> Self {
        Self {
            key,
            title: title.to_string(),
            body: body.to_string(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RenderedReport {
    pub blocks: Vec<ReportBlock>,
    pub markdown: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

/// Blocks in fixed order: Korean summary, content, structure, grammar,
/// vocabulary, overall synthesis.
pub fn render_report(analysis: &EssayAnalysis) -> Vec<ReportBlock> {
    let mut blocks = Vec::with_capacity(Criterion::ALL.len() + 2);
    blocks.push(ReportBlock::text(
        FIELD_SUMMARY_IN_KOREAN,
        SUMMARY_TITLE,
        &analysis.summary_in_korean,
    ));

    for (criterion, detail) in analysis.criteria() {
        blocks.push(ReportBlock {
            key: criterion.field_name(),
            title: format!(
                "{} ({})",
                criterion.korean_label(),
                criterion.english_label()
            ),
            body: detail.korean_analysis.clone(),
            strengths: detail.strengths.clone(),
            weaknesses: detail.weaknesses.clone(),
        });
    }

    blocks.push(ReportBlock::text(
        FIELD_OVERALL_SUMMARY,
        OVERALL_TITLE,
        &analysis.overall_summary,
    ));
    blocks
}

pub fn to_markdown(blocks: &[ReportBlock]) -> String {
    let mut out = String::new();

    for block in blocks {
        out.push_str(&format!("## {}\n\n{}\n\n", block.title, block.body));
        push_findings(&mut out, STRENGTHS_HEADING, &block.strengths);
        push_findings(&mut out, WEAKNESSES_HEADING, &block.weaknesses);
    }

    out.truncate(out.trim_end().len());
    out.push('\n');
    out
}

fn push_findings(out: &mut String, heading: &str, findings: &[Finding]) {
    if findings.is_empty() {
        return;
    }
    out.push_str(&format!("### {heading}\n\n"));
    for finding in findings {
        out.push_str(&format!(
            "- {}\n  > \"{}\"\n",
            finding.description, finding.example
        ));
    }
    out.push('\n');
}

// ────────────────────────────────────────────────────────────────────────────
// Handler
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis/render
///
/// Re-checks a previously returned analysis and renders it.
pub async fn handle_render(
    payload: Result<Json<EssayAnalysis>, JsonRejection>,
) -> Outcome<RenderedReport> {
    render(payload).into()
}

fn render(
    payload: Result<Json<EssayAnalysis>, JsonRejection>,
) -> Result<RenderedReport, AppError> {
    let Json(analysis) = payload?;
    let analysis = analysis
        .conform()
        .map_err(|v| ValidationError::MalformedRequest(v.to_string()))?;

    let blocks = render_report(&analysis);
    let markdown = to_markdown(&blocks);
    info!("Rendered report ({} blocks)", blocks.len());

    Ok(RenderedReport { blocks, markdown })
}
