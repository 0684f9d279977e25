//! Axum route handlers for the essay analysis API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::analyzer::analyze_essay;
use crate::analysis::example::EXAMPLE_ESSAY;
use crate::analysis::schema::EssayAnalysis;
use crate::analysis::summaries::{korean_summary, overall_summary, KoreanSummary, OverallSummary};
use crate::analysis::validation::{trimmed_len, MAX_ESSAY_CHARS, MIN_ESSAY_CHARS};
use crate::errors::{AppError, Outcome};
use crate::ocr::image::{ACCEPTED_IMAGE_TYPES, MAX_IMAGE_BYTES};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EssayInput {
    pub essay: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryInput {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct ExampleEssayResponse {
    pub essay: &'static str,
}

/// Input limits shared by the server and the page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsResponse {
    pub min_essay_chars: usize,
    pub max_essay_chars: usize,
    pub max_image_bytes: usize,
    pub accepted_image_types: &'static [&'static str],
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis
///
/// Validates the essay and runs one analysis call. Always answers with the
/// `{ result, error }` envelope; validation failures never reach the model.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<EssayInput>, JsonRejection>,
) -> Outcome<EssayAnalysis> {
    let span = info_span!("analyze_essay", request_id = %Uuid::new_v4());
    run_analysis(&state, payload).instrument(span).await.into()
}

async fn run_analysis(
    state: &AppState,
    payload: Result<Json<EssayInput>, JsonRejection>,
) -> Result<EssayAnalysis, AppError> {
    let Json(input) = payload?;
    info!("Analysis requested ({} chars)", trimmed_len(&input.essay));
    analyze_essay(&input.essay, state.model.as_ref()).await
}

/// POST /api/v1/summary/korean
pub async fn handle_korean_summary(
    State(state): State<AppState>,
    payload: Result<Json<EssayInput>, JsonRejection>,
) -> Outcome<KoreanSummary> {
    let span = info_span!("korean_summary", request_id = %Uuid::new_v4());
    run_korean_summary(&state, payload)
        .instrument(span)
        .await
        .into()
}

async fn run_korean_summary(
    state: &AppState,
    payload: Result<Json<EssayInput>, JsonRejection>,
) -> Result<KoreanSummary, AppError> {
    let Json(input) = payload?;
    info!("Korean summary requested ({} chars)", trimmed_len(&input.essay));
    korean_summary(&input.essay, state.model.as_ref()).await
}

/// POST /api/v1/summary/overall
pub async fn handle_overall_summary(
    State(state): State<AppState>,
    payload: Result<Json<SummaryInput>, JsonRejection>,
) -> Outcome<OverallSummary> {
    let span = info_span!("overall_summary", request_id = %Uuid::new_v4());
    run_overall_summary(&state, payload)
        .instrument(span)
        .await
        .into()
}

async fn run_overall_summary(
    state: &AppState,
    payload: Result<Json<SummaryInput>, JsonRejection>,
) -> Result<OverallSummary, AppError> {
    let Json(input) = payload?;
    info!("Overall summary requested ({} chars)", trimmed_len(&input.summary));
    overall_summary(&input.summary, state.model.as_ref()).await
}

/// GET /api/v1/essays/example
pub async fn handle_example_essay() -> Json<ExampleEssayResponse> {
    Json(ExampleEssayResponse {
        essay: EXAMPLE_ESSAY,
    })
}

/// GET /api/v1/limits
pub async fn handle_limits() -> Json<LimitsResponse> {
    Json(LimitsResponse {
        min_essay_chars: MIN_ESSAY_CHARS,
        max_essay_chars: MAX_ESSAY_CHARS,
        max_image_bytes: MAX_IMAGE_BYTES,
        accepted_image_types: ACCEPTED_IMAGE_TYPES,
    })
}
