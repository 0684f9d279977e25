use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ocr::extractor::extract_text;
use crate::ocr::image::ImageError;
use crate::state::AppState;

/// Request body cap for the OCR route. A 5 MiB image grows to about
/// 6.7 MiB once base64-encoded.
pub const OCR_BODY_LIMIT: usize = 8 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrInput {
    pub photo_data_uri: String,
}

/// Response envelope for OCR: `{ "text": string | null, "error": string | null }`.
#[derive(Debug, Serialize)]
pub struct OcrOutcome {
    pub text: Option<String>,
    pub error: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl OcrOutcome {
    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Result<String, AppError>> for OcrOutcome {
    fn from(result: Result<String, AppError>) -> Self {
        match result {
            Ok(text) => Self {
                text: Some(text),
                error: None,
                status: StatusCode::OK,
            },
            Err(e) => {
                let (status, message) = e.into_parts();
                Self {
                    text: None,
                    error: Some(message),
                    status,
                }
            }
        }
    }
}

impl IntoResponse for OcrOutcome {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// POST /api/v1/ocr
pub async fn handle_ocr(
    State(state): State<AppState>,
    payload: Result<Json<OcrInput>, JsonRejection>,
) -> OcrOutcome {
    let span = info_span!("extract_text", request_id = %Uuid::new_v4());
    run_ocr(&state, payload).instrument(span).await.into()
}

async fn run_ocr(
    state: &AppState,
    payload: Result<Json<OcrInput>, JsonRejection>,
) -> Result<String, AppError> {
    let Json(input) = payload.map_err(|rejection| {
        // Bodies over the route limit can only carry an oversize image.
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::Image(ImageError::TooLarge {
                bytes: OCR_BODY_LIMIT,
            })
        } else {
            AppError::from(rejection)
        }
    })?;
    extract_text(&input.photo_data_uri, state.model.as_ref()).await
}
