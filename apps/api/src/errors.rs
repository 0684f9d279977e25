use std::any::Any;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::analysis::validation::ValidationError;
use crate::ocr::image::ImageError;

pub const UNKNOWN_ERROR_MESSAGE: &str = "알 수 없는 오류가 발생했습니다.";
const ANALYSIS_FAILED_MESSAGE: &str = "에세이 분석에 실패했습니다.";
const OCR_FAILED_MESSAGE: &str = "이미지에서 텍스트를 추출하지 못했습니다.";
const NO_TEXT_FOUND_MESSAGE: &str = "이미지에서 텍스트를 찾을 수 없습니다.";

/// Application-level error type.
/// Every variant is scoped to one request; nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Image rejected: {0}")]
    Image(#[from] ImageError),

    #[error("Model error: {0}")]
    Model(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("No text found in image")]
    NoTextFound,

    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    /// Splits the error into an HTTP status and a localized, user-facing message.
    /// Server-side failures are logged here so handlers never have to.
    pub fn into_parts(self) -> (StatusCode, String) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!("Rejected input: {e:?}");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Image(e) => {
                tracing::warn!("Rejected image: {e:?}");
                let status = match &e {
                    ImageError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, e.to_string())
            }
            AppError::Model(msg) => {
                tracing::error!("Model error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{ANALYSIS_FAILED_MESSAGE} {msg}"),
                )
            }
            AppError::Ocr(msg) => {
                tracing::error!("OCR error: {msg}");
                (StatusCode::BAD_GATEWAY, format!("{OCR_FAILED_MESSAGE} {msg}"))
            }
            AppError::NoTextFound => (
                StatusCode::UNPROCESSABLE_ENTITY,
                NO_TEXT_FOUND_MESSAGE.to_string(),
            ),
            AppError::Unknown(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    UNKNOWN_ERROR_MESSAGE.to_string(),
                )
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(ValidationError::MalformedRequest(rejection.body_text()))
    }
}

/// Response envelope for the analysis and summary entry points:
/// `{ "result": T | null, "error": string | null }`.
/// Exactly one of the two is set.
#[derive(Debug, Serialize)]
pub struct Outcome<T> {
    pub result: Option<T>,
    pub error: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> Outcome<T> {
    pub fn success(result: T) -> Self {
        Self {
            result: Some(result),
            error: None,
            status: StatusCode::OK,
        }
    }

    pub fn failure(error: AppError) -> Self {
        let (status, message) = error.into_parts();
        Self {
            result: None,
            error: Some(message),
            status,
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T> From<Result<T, AppError>> for Outcome<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(value) => Outcome::success(value),
            Err(e) => Outcome::failure(e),
        }
    }
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// Turns a handler panic into the generic envelope instead of a dropped connection.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    Outcome::<()>::failure(AppError::Unknown(anyhow::anyhow!(
        "handler panicked: {detail}"
    )))
    .into_response()
}
