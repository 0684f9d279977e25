use thiserror::Error;

/// Shortest essay worth analysing, in characters after trimming.
pub const MIN_ESSAY_CHARS: usize = 50;
/// Longest essay accepted, in characters after trimming.
pub const MAX_ESSAY_CHARS: usize = 10_000;
/// Upper bound on the per-criterion summary text fed to the synthesis prompt.
pub const MAX_SUMMARY_INPUT_CHARS: usize = 10_000;

/// Input rejected before any model call. `Display` is the localized message
/// shown next to the form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("50자 이상의 에세이를 입력해주세요.")]
    TooShort { actual: usize, min: usize },

    #[error("에세이는 10,000자를 초과할 수 없습니다.")]
    TooLong { actual: usize, max: usize },

    #[error("종합할 분석 요약을 입력해주세요.")]
    EmptySummary,

    #[error("분석 요약은 10,000자를 초과할 수 없습니다.")]
    SummaryTooLong { actual: usize, max: usize },

    #[error("요청 형식이 올바르지 않습니다.")]
    MalformedRequest(String),
}

/// Character count of the trimmed text, in Unicode scalar values.
pub fn trimmed_len(raw: &str) -> usize {
    raw.trim().chars().count()
}

/// Checks essay length bounds.
///
/// PASS: trimmed length in `[MIN_ESSAY_CHARS, MAX_ESSAY_CHARS]`. The original
/// text is returned untouched — no trimming, no normalization.
/// FAIL: shorter → `TooShort`, longer → `TooLong`.
pub fn validate_essay(raw: &str) -> Result<&str, ValidationError> {
    let actual = trimmed_len(raw);
    if actual < MIN_ESSAY_CHARS {
        return Err(ValidationError::TooShort {
            actual,
            min: MIN_ESSAY_CHARS,
        });
    }
    if actual > MAX_ESSAY_CHARS {
        return Err(ValidationError::TooLong {
            actual,
            max: MAX_ESSAY_CHARS,
        });
    }
    Ok(raw)
}

/// Checks the per-criterion summary text handed to the synthesis flow.
pub fn validate_summary_input(raw: &str) -> Result<&str, ValidationError> {
    let actual = trimmed_len(raw);
    if actual == 0 {
        return Err(ValidationError::EmptySummary);
    }
    if actual > MAX_SUMMARY_INPUT_CHARS {
        return Err(ValidationError::SummaryTooLong {
            actual,
            max: MAX_SUMMARY_INPUT_CHARS,
        });
    }
    Ok(raw)
}
