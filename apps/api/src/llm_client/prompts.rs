// Shared prompt constants and prompt-building utilities.
// Each module that needs model calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "반드시 지정된 JSON 스키마에 맞는 JSON 객체만 출력하세요. \
    JSON 바깥에 어떤 문장도 덧붙이지 말고, 마크다운 코드 블록을 사용하지 마세요.";

/// Every feedback field the instructor reads must be written in Korean.
pub const KOREAN_OUTPUT_INSTRUCTION: &str = "\
    언어 규칙: 예시 문장(example)을 제외한 모든 설명, 분석, 요약은 반드시 자연스러운 한국어로 작성하세요. \
    영어 문장을 그대로 설명에 섞어 쓰지 마세요.";

/// Quoted examples must be copied from the essay, never paraphrased or corrected.
pub const VERBATIM_QUOTE_INSTRUCTION: &str = "\
    인용 규칙: example 필드에는 학생 에세이 원문에 실제로 있는 영어 문장을 글자 그대로 복사하세요. \
    번역하거나, 고쳐 쓰거나, 새로 지어내지 마세요. 오류가 있는 문장도 원문 그대로 인용하세요.";

/// Pedagogical policy: students stay motivated when they see what already works.
pub const STRENGTH_BIAS_INSTRUCTION: &str = "\
    지도 방침: 학생의 학습 동기를 높이기 위해 약점보다 강점을 더 많이 찾아 주세요. \
    작은 성취라도 구체적으로 칭찬하고, 약점은 꼭 필요한 핵심만 개선 방향과 함께 제시하세요.";
