//! Canned model replies shared by analysis, render and router tests.
//! Every quotation is copied from `EXAMPLE_ESSAY`.

use serde_json::json;

use crate::analysis::schema::EssayAnalysis;

pub const EXAMPLE_QUOTE: &str =
    "Korean culture, called K-culture, now has a big impact on many foreign countries.";

pub fn sample_analysis_json() -> String {
    json!({
        "summaryInKorean": "이 에세이는 K-팝, K-드라마, K-뷰티를 예로 들어 한국 문화가 세계에 미치는 영향을 설명하고, 상업화와 같은 문제점에 대한 경계를 당부합니다.",
        "contentAnalysis": {
            "koreanAnalysis": "주제가 분명하고 구체적인 사례를 충실히 제시했습니다.",
            "strengths": [
                {
                    "description": "첫 문장에서 글의 주제를 명확하게 제시했습니다.",
                    "example": EXAMPLE_QUOTE
                },
                {
                    "description": "구체적인 사례를 들어 주장을 뒷받침했습니다.",
                    "example": "With BTS's entry into the Billboard charts, many other Korean singers have come to the attention of the world, thereby expanding Korea's presence."
                }
            ],
            "weaknesses": [
                {
                    "description": "문제점에 대한 논의가 결론에서 짧게만 다루어졌습니다.",
                    "example": "Therefore, it is necessary to recognize the disadvantages that may occur in the process."
                }
            ]
        },
        "structureAnalysis": {
            "koreanAnalysis": "서론, 본론, 결론의 구성이 갖추어져 있습니다.",
            "strengths": [
                {
                    "description": "Also, In another example 같은 연결어로 문단을 이어 갔습니다.",
                    "example": "In another example, Korean cosmetics and skin care products called K-beauty are gaining popularity in the global market, affecting many consumers."
                }
            ],
            "weaknesses": [
                {
                    "description": "결론 문단의 첫 문장이 앞 문단의 요약을 반복합니다.",
                    "example": "This K-culture has a great influence worldwide in various fields."
                }
            ]
        },
        "grammarAnalysis": {
            "koreanAnalysis": "대체로 정확하지만 대소문자와 긴 문장 처리에 주의가 필요합니다.",
            "strengths": [
                {
                    "description": "분사구문을 자연스럽게 사용했습니다.",
                    "example": EXAMPLE_QUOTE
                }
            ],
            "weaknesses": [
                {
                    "description": "쉼표 뒤의 The를 소문자로 써야 합니다.",
                    "example": "With the easy access to Korean dramas through platforms such as Netflix and YouTube, The consumption of Korean dramas has increased worldwide."
                }
            ]
        },
        "vocabularyAnalysis": {
            "koreanAnalysis": "주제에 맞는 어휘를 적절히 사용했습니다.",
            "strengths": [
                {
                    "description": "cultural diversity와 같은 주제 관련 표현을 정확히 사용했습니다.",
                    "example": "It is important to respect cultural diversity and to create a healthy consumption culture."
                }
            ],
            "weaknesses": [
                {
                    "description": "great influence와 같은 표현이 반복됩니다.",
                    "example": "This K-culture has a great influence worldwide in various fields."
                }
            ]
        },
        "overallSummary": "전반적으로 주제가 분명하고 사례가 풍부한 글입니다. 문장 부호와 대소문자를 점검하고 결론의 논의를 조금 더 확장하면 더욱 완성도 높은 글이 될 것입니다."
    })
    .to_string()
}

pub fn sample_analysis() -> EssayAnalysis {
    serde_json::from_str(&sample_analysis_json()).expect("fixture must parse")
}
