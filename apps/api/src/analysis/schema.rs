//! Essay analysis schema — the typed result the model must produce, and the
//! JSON response schema sent alongside the prompt.
//!
//! Canonical shape: list-valued strengths/weaknesses per criterion, each item a
//! Korean description plus a verbatim English quotation from the essay.
//!
//! Field names are declared once as constants. `analysis::prompts` builds its
//! instructions from the same constants, so renaming a field here changes the
//! prompt, the response schema and (via the serde test below) the wire format
//! together.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::llm_client::schema::{array, object, string};

pub const FIELD_SUMMARY_IN_KOREAN: &str = "summaryInKorean";
pub const FIELD_OVERALL_SUMMARY: &str = "overallSummary";
pub const FIELD_KOREAN_ANALYSIS: &str = "koreanAnalysis";
pub const FIELD_STRENGTHS: &str = "strengths";
pub const FIELD_WEAKNESSES: &str = "weaknesses";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_EXAMPLE: &str = "example";

pub const MIN_STRENGTHS: usize = 1;
pub const MAX_STRENGTHS: usize = 6;
pub const MIN_WEAKNESSES: usize = 1;
pub const MAX_WEAKNESSES: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Criteria
// ────────────────────────────────────────────────────────────────────────────

/// The four fixed axes of feedback, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Content,
    Structure,
    Grammar,
    Vocabulary,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::Content,
        Criterion::Structure,
        Criterion::Grammar,
        Criterion::Vocabulary,
    ];

    /// JSON field holding this criterion's `AnalysisDetail`.
    pub fn field_name(self) -> &'static str {
        match self {
            Criterion::Content => "contentAnalysis",
            Criterion::Structure => "structureAnalysis",
            Criterion::Grammar => "grammarAnalysis",
            Criterion::Vocabulary => "vocabularyAnalysis",
        }
    }

    pub fn korean_label(self) -> &'static str {
        match self {
            Criterion::Content => "내용",
            Criterion::Structure => "구조",
            Criterion::Grammar => "문법",
            Criterion::Vocabulary => "어휘",
        }
    }

    pub fn english_label(self) -> &'static str {
        match self {
            Criterion::Content => "Content",
            Criterion::Structure => "Structure",
            Criterion::Grammar => "Grammar",
            Criterion::Vocabulary => "Vocabulary",
        }
    }

    /// What the model should look at for this criterion.
    pub fn focus(self) -> &'static str {
        match self {
            Criterion::Content => "주제의 명확성, 아이디어의 관련성과 구체성, 근거의 충분함",
            Criterion::Structure => "글의 전체 구조, 문단 간의 논리적 연결성, 전환 표현의 효과성",
            Criterion::Grammar => "문법적 정확성, 다양한 문법 구조 사용의 적절성",
            Criterion::Vocabulary => "어휘 선택의 정확성, 다양성, 문맥에 맞는 적절성",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Result types
// ────────────────────────────────────────────────────────────────────────────

/// A strength or weakness: Korean explanation backed by an English quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub description: String,
    pub example: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetail {
    pub korean_analysis: String,
    pub strengths: Vec<Finding>,
    pub weaknesses: Vec<Finding>,
}

/// Root analysis result. Field order matches the order the page renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayAnalysis {
    pub summary_in_korean: String,
    pub content_analysis: AnalysisDetail,
    pub structure_analysis: AnalysisDetail,
    pub grammar_analysis: AnalysisDetail,
    pub vocabulary_analysis: AnalysisDetail,
    pub overall_summary: String,
}

/// Model output that parsed but breaks the schema's semantic rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("{0} is empty")]
    EmptyField(String),

    #[error("{0} is not written in Korean")]
    NotKorean(String),

    #[error("{field} has {actual} items, expected at least {min}")]
    TooFewItems {
        field: String,
        min: usize,
        actual: usize,
    },

    #[error("{0} must quote the English essay, not Korean text")]
    ExampleNotEnglish(String),
}

impl EssayAnalysis {
    pub fn detail(&self, criterion: Criterion) -> &AnalysisDetail {
        match criterion {
            Criterion::Content => &self.content_analysis,
            Criterion::Structure => &self.structure_analysis,
            Criterion::Grammar => &self.grammar_analysis,
            Criterion::Vocabulary => &self.vocabulary_analysis,
        }
    }

    fn detail_mut(&mut self, criterion: Criterion) -> &mut AnalysisDetail {
        match criterion {
            Criterion::Content => &mut self.content_analysis,
            Criterion::Structure => &mut self.structure_analysis,
            Criterion::Grammar => &mut self.grammar_analysis,
            Criterion::Vocabulary => &mut self.vocabulary_analysis,
        }
    }

    /// Criterion blocks in fixed order: content, structure, grammar, vocabulary.
    pub fn criteria(&self) -> [(Criterion, &AnalysisDetail); 4] {
        Criterion::ALL.map(|c| (c, self.detail(c)))
    }

    /// Normalizes a freshly parsed model reply and enforces the schema rules.
    ///
    /// Lists longer than their maximum are truncated (the leading items are
    /// kept); everything else that breaks a rule rejects the whole analysis.
    pub fn conform(mut self) -> Result<Self, SchemaViolation> {
        trim_in_place(&mut self.summary_in_korean);
        trim_in_place(&mut self.overall_summary);

        for criterion in Criterion::ALL {
            let detail = self.detail_mut(criterion);
            trim_in_place(&mut detail.korean_analysis);
            for finding in detail.strengths.iter_mut().chain(detail.weaknesses.iter_mut()) {
                trim_in_place(&mut finding.description);
                trim_in_place(&mut finding.example);
            }
            truncate_findings(criterion, FIELD_STRENGTHS, &mut detail.strengths, MAX_STRENGTHS);
            truncate_findings(criterion, FIELD_WEAKNESSES, &mut detail.weaknesses, MAX_WEAKNESSES);
        }

        self.check()?;
        Ok(self)
    }

    fn check(&self) -> Result<(), SchemaViolation> {
        require_korean(FIELD_SUMMARY_IN_KOREAN, &self.summary_in_korean)?;

        for (criterion, detail) in self.criteria() {
            let base = criterion.field_name();
            require_korean(&format!("{base}.{FIELD_KOREAN_ANALYSIS}"), &detail.korean_analysis)?;
            check_findings(base, FIELD_STRENGTHS, &detail.strengths, MIN_STRENGTHS)?;
            check_findings(base, FIELD_WEAKNESSES, &detail.weaknesses, MIN_WEAKNESSES)?;
        }

        require_korean(FIELD_OVERALL_SUMMARY, &self.overall_summary)
    }

    /// Every finding with its JSON path, in presentation order.
    fn findings(&self) -> Vec<(String, &Finding)> {
        let mut out = Vec::new();
        for (criterion, detail) in self.criteria() {
            for (list, findings) in [
                (FIELD_STRENGTHS, &detail.strengths),
                (FIELD_WEAKNESSES, &detail.weaknesses),
            ] {
                for (i, finding) in findings.iter().enumerate() {
                    out.push((
                        format!("{}.{list}[{i}].{FIELD_EXAMPLE}", criterion.field_name()),
                        finding,
                    ));
                }
            }
        }
        out
    }

    /// Rejects examples written in Korean that the essay does not contain.
    /// Hangul is allowed when it is quoted from the essay, e.g. a gloss
    /// like "kimchi (김치)".
    pub fn check_examples(&self, essay: &str) -> Result<(), SchemaViolation> {
        let haystack = normalize_for_match(essay);
        for (path, finding) in self.findings() {
            if contains_hangul(&finding.example) && !quote_in_essay(&haystack, &finding.example) {
                return Err(SchemaViolation::ExampleNotEnglish(path));
            }
        }
        Ok(())
    }

    /// Paths of examples that cannot be found in the essay text. The model is
    /// told to quote verbatim; a miss usually means it paraphrased.
    pub fn ungrounded_examples(&self, essay: &str) -> Vec<String> {
        let haystack = normalize_for_match(essay);
        self.findings()
            .into_iter()
            .filter(|(_, finding)| !quote_in_essay(&haystack, &finding.example))
            .map(|(path, _)| path)
            .collect()
    }
}

fn trim_in_place(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_string();
    }
}

fn truncate_findings(criterion: Criterion, list: &str, findings: &mut Vec<Finding>, max: usize) {
    if findings.len() > max {
        warn!(
            "Model returned {} {} for {}; keeping the first {}",
            findings.len(),
            list,
            criterion.field_name(),
            max
        );
        findings.truncate(max);
    }
}

fn check_findings(
    base: &str,
    list: &str,
    findings: &[Finding],
    min: usize,
) -> Result<(), SchemaViolation> {
    if findings.len() < min {
        return Err(SchemaViolation::TooFewItems {
            field: format!("{base}.{list}"),
            min,
            actual: findings.len(),
        });
    }

    for (i, finding) in findings.iter().enumerate() {
        let path = format!("{base}.{list}[{i}]");
        require_korean(&format!("{path}.{FIELD_DESCRIPTION}"), &finding.description)?;

        let example_path = format!("{path}.{FIELD_EXAMPLE}");
        if finding.example.is_empty() {
            return Err(SchemaViolation::EmptyField(example_path));
        }
    }

    Ok(())
}

fn require_korean(path: &str, text: &str) -> Result<(), SchemaViolation> {
    if text.is_empty() {
        return Err(SchemaViolation::EmptyField(path.to_string()));
    }
    if !contains_hangul(text) {
        return Err(SchemaViolation::NotKorean(path.to_string()));
    }
    Ok(())
}

/// True if the text contains any Hangul syllable or jamo.
pub fn contains_hangul(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{AC00}'..='\u{D7A3}'   // syllables
            | '\u{1100}'..='\u{11FF}' // jamo
            | '\u{3130}'..='\u{318F}' // compatibility jamo
        )
    })
}

/// Lowercase, straighten quotes, collapse whitespace.
fn normalize_for_match(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            other => other,
        })
        .collect::<String>()
        .to_lowercase();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Checks every fragment of the quote (split on ellipses) against the essay.
fn quote_in_essay(normalized_essay: &str, quote: &str) -> bool {
    let quote = normalize_for_match(quote);
    let quote = quote.trim_matches(|c: char| c == '"' || c == '\'');

    let mut fragments = quote
        .split('…')
        .flat_map(|part| part.split("..."))
        .map(|f| f.trim().trim_matches(|c: char| c == '"' || c == '\''))
        .filter(|f| !f.is_empty())
        .peekable();

    if fragments.peek().is_none() {
        return false;
    }

    fragments.all(|f| normalized_essay.contains(f))
}

// ────────────────────────────────────────────────────────────────────────────
// Response schema
// ────────────────────────────────────────────────────────────────────────────

fn finding_schema(polarity: &str) -> Value {
    object(vec![
        (
            FIELD_DESCRIPTION,
            string(&format!("{polarity}에 대한 구체적인 한국어 설명")),
        ),
        (
            FIELD_EXAMPLE,
            string("설명을 뒷받침하는, 학생 에세이 원문에서 글자 그대로 복사한 영어 문장"),
        ),
    ])
}

fn detail_schema(criterion: Criterion) -> Value {
    let label = criterion.korean_label();
    object(vec![
        (
            FIELD_KOREAN_ANALYSIS,
            string(&format!("{label} 측면에 대한 한국어 총평")),
        ),
        (
            FIELD_STRENGTHS,
            array(
                finding_schema("강점"),
                MIN_STRENGTHS,
                MAX_STRENGTHS,
                &format!("{label} 측면의 강점 목록"),
            ),
        ),
        (
            FIELD_WEAKNESSES,
            array(
                finding_schema("약점"),
                MIN_WEAKNESSES,
                MAX_WEAKNESSES,
                &format!("{label} 측면의 약점 목록"),
            ),
        ),
    ])
}

/// Gemini response schema for `EssayAnalysis`.
pub fn response_schema() -> Value {
    let mut fields = vec![(
        FIELD_SUMMARY_IN_KOREAN,
        string("에세이 내용을 한국어로 간단히 요약한 글"),
    )];
    for criterion in Criterion::ALL {
        fields.push((criterion.field_name(), detail_schema(criterion)));
    }
    fields.push((
        FIELD_OVERALL_SUMMARY,
        string("네 가지 분석을 종합한 한국어 최종 평가와 지도 제언"),
    ));
    object(fields)
}
