//! Question Bank Builder — turns extracted resume text into an ordered
//! sequence of interview questions, one generation call per resume section.
//!
//! Ordering is fixed at build time: resumes in upload order, then sections in
//! document order, then questions in the order the model returned them. The
//! session controller presents the bank strictly in this order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::ingest::{split_sections, truncate_chars};
use crate::llm_client::prompts::{QGEN_PROMPT_TEMPLATE, QGEN_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

/// Sections shorter than this carry too little signal to question.
const MIN_SECTION_CHARS: usize = 120;
/// Section bodies are truncated to this many bytes before prompting.
const MAX_SECTION_CHARS: usize = 3000;

const QGEN_TEMPERATURE: f32 = 0.3;

/// One interview question, immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    /// Resume section the question was grounded in.
    pub section: String,
    /// 0-based index of the uploaded resume the question came from.
    pub resume_index: usize,
    /// Position in the presentation order.
    pub ordinal: usize,
}

/// Seam between the bank builder and the model. Production uses
/// `LlmQuestionGenerator`; tests use stubs.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Returns candidate questions for one resume section.
    async fn generate_questions(
        &self,
        section: &str,
        section_text: &str,
        count: usize,
    ) -> Result<Vec<String>, LlmError>;
}

/// Production generator backed by the shared LLM client.
pub struct LlmQuestionGenerator {
    llm: LlmClient,
    model: String,
}

impl LlmQuestionGenerator {
    pub fn new(llm: LlmClient, model: String) -> Self {
        Self { llm, model }
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate_questions(
        &self,
        section: &str,
        section_text: &str,
        count: usize,
    ) -> Result<Vec<String>, LlmError> {
        let prompt = QGEN_PROMPT_TEMPLATE
            .replace("{section}", section)
            .replace("{section_text}", section_text)
            .replace("{count}", &count.to_string());

        let raw = self
            .llm
            .call_text(&self.model, &prompt, QGEN_SYSTEM, QGEN_TEMPERATURE)
            .await?;

        Ok(parse_question_response(&raw))
    }
}

/// Parses a question-generation response: strict JSON first, line-splitting
/// salvage when the model strays from the contract.
pub fn parse_question_response(raw: &str) -> Vec<String> {
    #[derive(Deserialize)]
    struct QuestionsPayload {
        questions: Vec<String>,
    }

    if let Ok(payload) = serde_json::from_str::<QuestionsPayload>(raw) {
        return payload
            .questions
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();
    }

    warn!("Question response was not the expected JSON object; salvaging by line");
    raw.lines()
        .map(strip_question_markers)
        .filter(|line| line.len() > 4 && !line.ends_with(':'))
        .map(str::to_string)
        .collect()
}

/// Strips bullet and enumeration markers from a salvaged line.
fn strip_question_markers(line: &str) -> &str {
    let line = line.trim().trim_start_matches(['-', '•', '*']).trim_start();
    let after_digits = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() < line.len() {
        if let Some(rest) = after_digits.strip_prefix(['.', ')']) {
            return rest.trim();
        }
    }
    line.trim()
}

/// How many questions to request per section.
fn questions_for_section(section: &str) -> usize {
    match section {
        "experience" | "projects" => 5,
        "skills" => 4,
        "education" => 3,
        _ => 2,
    }
}

/// Builds the ordered question bank from extracted resume texts.
///
/// Empty texts are skipped with a warning; if every upload is empty (or no
/// section is long enough to question) the build fails with `EmptyInput`.
/// A failed generation call surfaces as `ModelUnavailable` and is not
/// retried.
pub async fn build_question_bank(
    resume_texts: &[String],
    generator: &dyn QuestionGenerator,
) -> Result<Vec<Question>, AppError> {
    let mut bank = Vec::new();

    let mut any_usable = false;
    for (resume_index, text) in resume_texts.iter().enumerate() {
        if text.trim().is_empty() {
            warn!("Resume {resume_index} produced no extractable text; skipping");
            continue;
        }
        any_usable = true;

        for section in split_sections(text) {
            if section.body.chars().count() < MIN_SECTION_CHARS {
                continue;
            }
            let body = truncate_chars(&section.body, MAX_SECTION_CHARS);
            let count = questions_for_section(&section.name);

            let questions = generator
                .generate_questions(&section.name, body, count)
                .await
                .map_err(|e| {
                    AppError::ModelUnavailable(format!(
                        "question generation failed for section '{}': {e}",
                        section.name
                    ))
                })?;

            for text in questions {
                let ordinal = bank.len();
                bank.push(Question {
                    text,
                    section: section.name.clone(),
                    resume_index,
                    ordinal,
                });
            }
        }
    }

    if !any_usable || bank.is_empty() {
        return Err(AppError::EmptyInput);
    }

    info!("Question bank built: {} questions", bank.len());
    Ok(bank)
}
