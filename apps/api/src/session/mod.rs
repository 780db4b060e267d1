//! Session Controller — the question-flow state machine.
//!
//! A session owns the ordered question bank, a 0-based cursor, and an
//! append-only transcript. Phases: `Building` until `start` is called,
//! `Active` while the cursor is inside the bank, `Exhausted` once it has
//! walked off the end. The cursor never auto-advances on answer submission;
//! advancing is an explicit separate action.

pub mod critique;
pub mod handlers;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::bank::Question;
use crate::errors::AppError;
use crate::llm_client::prompts::{CRITIQUE_PROMPT_TEMPLATE, CRITIQUE_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::session::critique::{parse_critique, Critique};

const CRITIQUE_TEMPERATURE: f32 = 0.2;

/// Errors raised by the session controller proper.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("'{0}' called before start")]
    NotInitialized(&'static str),

    #[error("no more questions")]
    NoMoreQuestions,

    #[error("critique call failed: {0}")]
    ModelUnavailable(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotInitialized(op) => AppError::NotInitialized(op),
            SessionError::NoMoreQuestions => AppError::NoMoreQuestions,
            SessionError::ModelUnavailable(msg) => AppError::ModelUnavailable(msg),
        }
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Building,
    Active,
    Exhausted,
}

/// One completed interaction. Never mutated after it is appended.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub question: String,
    pub section: String,
    pub answer: String,
    pub feedback: Vec<String>,
    pub rating: u8,
    pub sample_answer: String,
    pub timestamp: DateTime<Utc>,
}

/// Seam between the controller and the critique model.
#[async_trait]
pub trait AnswerCritic: Send + Sync {
    /// Returns the model's raw critique text for one (question, answer) pair.
    async fn critique(
        &self,
        section: &str,
        question: &str,
        answer: &str,
    ) -> Result<String, LlmError>;
}

/// Production critic backed by the shared LLM client.
pub struct LlmAnswerCritic {
    llm: LlmClient,
    model: String,
}

impl LlmAnswerCritic {
    pub fn new(llm: LlmClient, model: String) -> Self {
        Self { llm, model }
    }
}

#[async_trait]
impl AnswerCritic for LlmAnswerCritic {
    async fn critique(
        &self,
        section: &str,
        question: &str,
        answer: &str,
    ) -> Result<String, LlmError> {
        let prompt = CRITIQUE_PROMPT_TEMPLATE
            .replace("{section}", section)
            .replace("{question}", question)
            .replace("{answer}", answer);

        self.llm
            .call_text(&self.model, &prompt, CRITIQUE_SYSTEM, CRITIQUE_TEMPERATURE)
            .await
    }
}

/// The live practice run. Sole owner of all mutable state; created per
/// interaction and discarded on reset, never persisted.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    questions: Vec<Question>,
    /// Cursor into `questions`; `== questions.len()` means exhausted.
    index: usize,
    transcript: Vec<TranscriptEntry>,
    started: bool,
}

impl Session {
    /// A fresh session in the `Building` phase.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            questions: Vec::new(),
            index: 0,
            transcript: Vec::new(),
            started: false,
        }
    }

    /// Installs the question bank, resets the cursor and clears the
    /// transcript. An empty bank lands directly in `Exhausted`.
    pub fn start(&mut self, questions: Vec<Question>) {
        info!(
            session = %self.id,
            count = questions.len(),
            "Session started"
        );
        self.questions = questions;
        self.index = 0;
        self.transcript.clear();
        self.started = true;
    }

    pub fn phase(&self) -> Phase {
        if !self.started {
            Phase::Building
        } else if self.index < self.questions.len() {
            Phase::Active
        } else {
            Phase::Exhausted
        }
    }

    /// The question under the cursor. `Ok(None)` is the "no more questions"
    /// sentinel for an exhausted session.
    pub fn current(&self) -> Result<Option<&Question>, SessionError> {
        match self.phase() {
            Phase::Building => Err(SessionError::NotInitialized("current")),
            Phase::Active => Ok(self.questions.get(self.index)),
            Phase::Exhausted => Ok(None),
        }
    }

    /// Moves the cursor forward one question. Calling this on an exhausted
    /// session is a no-op, so the terminal state can be re-polled freely.
    pub fn advance(&mut self) -> Result<Phase, SessionError> {
        match self.phase() {
            Phase::Building => Err(SessionError::NotInitialized("advance")),
            Phase::Active => {
                self.index += 1;
                Ok(self.phase())
            }
            Phase::Exhausted => Ok(Phase::Exhausted),
        }
    }

    /// Sends the current question and the given answer out for critique,
    /// appends exactly one transcript entry, and returns the critique.
    /// The cursor does not move.
    ///
    /// On a failed critique call nothing is appended and the cursor is
    /// unchanged, so the caller can retry the same submission.
    pub async fn submit_answer(
        &mut self,
        answer: &str,
        critic: &dyn AnswerCritic,
    ) -> Result<Critique, SessionError> {
        let question = match self.phase() {
            Phase::Building => return Err(SessionError::NotInitialized("submit_answer")),
            Phase::Exhausted => return Err(SessionError::NoMoreQuestions),
            Phase::Active => self.questions[self.index].clone(),
        };

        let raw = critic
            .critique(&question.section, &question.text, answer)
            .await
            .map_err(|e| SessionError::ModelUnavailable(e.to_string()))?;

        let critique = parse_critique(&raw).into_critique();

        self.transcript.push(TranscriptEntry {
            question: question.text,
            section: question.section,
            answer: answer.to_string(),
            feedback: critique.feedback.clone(),
            rating: critique.rating,
            sample_answer: critique.sample_answer.clone(),
            timestamp: Utc::now(),
        });

        info!(
            session = %self.id,
            ordinal = question.ordinal,
            rating = critique.rating,
            "Answer critiqued"
        );

        Ok(critique)
    }

    /// Serializes the transcript. Valid in any phase and never mutates.
    pub fn export(&self) -> serde_json::Value {
        serde_json::json!({ "transcript": self.transcript })
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedCritic {
        response: String,
    }

    impl CannedCritic {
        fn json(rating: i64) -> Self {
            Self {
                response: format!(
                    r#"{{"feedback": ["Good structure"], "rating": {rating}, "sample_answer": "A model answer."}}"#
                ),
            }
        }

        fn raw(text: &str) -> Self {
            Self {
                response: text.to_string(),
            }
        }
    }

    #[async_trait]
    impl AnswerCritic for CannedCritic {
        async fn critique(
            &self,
            _section: &str,
            _question: &str,
            _answer: &str,
        ) -> Result<String, LlmError> {
            Ok(self.response.clone())
        }
    }

    struct DownCritic;

    #[async_trait]
    impl AnswerCritic for DownCritic {
        async fn critique(
            &self,
            _section: &str,
            _question: &str,
            _answer: &str,
        ) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 503,
                message: "overloaded".to_string(),
            })
        }
    }

    fn questions(texts: &[&str]) -> Vec<Question> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Question {
                text: t.to_string(),
                section: "experience".to_string(),
                resume_index: 0,
                ordinal: i,
            })
            .collect()
    }

    fn started(texts: &[&str]) -> Session {
        let mut s = Session::new(Uuid::new_v4());
        s.start(questions(texts));
        s
    }

    #[test]
    fn test_operations_before_start_are_not_initialized() {
        let mut s = Session::new(Uuid::new_v4());
        assert_eq!(s.phase(), Phase::Building);
        assert!(matches!(s.current(), Err(SessionError::NotInitialized(_))));
        assert!(matches!(s.advance(), Err(SessionError::NotInitialized(_))));
    }

    #[test]
    fn test_start_then_current_returns_first_question() {
        let s = started(&["Q1", "Q2"]);
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.current().unwrap().unwrap().text, "Q1");
    }

    #[test]
    fn test_full_advance_reaches_exhausted_sentinel() {
        let mut s = started(&["Q1", "Q2", "Q3"]);
        for _ in 0..3 {
            s.advance().unwrap();
        }
        assert_eq!(s.phase(), Phase::Exhausted);
        // the sentinel, not an error
        assert_eq!(s.current().unwrap(), None);
        // advancing past the end stays a no-op
        assert_eq!(s.advance().unwrap(), Phase::Exhausted);
        assert_eq!(s.current().unwrap(), None);
    }

    #[test]
    fn test_start_with_empty_bank_is_exhausted() {
        let s = started(&[]);
        assert_eq!(s.phase(), Phase::Exhausted);
        assert_eq!(s.current().unwrap(), None);
    }

    #[tokio::test]
    async fn test_submit_appends_one_entry_without_advancing() {
        let mut s = started(&["Q1", "Q2"]);
        let critique = s
            .submit_answer("I shipped it", &CannedCritic::json(4))
            .await
            .unwrap();
        assert_eq!(critique.rating, 4);
        assert_eq!(s.transcript().len(), 1);
        assert_eq!(s.current().unwrap().unwrap().text, "Q1");
    }

    #[tokio::test]
    async fn test_submit_failure_leaves_state_unchanged() {
        let mut s = started(&["Q1"]);
        let err = s.submit_answer("anything", &DownCritic).await.unwrap_err();
        assert!(matches!(err, SessionError::ModelUnavailable(_)));
        assert_eq!(s.transcript().len(), 0);
        assert_eq!(s.current().unwrap().unwrap().text, "Q1");
    }

    #[tokio::test]
    async fn test_submit_when_exhausted_is_no_more_questions() {
        let mut s = started(&["Q1"]);
        s.advance().unwrap();
        let err = s
            .submit_answer("late answer", &CannedCritic::json(3))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NoMoreQuestions));
        assert_eq!(s.transcript().len(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_rating_is_clamped_in_transcript() {
        let mut s = started(&["Q1"]);
        let critique = s
            .submit_answer("answer", &CannedCritic::json(7))
            .await
            .unwrap();
        assert_eq!(critique.rating, 5);
        assert_eq!(s.transcript()[0].rating, 5);
    }

    #[tokio::test]
    async fn test_unparseable_critique_falls_back_instead_of_failing() {
        let mut s = started(&["Q1"]);
        let critique = s
            .submit_answer("answer", &CannedCritic::raw("solid effort, maybe a 4"))
            .await
            .unwrap();
        assert_eq!(critique.rating, critique::NEUTRAL_RATING);
        assert_eq!(critique.feedback, vec!["solid effort, maybe a 4"]);
        assert_eq!(s.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_export_is_pure_and_repeatable() {
        let mut s = started(&["Q1", "Q2"]);
        s.submit_answer("first answer", &CannedCritic::json(4))
            .await
            .unwrap();
        let first = s.export();
        let second = s.export();
        assert_eq!(first, second);
        assert_eq!(s.transcript().len(), 1);

        // export works in every phase
        let empty = Session::new(Uuid::new_v4());
        assert_eq!(empty.export()["transcript"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_two_question_scenario() {
        let q1 = "Tell me about a challenge you overcame.";
        let q2 = "Describe a time you led a team.";
        let mut s = started(&[q1, q2]);

        s.submit_answer(
            "I fixed a production outage under pressure",
            &CannedCritic::json(4),
        )
        .await
        .unwrap();
        assert_eq!(s.transcript().len(), 1);
        assert_eq!(s.transcript()[0].question, q1);

        s.advance().unwrap();
        assert_eq!(s.current().unwrap().unwrap().text, q2);

        let exported = s.export();
        let entries = exported["transcript"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["question"], q1);
    }
}
