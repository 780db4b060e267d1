use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::bank::{build_question_bank, Question};
use crate::errors::AppError;
use crate::ingest::extract_pdf_text;
use crate::session::critique::Critique;
use crate::session::{Phase, Session};
use crate::state::AppState;

#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub question_count: usize,
    pub phase: Phase,
}

#[derive(Serialize)]
pub struct QuestionResponse {
    pub phase: Phase,
    /// `null` is the "no more questions" sentinel.
    pub question: Option<Question>,
}

#[derive(Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: String,
}

/// POST /api/v1/sessions
///
/// Multipart PDF upload. Non-PDF parts are skipped; unreadable PDFs degrade
/// to empty text and are skipped by the bank builder. Builds the question
/// bank and starts a fresh session.
pub async fn handle_create_session(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CreateSessionResponse>, AppError> {
    let mut resume_texts = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart upload: {e}")))?
    {
        let file_name = field.file_name().unwrap_or_default().to_string();
        if !file_name.to_lowercase().ends_with(".pdf") {
            warn!("Skipping non-PDF upload part '{file_name}'");
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload '{file_name}': {e}")))?;
        resume_texts.push(extract_pdf_text(&bytes));
    }

    if resume_texts.is_empty() {
        return Err(AppError::Validation(
            "Upload at least one PDF resume".to_string(),
        ));
    }

    let bank = build_question_bank(&resume_texts, state.question_generator.as_ref()).await?;

    let mut session = Session::new(Uuid::new_v4());
    session.start(bank);
    let question_count = session.question_count();
    let phase = session.phase();
    let session_id = state.insert_session(session).await;

    info!("Session {session_id} created with {question_count} questions");

    Ok(Json(CreateSessionResponse {
        session_id,
        question_count,
        phase,
    }))
}

/// GET /api/v1/sessions/:id/question
pub async fn handle_get_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuestionResponse>, AppError> {
    let session = state.session(id).await?;
    let session = session.lock().await;
    let question = session.current()?.cloned();
    Ok(Json(QuestionResponse {
        phase: session.phase(),
        question,
    }))
}

/// POST /api/v1/sessions/:id/advance
///
/// Returns the question now under the cursor, or the sentinel once the
/// bank is exhausted.
pub async fn handle_advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuestionResponse>, AppError> {
    let session = state.session(id).await?;
    let mut session = session.lock().await;
    let phase = session.advance()?;
    let question = session.current()?.cloned();
    Ok(Json(QuestionResponse { phase, question }))
}

/// POST /api/v1/sessions/:id/answer
///
/// Critiques the typed answer against the current question. The cursor does
/// not move; on a model failure the session is untouched and the client can
/// retry the same submission.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<Critique>, AppError> {
    let answer = req.answer.trim();
    if answer.is_empty() {
        return Err(AppError::Validation(
            "Type an answer before submitting".to_string(),
        ));
    }

    let session = state.session(id).await?;
    let mut session = session.lock().await;
    let critique = session
        .submit_answer(answer, state.answer_critic.as_ref())
        .await?;
    Ok(Json(critique))
}

/// GET /api/v1/sessions/:id/transcript
pub async fn handle_export_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = state.session(id).await?;
    let session = session.lock().await;
    Ok(Json(session.export()))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.remove_session(id).await?;
    info!("Session {id} discarded");
    Ok(StatusCode::NO_CONTENT)
}
