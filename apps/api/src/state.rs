use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::bank::QuestionGenerator;
use crate::errors::AppError;
use crate::session::{AnswerCritic, Session};

/// Live sessions keyed by id. Each session sits behind its own mutex so
/// mutations (start, advance, submit) are serialized per session, including
/// across the critique call's await; the outer map lock is held only long
/// enough to clone the handle.
pub type SessionStore = Arc<RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>>;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub question_generator: Arc<dyn QuestionGenerator>,
    pub answer_critic: Arc<dyn AnswerCritic>,
    pub sessions: SessionStore,
}

impl AppState {
    /// Looks up a session handle or 404s.
    pub async fn session(&self, id: Uuid) -> Result<Arc<Mutex<Session>>, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No session with id {id}")))
    }

    pub async fn insert_session(&self, session: Session) -> Uuid {
        let id = session.id;
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    pub async fn remove_session(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("No session with id {id}")))
    }
}
