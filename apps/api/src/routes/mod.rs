pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session API — the four UI actions plus discard
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id/question",
            get(handlers::handle_get_question),
        )
        .route(
            "/api/v1/sessions/:id/advance",
            post(handlers::handle_advance),
        )
        .route(
            "/api/v1/sessions/:id/answer",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/sessions/:id/transcript",
            get(handlers::handle_export_transcript),
        )
        .route(
            "/api/v1/sessions/:id",
            delete(handlers::handle_delete_session),
        )
        .with_state(state)
}
