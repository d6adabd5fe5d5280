use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/leads", get(commands::lead::get_leads))
        .route("/api/leads/by-phone", get(commands::lead::get_lead_by_phone))
        .route("/api/leads/:id", get(commands::lead::get_lead))
        .route("/api/leads/:id/reject", post(commands::lead::reject_lead))
        .route(
            "/api/leads/:id/feedback-request",
            post(commands::lead::send_feedback_request),
        )
        // Encashment
        .route("/api/leads/:id/request-otp", post(commands::encash::request_otp))
        .route("/api/leads/:id/encash", post(commands::encash::encash_lead))
}
