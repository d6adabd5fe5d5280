use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Public endpoints hit by the QR-code capture form.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/capture/context", get(commands::capture::get_capture_context))
        .route("/api/capture/lead", post(commands::capture::submit_lead))
        .route(
            "/api/customers/by-phone",
            get(commands::capture::get_customer_by_phone),
        )
}
