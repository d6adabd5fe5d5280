use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/campaigns", get(commands::campaign::get_campaigns))
        .route("/api/campaigns/create", post(commands::campaign::create_campaign))
        .route("/api/campaigns/:id", get(commands::campaign::get_campaign))
        .route(
            "/api/campaigns/:id/status",
            post(commands::campaign::update_campaign_status),
        )
        .route(
            "/api/campaigns/delete/:id",
            post(commands::campaign::delete_campaign),
        )
        // Stats endpoint keeps the original query-parameter contract.
        .route("/api/campaign-stats", get(commands::campaign::get_campaign_stats))
        // Sources
        .route(
            "/api/campaigns/:id/sources",
            get(commands::source::get_campaign_sources),
        )
        .route(
            "/api/campaigns/:id/sources/add",
            post(commands::source::add_source_to_campaign),
        )
        .route("/api/sources/delete/:id", post(commands::source::delete_source))
}
