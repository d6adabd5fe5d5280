use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/dashboard/analytics",
            get(commands::dashboard::get_admin_analytics),
        )
        .route(
            "/api/dashboard/branch/:id",
            get(commands::dashboard::get_branch_analytics),
        )
        .route(
            "/api/dashboard/category-leads",
            get(commands::dashboard::get_category_leads),
        )
        .route(
            "/api/dashboard/location-leads",
            get(commands::dashboard::get_location_leads),
        )
        .route(
            "/api/dashboard/pincode-leads",
            get(commands::dashboard::get_pincode_leads),
        )
        .route(
            "/api/dashboard/cost-per-lead",
            get(commands::dashboard::get_cost_per_lead),
        )
}
