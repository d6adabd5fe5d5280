use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        // Places
        .route("/api/places", get(commands::place::get_places))
        .route("/api/places/create", post(commands::place::create_place))
        .route("/api/places/delete/:id", post(commands::place::delete_place))
        // Discounts
        .route("/api/discounts", get(commands::discount::get_discounts))
        .route("/api/discounts/create", post(commands::discount::create_discount))
        .route(
            "/api/discounts/delete/:id",
            post(commands::discount::delete_discount),
        )
        // Branches
        .route("/api/branches", get(commands::branch::get_branches))
        .route("/api/branches/create", post(commands::branch::create_branch))
        .route("/api/branches/delete/:id", post(commands::branch::delete_branch))
}
