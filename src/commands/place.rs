use crate::db::{new_id, Place};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::utils::parse_date_safe;

pub async fn get_places(State(state): State<AppState>) -> AppResult<Json<Vec<Place>>> {
    let places = sqlx::query_as::<_, Place>("SELECT * FROM places ORDER BY place_name")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(places))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceInput {
    #[serde(alias = "name")]
    pub place_name: String,
    pub category: String,
    pub monthly_cost: Option<i32>,
    pub placement_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn create_place(
    State(state): State<AppState>,
    Json(input): Json<PlaceInput>,
) -> AppResult<Json<String>> {
    if input.place_name.trim().len() < 2 {
        return Err(AppError::Validation(
            "Place name must be at least 2 characters.".into(),
        ));
    }
    if input.category.trim().is_empty() {
        return Err(AppError::Validation("Category is required.".into()));
    }
    if input.monthly_cost.unwrap_or(0) < 0 {
        return Err(AppError::Validation(
            "Monthly cost cannot be negative.".into(),
        ));
    }

    let place_id = new_id("PLC");
    sqlx::query(
        "INSERT INTO places (place_id, place_name, category, monthly_cost, placement_type, start_date, end_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(&place_id)
    .bind(input.place_name.trim())
    .bind(input.category.trim())
    .bind(input.monthly_cost.unwrap_or(0))
    .bind(&input.placement_type)
    .bind(input.start_date.as_deref().and_then(parse_date_safe))
    .bind(input.end_date.as_deref().and_then(parse_date_safe))
    .execute(&state.pool)
    .await?;

    Ok(Json(place_id))
}

pub async fn delete_place(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> AppResult<Json<()>> {
    let linked: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM campaign_sources WHERE place_id = $1")
            .bind(&place_id)
            .fetch_one(&state.pool)
            .await?;
    if linked.0 > 0 {
        return Err(AppError::Validation(
            "Place is linked to campaigns and cannot be deleted.".into(),
        ));
    }

    let result = sqlx::query("DELETE FROM places WHERE place_id = $1")
        .bind(&place_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Place".into()));
    }
    Ok(Json(()))
}
