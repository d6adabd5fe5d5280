use crate::db::{new_id, Discount};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

pub async fn get_discounts(State(state): State<AppState>) -> AppResult<Json<Vec<Discount>>> {
    let discounts = sqlx::query_as::<_, Discount>("SELECT * FROM discounts ORDER BY code")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(discounts))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountInput {
    pub code: String,
    pub description: Option<String>,
    #[serde(alias = "type")]
    pub kind: String,
    pub value: i32,
}

pub async fn create_discount(
    State(state): State<AppState>,
    Json(input): Json<DiscountInput>,
) -> AppResult<Json<String>> {
    let code = input.code.trim().to_uppercase();
    if code.len() < 3 {
        return Err(AppError::Validation(
            "Discount code must be at least 3 characters.".into(),
        ));
    }
    if !matches!(input.kind.as_str(), "percentage" | "fixed") {
        return Err(AppError::Validation(
            "Discount type must be 'percentage' or 'fixed'.".into(),
        ));
    }
    if input.value <= 0 || (input.kind == "percentage" && input.value > 100) {
        return Err(AppError::Validation("Invalid discount value.".into()));
    }

    let exists: Option<(String,)> =
        sqlx::query_as("SELECT discount_id FROM discounts WHERE code = $1")
            .bind(&code)
            .fetch_optional(&state.pool)
            .await?;
    if exists.is_some() {
        return Err(AppError::Validation(format!(
            "Discount code '{}' already exists.",
            code
        )));
    }

    let discount_id = new_id("DSC");
    sqlx::query(
        "INSERT INTO discounts (discount_id, code, description, kind, value, status)
         VALUES ($1, $2, $3, $4, $5, 'active')",
    )
    .bind(&discount_id)
    .bind(&code)
    .bind(input.description.unwrap_or_default())
    .bind(&input.kind)
    .bind(input.value)
    .execute(&state.pool)
    .await?;

    Ok(Json(discount_id))
}

pub async fn delete_discount(
    State(state): State<AppState>,
    Path(discount_id): Path<String>,
) -> AppResult<Json<()>> {
    let in_use: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM campaigns WHERE discount_id = $1")
        .bind(&discount_id)
        .fetch_one(&state.pool)
        .await?;
    if in_use.0 > 0 {
        return Err(AppError::Validation(
            "Discount is attached to campaigns and cannot be deleted.".into(),
        ));
    }

    let result = sqlx::query("DELETE FROM discounts WHERE discount_id = $1")
        .bind(&discount_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Discount".into()));
    }
    Ok(Json(()))
}
