use crate::db::{new_id, Campaign, CampaignStats};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::utils::parse_date_safe;

const CAMPAIGN_LIST_SQL: &str = r#"
    SELECT c.*, b.branch_name, d.code AS discount_code,
           CAST(COALESCE(s.scans, 0) AS BIGINT) AS scans,
           CAST(COALESCE(s.leads, 0) AS BIGINT) AS leads,
           CAST(COALESCE(s.encashed, 0) AS BIGINT) AS encashed
    FROM campaigns c
    JOIN branches b ON b.branch_id = c.branch_id
    JOIN discounts d ON d.discount_id = c.discount_id
    LEFT JOIN (
        SELECT campaign_id,
               SUM(scans) AS scans, SUM(leads) AS leads, SUM(encashed) AS encashed
        FROM campaign_sources GROUP BY campaign_id
    ) s ON s.campaign_id = c.campaign_id
"#;

pub async fn get_campaigns(State(state): State<AppState>) -> AppResult<Json<Vec<Campaign>>> {
    let campaigns = sqlx::query_as::<_, Campaign>(&format!(
        "{} ORDER BY c.created_at DESC",
        CAMPAIGN_LIST_SQL
    ))
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(campaigns))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> AppResult<Json<Campaign>> {
    let campaign = sqlx::query_as::<_, Campaign>(&format!(
        "{} WHERE c.campaign_id = $1",
        CAMPAIGN_LIST_SQL
    ))
    .bind(&campaign_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Campaign".into()))?;
    Ok(Json(campaign))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInput {
    #[serde(alias = "name")]
    pub campaign_name: String,
    pub city: String,
    pub branch_id: String,
    pub discount_id: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn create_campaign(
    State(state): State<AppState>,
    Json(input): Json<CampaignInput>,
) -> AppResult<Json<String>> {
    if input.campaign_name.trim().len() < 2 {
        return Err(AppError::Validation(
            "Campaign name must be at least 2 characters.".into(),
        ));
    }
    if input.city.trim().is_empty() {
        return Err(AppError::Validation("City is required.".into()));
    }

    let branch: Option<(String,)> =
        sqlx::query_as("SELECT branch_id FROM branches WHERE branch_id = $1")
            .bind(&input.branch_id)
            .fetch_optional(&state.pool)
            .await?;
    if branch.is_none() {
        return Err(AppError::NotFound("Branch".into()));
    }

    let discount: Option<(String,)> =
        sqlx::query_as("SELECT discount_id FROM discounts WHERE discount_id = $1")
            .bind(&input.discount_id)
            .fetch_optional(&state.pool)
            .await?;
    if discount.is_none() {
        return Err(AppError::NotFound("Discount".into()));
    }

    let campaign_id = new_id("CAM");
    sqlx::query(
        "INSERT INTO campaigns (campaign_id, campaign_name, city, branch_id, discount_id, start_date, end_date, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, 'active')",
    )
    .bind(&campaign_id)
    .bind(input.campaign_name.trim())
    .bind(input.city.trim())
    .bind(&input.branch_id)
    .bind(&input.discount_id)
    .bind(input.start_date.as_deref().and_then(parse_date_safe))
    .bind(input.end_date.as_deref().and_then(parse_date_safe))
    .execute(&state.pool)
    .await?;

    tracing::info!("Created campaign {} ({})", campaign_id, input.city);
    Ok(Json(campaign_id))
}

#[derive(Deserialize)]
pub struct CampaignStatusInput {
    pub status: String,
}

pub async fn update_campaign_status(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Json(input): Json<CampaignStatusInput>,
) -> AppResult<Json<()>> {
    if !matches!(input.status.as_str(), "active" | "paused" | "completed") {
        return Err(AppError::Validation(format!(
            "Unknown campaign status '{}'.",
            input.status
        )));
    }

    let result = sqlx::query("UPDATE campaigns SET status = $1 WHERE campaign_id = $2")
        .bind(&input.status)
        .bind(&campaign_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Campaign".into()));
    }
    Ok(Json(()))
}

pub async fn delete_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> AppResult<Json<()>> {
    // Sources and leads cascade with the campaign.
    let result = sqlx::query("DELETE FROM campaigns WHERE campaign_id = $1")
        .bind(&campaign_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Campaign".into()));
    }
    tracing::info!("Deleted campaign {}", campaign_id);
    Ok(Json(()))
}

#[derive(Deserialize)]
pub struct CampaignStatsQuery {
    pub id: String,
}

/// Reduce over the campaign's sources: total scans / leads / encashed.
pub async fn get_campaign_stats(
    State(state): State<AppState>,
    Query(query): Query<CampaignStatsQuery>,
) -> AppResult<Json<CampaignStats>> {
    let stats = sqlx::query_as::<_, CampaignStats>(
        "SELECT CAST(COALESCE(SUM(scans), 0) AS BIGINT) AS scans,
                CAST(COALESCE(SUM(leads), 0) AS BIGINT) AS leads,
                CAST(COALESCE(SUM(encashed), 0) AS BIGINT) AS encashed
         FROM campaign_sources WHERE campaign_id = $1",
    )
    .bind(&query.id)
    .fetch_one(&state.pool)
    .await
    .unwrap_or_default();

    Ok(Json(stats))
}
