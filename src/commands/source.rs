use crate::db::{new_id, CampaignSource};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::utils::{capture_url, qr_image_url};

fn site_url() -> String {
    std::env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

#[derive(Serialize)]
pub struct CampaignSourceView {
    #[serde(flatten)]
    pub source: CampaignSource,
    pub capture_url: String,
    pub qr_image_url: String,
}

pub async fn get_campaign_sources(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> AppResult<Json<Vec<CampaignSourceView>>> {
    let sources = sqlx::query_as::<_, CampaignSource>(
        "SELECT cs.*, p.place_name, p.category
         FROM campaign_sources cs
         JOIN places p ON p.place_id = cs.place_id
         WHERE cs.campaign_id = $1
         ORDER BY cs.created_at",
    )
    .bind(&campaign_id)
    .fetch_all(&state.pool)
    .await?;

    let site = site_url();
    let views = sources
        .into_iter()
        .map(|source| {
            let url = capture_url(&site, &source.campaign_id, &source.source_id);
            CampaignSourceView {
                qr_image_url: qr_image_url(&url),
                capture_url: url,
                source,
            }
        })
        .collect();

    Ok(Json(views))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSourceInput {
    pub place_id: String,
}

pub async fn add_source_to_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Json(input): Json<AddSourceInput>,
) -> AppResult<Json<String>> {
    let campaign: Option<(String,)> =
        sqlx::query_as("SELECT campaign_id FROM campaigns WHERE campaign_id = $1")
            .bind(&campaign_id)
            .fetch_optional(&state.pool)
            .await?;
    if campaign.is_none() {
        return Err(AppError::NotFound("Campaign".into()));
    }

    let place: Option<(String,)> =
        sqlx::query_as("SELECT place_id FROM places WHERE place_id = $1")
            .bind(&input.place_id)
            .fetch_optional(&state.pool)
            .await?;
    if place.is_none() {
        return Err(AppError::NotFound("Place".into()));
    }

    let existing: Option<(String,)> = sqlx::query_as(
        "SELECT source_id FROM campaign_sources WHERE campaign_id = $1 AND place_id = $2",
    )
    .bind(&campaign_id)
    .bind(&input.place_id)
    .fetch_optional(&state.pool)
    .await?;
    if existing.is_some() {
        return Err(AppError::Validation(
            "This place is already a source for the campaign.".into(),
        ));
    }

    let source_id = new_id("SRC");
    sqlx::query(
        "INSERT INTO campaign_sources (source_id, campaign_id, place_id) VALUES ($1, $2, $3)",
    )
    .bind(&source_id)
    .bind(&campaign_id)
    .bind(&input.place_id)
    .execute(&state.pool)
    .await?;

    tracing::info!(
        "Linked place {} to campaign {} as {}",
        input.place_id,
        campaign_id,
        source_id
    );
    Ok(Json(source_id))
}

pub async fn delete_source(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
) -> AppResult<Json<()>> {
    let result = sqlx::query("DELETE FROM campaign_sources WHERE source_id = $1")
        .bind(&source_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Campaign source".into()));
    }
    Ok(Json(()))
}
