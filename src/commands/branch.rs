use crate::db::{new_id, Branch};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

/// Branch totals are summed from campaign sources at read time; the original
/// stored stale copies on the branch record instead.
pub async fn get_branches(State(state): State<AppState>) -> AppResult<Json<Vec<Branch>>> {
    let branches = sqlx::query_as::<_, Branch>(
        r#"
        SELECT b.*,
               CAST(COALESCE(s.scans, 0) AS BIGINT) AS total_scans,
               CAST(COALESCE(s.leads, 0) AS BIGINT) AS total_leads,
               CAST(COALESCE(s.encashed, 0) AS BIGINT) AS total_encashed
        FROM branches b
        LEFT JOIN (
            SELECT c.branch_id,
                   SUM(cs.scans) AS scans, SUM(cs.leads) AS leads, SUM(cs.encashed) AS encashed
            FROM campaigns c
            JOIN campaign_sources cs ON cs.campaign_id = c.campaign_id
            GROUP BY c.branch_id
        ) s ON s.branch_id = b.branch_id
        ORDER BY b.branch_name
        "#,
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(branches))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchInput {
    #[serde(alias = "name")]
    pub branch_name: String,
    pub city: Option<String>,
}

pub async fn create_branch(
    State(state): State<AppState>,
    Json(input): Json<BranchInput>,
) -> AppResult<Json<String>> {
    if input.branch_name.trim().len() < 2 {
        return Err(AppError::Validation(
            "Branch name must be at least 2 characters.".into(),
        ));
    }

    let branch_id = new_id("BR");
    sqlx::query("INSERT INTO branches (branch_id, branch_name, city) VALUES ($1, $2, $3)")
        .bind(&branch_id)
        .bind(input.branch_name.trim())
        .bind(input.city.unwrap_or_default().trim())
        .execute(&state.pool)
        .await?;

    Ok(Json(branch_id))
}

pub async fn delete_branch(
    State(state): State<AppState>,
    Path(branch_id): Path<String>,
) -> AppResult<Json<()>> {
    let in_use: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM campaigns WHERE branch_id = $1")
        .bind(&branch_id)
        .fetch_one(&state.pool)
        .await?;
    if in_use.0 > 0 {
        return Err(AppError::Validation(
            "Branch has campaigns and cannot be deleted.".into(),
        ));
    }

    let result = sqlx::query("DELETE FROM branches WHERE branch_id = $1")
        .bind(&branch_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Branch".into()));
    }
    Ok(Json(()))
}
