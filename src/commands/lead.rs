use crate::db::{Lead, TimelineEvent};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::utils::is_valid_phone;

pub async fn get_leads(State(state): State<AppState>) -> AppResult<Json<Vec<Lead>>> {
    let leads = sqlx::query_as::<_, Lead>("SELECT * FROM leads ORDER BY created_at DESC")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(leads))
}

#[derive(Deserialize)]
pub struct LeadPhoneQuery {
    pub phone: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetail {
    #[serde(flatten)]
    pub lead: Lead,
    pub timeline: Vec<TimelineEvent>,
}

/// Branch-counter lookup: most recent lead for an exact phone number, with
/// the full customer journey.
pub async fn get_lead_by_phone(
    State(state): State<AppState>,
    Query(query): Query<LeadPhoneQuery>,
) -> AppResult<Json<LeadDetail>> {
    if !is_valid_phone(&query.phone) {
        return Err(AppError::Validation(
            "Please enter a valid 10-digit phone number.".into(),
        ));
    }

    let lead = sqlx::query_as::<_, Lead>(
        "SELECT * FROM leads WHERE phone = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(&query.phone)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Lead".into()))?;

    let timeline = fetch_timeline(&state, &lead.lead_id).await?;
    Ok(Json(LeadDetail { lead, timeline }))
}

pub async fn get_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> AppResult<Json<LeadDetail>> {
    let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE lead_id = $1")
        .bind(&lead_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Lead".into()))?;

    let timeline = fetch_timeline(&state, &lead.lead_id).await?;
    Ok(Json(LeadDetail { lead, timeline }))
}

async fn fetch_timeline(state: &AppState, lead_id: &str) -> AppResult<Vec<TimelineEvent>> {
    Ok(sqlx::query_as::<_, TimelineEvent>(
        "SELECT * FROM lead_timeline WHERE lead_id = $1 ORDER BY event_id",
    )
    .bind(lead_id)
    .fetch_all(&state.pool)
    .await?)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffActionInput {
    pub staff_name: String,
    pub notes: Option<String>,
}

pub async fn reject_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
    Json(input): Json<StaffActionInput>,
) -> AppResult<Json<()>> {
    let mut tx = state.pool.begin().await?;

    let result = sqlx::query(
        "UPDATE leads SET status = 'rejected' WHERE lead_id = $1 AND status = 'pending'",
    )
    .bind(&lead_id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::Validation(
            "Only pending leads can be rejected.".into(),
        ));
    }

    sqlx::query(
        "INSERT INTO lead_timeline (lead_id, event, source, notes)
         VALUES ($1, 'Offer Rejected', $2, $3)",
    )
    .bind(&lead_id)
    .bind(&input.staff_name)
    .bind(input.notes.as_deref().unwrap_or("Status changed to rejected"))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(()))
}

pub async fn send_feedback_request(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
    Json(input): Json<StaffActionInput>,
) -> AppResult<Json<()>> {
    let mut tx = state.pool.begin().await?;

    let result = sqlx::query(
        "UPDATE leads SET feedback_request_sent = TRUE
         WHERE lead_id = $1 AND feedback_request_sent = FALSE",
    )
    .bind(&lead_id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        // Either no such lead or the request already went out.
        let exists: Option<(String,)> = sqlx::query_as("SELECT lead_id FROM leads WHERE lead_id = $1")
            .bind(&lead_id)
            .fetch_optional(&mut *tx)
            .await?;
        return Err(match exists {
            Some(_) => AppError::Validation("Feedback request was already sent.".into()),
            None => AppError::NotFound("Lead".into()),
        });
    }

    sqlx::query(
        "INSERT INTO lead_timeline (lead_id, event, source, notes)
         VALUES ($1, 'Feedback Request Sent', $2, 'Feedback request sent to customer')",
    )
    .bind(&lead_id)
    .bind(&input.staff_name)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(()))
}
