use crate::db::new_id;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::utils::{is_valid_phone, is_valid_pincode};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureContextQuery {
    pub campaign_id: String,
    pub source_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureContext {
    pub campaign_id: String,
    pub campaign_name: String,
    pub campaign_active: bool,
    pub source_id: String,
    pub branch_id: String,
    pub place_id: String,
    pub category: String,
    pub discount_code: String,
    pub discount_description: String,
}

#[derive(sqlx::FromRow)]
struct ContextRow {
    campaign_name: String,
    status: String,
    branch_id: String,
    place_id: String,
    category: String,
    discount_code: String,
    discount_description: String,
}

/// Landing call for a scanned QR code. Validates the campaign/source pair,
/// counts the scan, and hands the form the context it needs.
pub async fn get_capture_context(
    State(state): State<AppState>,
    Query(query): Query<CaptureContextQuery>,
) -> AppResult<Json<CaptureContext>> {
    // The increment doubles as the existence check for the pair, so a forged
    // sourceId can never count a scan against another campaign.
    let result = sqlx::query(
        "UPDATE campaign_sources SET scans = scans + 1
         WHERE source_id = $1 AND campaign_id = $2",
    )
    .bind(&query.source_id)
    .bind(&query.campaign_id)
    .execute(&state.pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Campaign source".into()));
    }

    let row = sqlx::query_as::<_, ContextRow>(
        "SELECT c.campaign_name, c.status, c.branch_id, cs.place_id, p.category,
                d.code AS discount_code, d.description AS discount_description
         FROM campaign_sources cs
         JOIN campaigns c ON c.campaign_id = cs.campaign_id
         JOIN places p ON p.place_id = cs.place_id
         JOIN discounts d ON d.discount_id = c.discount_id
         WHERE cs.source_id = $1",
    )
    .bind(&query.source_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(CaptureContext {
        campaign_id: query.campaign_id,
        campaign_name: row.campaign_name,
        campaign_active: row.status == "active",
        source_id: query.source_id,
        branch_id: row.branch_id,
        place_id: row.place_id,
        category: row.category,
        discount_code: row.discount_code,
        discount_description: row.discount_description,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadInput {
    #[serde(alias = "name")]
    pub customer_name: String,
    pub phone: String,
    pub vehicle: String,
    pub pincode: Option<String>,
    pub campaign_id: String,
    pub source_id: String,
}

/// Customer form submission. One transaction covers the lead row, its first
/// timeline event, the source lead counter, and the customer visit record;
/// the original committed these through separate stores with no guarantee.
pub async fn submit_lead(
    State(state): State<AppState>,
    Json(input): Json<LeadInput>,
) -> AppResult<Json<String>> {
    if input.customer_name.trim().len() < 2 {
        return Err(AppError::Validation(
            "Name must be at least 2 characters.".into(),
        ));
    }
    if !is_valid_phone(&input.phone) {
        return Err(AppError::Validation(
            "Please enter a valid 10-digit phone number.".into(),
        ));
    }
    if input.vehicle.trim().len() < 2 {
        return Err(AppError::Validation(
            "Vehicle model must be at least 2 characters.".into(),
        ));
    }
    let pincode = match input.pincode.as_deref() {
        None | Some("") => None,
        Some(p) if is_valid_pincode(p) => Some(p.to_string()),
        Some(_) => {
            return Err(AppError::Validation(
                "Please enter a valid 6-digit pincode.".into(),
            ))
        }
    };

    let mut tx = state.pool.begin().await?;

    let context: Option<(String, String, String)> = sqlx::query_as(
        "SELECT c.branch_id, cs.place_id, p.category
         FROM campaign_sources cs
         JOIN campaigns c ON c.campaign_id = cs.campaign_id
         JOIN places p ON p.place_id = cs.place_id
         WHERE cs.source_id = $1 AND cs.campaign_id = $2",
    )
    .bind(&input.source_id)
    .bind(&input.campaign_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (branch_id, place_id, category) =
        context.ok_or_else(|| AppError::NotFound("Campaign source".into()))?;

    let lead_id = new_id("LD");
    sqlx::query(
        "INSERT INTO leads (lead_id, customer_name, phone, vehicle, pincode, status,
                            campaign_id, source_id, place_id, branch_id, category)
         VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8, $9, $10)",
    )
    .bind(&lead_id)
    .bind(input.customer_name.trim())
    .bind(&input.phone)
    .bind(input.vehicle.trim())
    .bind(&pincode)
    .bind(&input.campaign_id)
    .bind(&input.source_id)
    .bind(&place_id)
    .bind(&branch_id)
    .bind(&category)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO lead_timeline (lead_id, event, source) VALUES ($1, 'Form Submitted', 'System')",
    )
    .bind(&lead_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE campaign_sources SET leads = leads + 1 WHERE source_id = $1")
        .bind(&input.source_id)
        .execute(&mut *tx)
        .await?;

    // Customer dedup key is the phone number: first submission creates the
    // record, every later one counts a visit.
    sqlx::query(
        "INSERT INTO customers (customer_id, phone) VALUES ($1, $2)
         ON CONFLICT (phone) DO UPDATE
             SET total_visits = customers.total_visits + 1,
                 last_visit_at = now()",
    )
    .bind(new_id("CUST"))
    .bind(&input.phone)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Captured lead {} via source {}", lead_id, input.source_id);
    Ok(Json(lead_id))
}

#[derive(Deserialize)]
pub struct PhoneQuery {
    pub phone: String,
}

/// Repeat-vs-new check used by the capture form greeting.
pub async fn get_customer_by_phone(
    State(state): State<AppState>,
    Query(query): Query<PhoneQuery>,
) -> AppResult<Json<crate::db::Customer>> {
    if !is_valid_phone(&query.phone) {
        return Err(AppError::Validation(
            "Please enter a valid 10-digit phone number.".into(),
        ));
    }
    let customer =
        sqlx::query_as::<_, crate::db::Customer>("SELECT * FROM customers WHERE phone = $1")
            .bind(&query.phone)
            .fetch_optional(&state.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Customer".into()))?;
    Ok(Json(customer))
}
