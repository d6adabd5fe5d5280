use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const OTP_TTL_SECS: i64 = 300;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpIssued {
    pub expires_in_secs: i64,
}

/// Issues a 6-digit code for a pending lead. Delivery to the customer's
/// phone is out of scope; the code is logged for the demo flow.
pub async fn request_otp(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> AppResult<Json<OtpIssued>> {
    let lead: Option<(String, String)> =
        sqlx::query_as("SELECT phone, status FROM leads WHERE lead_id = $1")
            .bind(&lead_id)
            .fetch_optional(&state.pool)
            .await?;
    let (phone, status) = lead.ok_or_else(|| AppError::NotFound("Lead".into()))?;
    if status != "pending" {
        return Err(AppError::Validation(
            "Only pending leads can be encashed.".into(),
        ));
    }

    let code = super::utils::format_otp(rand::rng().random_range(0..1_000_000));

    // A fresh request supersedes older codes for the lead.
    sqlx::query("UPDATE otp_challenges SET consumed = TRUE WHERE lead_id = $1 AND NOT consumed")
        .bind(&lead_id)
        .execute(&state.pool)
        .await?;

    sqlx::query("INSERT INTO otp_challenges (lead_id, code, expires_at) VALUES ($1, $2, $3)")
        .bind(&lead_id)
        .bind(&code)
        .bind(Utc::now() + Duration::seconds(OTP_TTL_SECS))
        .execute(&state.pool)
        .await?;

    tracing::info!("OTP for lead {} (phone {}): {}", lead_id, phone, code);
    Ok(Json(OtpIssued {
        expires_in_secs: OTP_TTL_SECS,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncashInput {
    pub otp: String,
    pub staff_name: String,
}

#[derive(sqlx::FromRow)]
struct ChallengeRow {
    challenge_id: i32,
    code: String,
    expires_at: DateTime<Utc>,
}

/// Verifies the OTP and redeems the offer. Lead status, timeline, the
/// customer's encashment count, and the source counter all move in one
/// transaction or not at all.
pub async fn encash_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
    Json(input): Json<EncashInput>,
) -> AppResult<Json<()>> {
    if input.otp.len() != 6 || !input.otp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Validation("OTP must be 6 digits.".into()));
    }

    let mut tx = state.pool.begin().await?;

    let challenge = sqlx::query_as::<_, ChallengeRow>(
        "SELECT challenge_id, code, expires_at FROM otp_challenges
         WHERE lead_id = $1 AND NOT consumed
         ORDER BY created_at DESC LIMIT 1
         FOR UPDATE",
    )
    .bind(&lead_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::Validation("No active OTP for this lead.".into()))?;

    if challenge.code != input.otp || challenge.expires_at <= Utc::now() {
        return Err(AppError::Validation("Invalid or expired OTP.".into()));
    }

    sqlx::query("UPDATE otp_challenges SET consumed = TRUE WHERE challenge_id = $1")
        .bind(challenge.challenge_id)
        .execute(&mut *tx)
        .await?;

    let lead: Option<(String, String)> = sqlx::query_as(
        "SELECT phone, source_id FROM leads WHERE lead_id = $1 AND status = 'pending' FOR UPDATE",
    )
    .bind(&lead_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (phone, source_id) =
        lead.ok_or_else(|| AppError::Validation("Lead is not pending.".into()))?;

    sqlx::query("UPDATE leads SET status = 'encashed' WHERE lead_id = $1")
        .bind(&lead_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO lead_timeline (lead_id, event, source, notes)
         VALUES ($1, 'Offer Encashed', $2, 'Status changed to encashed')",
    )
    .bind(&lead_id)
    .bind(&input.staff_name)
    .execute(&mut *tx)
    .await?;

    // Encashment counts as a visit for the customer record.
    sqlx::query(
        "UPDATE customers SET total_encashments = total_encashments + 1, last_visit_at = now()
         WHERE phone = $1",
    )
    .bind(&phone)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE campaign_sources SET encashed = encashed + 1 WHERE source_id = $1")
        .bind(&source_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Lead {} encashed by {}", lead_id, input.staff_name);
    Ok(Json(()))
}
