use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{FromRow, Pool, Postgres};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

pub type DbPool = Pool<Postgres>;

pub async fn init_pool_with_options(opts: PgConnectOptions) -> AppResult<DbPool> {
    // connect_lazy_with returns the pool immediately. It does not validate connection.
    Ok(PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .idle_timeout(std::time::Duration::from_secs(120))
        .max_lifetime(std::time::Duration::from_secs(300))
        .connect_lazy_with(opts))
}

pub async fn init_pool(database_url: &str) -> AppResult<DbPool> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Internal(format!("Invalid DB URL: {}", e)))?
        .ssl_mode(PgSslMode::Disable);

    init_pool_with_options(opts).await
}

pub async fn init_database(pool: &DbPool) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;

    let _ = ensure_seeds(pool).await;
    tracing::info!("Database ready.");

    Ok(())
}

/// Minimal lookup rows so a fresh install can create a campaign right away.
async fn ensure_seeds(pool: &DbPool) -> AppResult<()> {
    let branch_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM branches")
        .fetch_one(pool)
        .await
        .unwrap_or((0,));
    if branch_count.0 == 0 {
        let _ = sqlx::query(
            "INSERT INTO branches (branch_id, branch_name, city) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        )
        .bind(new_id("BR"))
        .bind("Koramangala")
        .bind("Bangalore")
        .execute(pool)
        .await;
    }

    let discount_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM discounts")
        .fetch_one(pool)
        .await
        .unwrap_or((0,));
    if discount_count.0 == 0 {
        let _ = sqlx::query(
            "INSERT INTO discounts (discount_id, code, description, kind, value, status)
             VALUES ($1, 'WELCOME10', '10% off on all services', 'percentage', 10, 'active')
             ON CONFLICT DO NOTHING",
        )
        .bind(new_id("DSC"))
        .execute(pool)
        .await;
    }
    Ok(())
}

/// Short prefixed IDs, e.g. "CAM-9F3A21BC".
pub fn new_id(prefix: &str) -> String {
    format!(
        "{}-{}",
        prefix,
        uuid::Uuid::new_v4().to_string()[..8].to_uppercase()
    )
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Discount {
    pub discount_id: String,
    pub code: String,
    pub description: String,
    pub kind: String, // 'percentage' | 'fixed'
    pub value: i32,
    pub status: String, // 'active' | 'inactive'
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub branch_id: String,
    pub branch_name: String,
    pub city: String,
    pub created_at: Option<DateTime<Utc>>,
    // Derived in the list query, never stored.
    #[sqlx(default)]
    pub total_scans: Option<i64>,
    #[sqlx(default)]
    pub total_leads: Option<i64>,
    #[sqlx(default)]
    pub total_encashed: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Place {
    pub place_id: String,
    pub place_name: String,
    pub category: String,
    pub monthly_cost: i32,
    pub placement_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Campaign {
    pub campaign_id: String,
    pub campaign_name: String,
    pub city: String,
    pub branch_id: String,
    pub discount_id: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String, // 'active' | 'paused' | 'completed'
    pub created_at: Option<DateTime<Utc>>,
    // Joined for the admin table.
    #[sqlx(default)]
    pub branch_name: Option<String>,
    #[sqlx(default)]
    pub discount_code: Option<String>,
    #[sqlx(default)]
    pub scans: Option<i64>,
    #[sqlx(default)]
    pub leads: Option<i64>,
    #[sqlx(default)]
    pub encashed: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct CampaignSource {
    pub source_id: String,
    pub campaign_id: String,
    pub place_id: String,
    pub scans: i32,
    pub leads: i32,
    pub encashed: i32,
    pub created_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub place_name: Option<String>,
    #[sqlx(default)]
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub lead_id: String,
    pub customer_name: String,
    pub phone: String,
    pub vehicle: String,
    pub pincode: Option<String>,
    pub status: String, // 'pending' | 'encashed' | 'rejected'
    pub campaign_id: String,
    pub source_id: String,
    pub place_id: String,
    pub branch_id: String,
    pub category: String,
    pub feedback_request_sent: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct TimelineEvent {
    pub event_id: i32,
    pub lead_id: String,
    pub event: String,
    pub source: String,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub customer_id: String,
    pub phone: String,
    pub first_visit_at: Option<DateTime<Utc>>,
    pub last_visit_at: Option<DateTime<Utc>>,
    pub total_visits: i32,
    pub total_encashments: i32,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Default)]
pub struct CampaignStats {
    pub scans: Option<i64>,
    pub leads: Option<i64>,
    pub encashed: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct DailyLeadStats {
    pub date: String,
    pub leads: i64,
    pub encashed: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Default)]
pub struct CustomerStats {
    pub total_customers: Option<i64>,
    pub new_customers: Option<i64>,
    pub repeat_customers: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct CategoryLeads {
    pub category: String,
    pub leads: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct LocationLeads {
    pub location: String,
    pub category: String,
    pub leads: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PincodeLeads {
    pub pincode: String,
    pub leads: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PlaceLeadCost {
    pub place_id: String,
    pub place_name: String,
    pub category: String,
    pub monthly_cost: i32,
    pub leads: i64,
    // NULL while the place has no leads.
    pub cost_per_lead: Option<f64>,
}
