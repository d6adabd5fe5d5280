use crate::db::{
    CampaignStats, CategoryLeads, CustomerStats, DailyLeadStats, LocationLeads, PincodeLeads,
    PlaceLeadCost,
};
use crate::error::AppResult;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::utils::repeat_rate;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInsights {
    pub total_customers: i64,
    pub new_customers: i64,
    pub repeat_customers: i64,
    pub repeat_rate: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub total_scans: i64,
    pub total_leads: i64,
    pub successfully_encashed: i64,
    pub leads_over_time: Vec<DailyLeadStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_stats: Option<CustomerInsights>,
}

const DAILY_LEADS_SQL: &str = r#"
    SELECT to_char(d.day, 'Mon DD') AS date,
           CAST(COUNT(l.lead_id) AS BIGINT) AS leads,
           CAST(COUNT(l.lead_id) FILTER (WHERE l.status = 'encashed') AS BIGINT) AS encashed
    FROM generate_series(CURRENT_DATE - INTERVAL '6 days', CURRENT_DATE, INTERVAL '1 day') AS d(day)
    LEFT JOIN leads l ON l.created_at::date = d.day::date
    GROUP BY d.day
    ORDER BY d.day
"#;

pub async fn get_admin_analytics(State(state): State<AppState>) -> AppResult<Json<AnalyticsData>> {
    let totals = sqlx::query_as::<_, CampaignStats>(
        "SELECT CAST(COALESCE(SUM(scans), 0) AS BIGINT) AS scans,
                CAST(COALESCE(SUM(leads), 0) AS BIGINT) AS leads,
                CAST(COALESCE(SUM(encashed), 0) AS BIGINT) AS encashed
         FROM campaign_sources",
    )
    .fetch_one(&state.pool)
    .await
    .unwrap_or_default();

    let leads_over_time = sqlx::query_as::<_, DailyLeadStats>(DAILY_LEADS_SQL)
        .fetch_all(&state.pool)
        .await?;

    let stats = sqlx::query_as::<_, CustomerStats>(
        "SELECT CAST(COUNT(*) AS BIGINT) AS total_customers,
                CAST(COUNT(*) FILTER (WHERE total_visits = 1) AS BIGINT) AS new_customers,
                CAST(COUNT(*) FILTER (WHERE total_visits > 1) AS BIGINT) AS repeat_customers
         FROM customers",
    )
    .fetch_one(&state.pool)
    .await
    .unwrap_or_default();

    let total = stats.total_customers.unwrap_or(0);
    let repeat = stats.repeat_customers.unwrap_or(0);
    Ok(Json(AnalyticsData {
        total_scans: totals.scans.unwrap_or(0),
        total_leads: totals.leads.unwrap_or(0),
        successfully_encashed: totals.encashed.unwrap_or(0),
        leads_over_time,
        customer_stats: Some(CustomerInsights {
            total_customers: total,
            new_customers: stats.new_customers.unwrap_or(0),
            repeat_customers: repeat,
            repeat_rate: repeat_rate(total, repeat),
        }),
    }))
}

pub async fn get_branch_analytics(
    State(state): State<AppState>,
    Path(branch_id): Path<String>,
) -> AppResult<Json<AnalyticsData>> {
    let totals = sqlx::query_as::<_, CampaignStats>(
        "SELECT CAST(COALESCE(SUM(cs.scans), 0) AS BIGINT) AS scans,
                CAST(COALESCE(SUM(cs.leads), 0) AS BIGINT) AS leads,
                CAST(COALESCE(SUM(cs.encashed), 0) AS BIGINT) AS encashed
         FROM campaign_sources cs
         JOIN campaigns c ON c.campaign_id = cs.campaign_id
         WHERE c.branch_id = $1",
    )
    .bind(&branch_id)
    .fetch_one(&state.pool)
    .await
    .unwrap_or_default();

    let leads_over_time = sqlx::query_as::<_, DailyLeadStats>(
        r#"
        SELECT to_char(d.day, 'Mon DD') AS date,
               CAST(COUNT(l.lead_id) AS BIGINT) AS leads,
               CAST(COUNT(l.lead_id) FILTER (WHERE l.status = 'encashed') AS BIGINT) AS encashed
        FROM generate_series(CURRENT_DATE - INTERVAL '6 days', CURRENT_DATE, INTERVAL '1 day') AS d(day)
        LEFT JOIN leads l ON l.created_at::date = d.day::date AND l.branch_id = $1
        GROUP BY d.day
        ORDER BY d.day
        "#,
    )
    .bind(&branch_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(AnalyticsData {
        total_scans: totals.scans.unwrap_or(0),
        total_leads: totals.leads.unwrap_or(0),
        successfully_encashed: totals.encashed.unwrap_or(0),
        leads_over_time,
        customer_stats: None,
    }))
}

pub async fn get_category_leads(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategoryLeads>>> {
    let rows = sqlx::query_as::<_, CategoryLeads>(
        "SELECT category, CAST(COUNT(*) AS BIGINT) AS leads
         FROM leads GROUP BY category ORDER BY leads DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows))
}

pub async fn get_location_leads(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<LocationLeads>>> {
    let rows = sqlx::query_as::<_, LocationLeads>(
        "SELECT c.city AS location, l.category, CAST(COUNT(*) AS BIGINT) AS leads
         FROM leads l
         JOIN campaigns c ON c.campaign_id = l.campaign_id
         GROUP BY c.city, l.category
         ORDER BY leads DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows))
}

pub async fn get_pincode_leads(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PincodeLeads>>> {
    let rows = sqlx::query_as::<_, PincodeLeads>(
        "SELECT pincode, CAST(COUNT(*) AS BIGINT) AS leads
         FROM leads
         WHERE pincode IS NOT NULL AND pincode <> ''
         GROUP BY pincode
         ORDER BY leads DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows))
}

/// Cost-per-lead per place across all campaigns. NULL until a place has
/// produced a lead.
pub async fn get_cost_per_lead(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PlaceLeadCost>>> {
    let rows = sqlx::query_as::<_, PlaceLeadCost>(
        "SELECT p.place_id, p.place_name, p.category, p.monthly_cost,
                CAST(COUNT(l.lead_id) AS BIGINT) AS leads,
                CASE WHEN COUNT(l.lead_id) > 0
                     THEN p.monthly_cost::float8 / COUNT(l.lead_id)
                END AS cost_per_lead
         FROM places p
         LEFT JOIN leads l ON l.place_id = p.place_id
         GROUP BY p.place_id, p.place_name, p.category, p.monthly_cost
         ORDER BY p.place_name",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(rows))
}
