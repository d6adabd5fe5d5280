#[cfg(test)]
mod tests {
    use crate::commands::capture::{submit_lead, CaptureContextQuery, LeadInput};
    use crate::commands::encash::{encash_lead, request_otp, EncashInput};
    use crate::db::{self, new_id, DbPool};
    use crate::state::AppState;
    use axum::extract::{Path, Query, State};
    use axum::Json;

    async fn setup_test_db() -> DbPool {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = db::init_pool(&database_url)
            .await
            .expect("Failed to create pool");
        db::init_database(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    struct Fixture {
        branch_id: String,
        discount_id: String,
        place_id: String,
        campaign_id: String,
        source_id: String,
    }

    async fn seed_campaign(pool: &DbPool) -> Fixture {
        let fixture = Fixture {
            branch_id: new_id("BR"),
            discount_id: new_id("DSC"),
            place_id: new_id("PLC"),
            campaign_id: new_id("CAM"),
            source_id: new_id("SRC"),
        };

        sqlx::query("INSERT INTO branches (branch_id, branch_name, city) VALUES ($1, 'Test Branch', 'Bangalore')")
            .bind(&fixture.branch_id)
            .execute(pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO discounts (discount_id, code, description, kind, value)
             VALUES ($1, $2, 'Test discount', 'percentage', 20)",
        )
        .bind(&fixture.discount_id)
        .bind(format!("TEST{}", &fixture.discount_id[4..]))
        .execute(pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO places (place_id, place_name, category, monthly_cost)
             VALUES ($1, 'Test Salon', 'Salon', 5000)",
        )
        .bind(&fixture.place_id)
        .execute(pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO campaigns (campaign_id, campaign_name, city, branch_id, discount_id)
             VALUES ($1, 'Test Campaign', 'Bangalore', $2, $3)",
        )
        .bind(&fixture.campaign_id)
        .bind(&fixture.branch_id)
        .bind(&fixture.discount_id)
        .execute(pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO campaign_sources (source_id, campaign_id, place_id) VALUES ($1, $2, $3)",
        )
        .bind(&fixture.source_id)
        .bind(&fixture.campaign_id)
        .bind(&fixture.place_id)
        .execute(pool)
        .await
        .unwrap();

        fixture
    }

    async fn cleanup(pool: &DbPool, fixture: &Fixture, phones: &[&str]) {
        // Leads, timeline events and OTP challenges cascade with the campaign.
        let _ = sqlx::query("DELETE FROM campaigns WHERE campaign_id = $1")
            .bind(&fixture.campaign_id)
            .execute(pool)
            .await;
        let _ = sqlx::query("DELETE FROM places WHERE place_id = $1")
            .bind(&fixture.place_id)
            .execute(pool)
            .await;
        let _ = sqlx::query("DELETE FROM branches WHERE branch_id = $1")
            .bind(&fixture.branch_id)
            .execute(pool)
            .await;
        let _ = sqlx::query("DELETE FROM discounts WHERE discount_id = $1")
            .bind(&fixture.discount_id)
            .execute(pool)
            .await;
        for phone in phones {
            let _ = sqlx::query("DELETE FROM customers WHERE phone = $1")
                .bind(phone)
                .execute(pool)
                .await;
        }
    }

    fn lead_input(fixture: &Fixture, name: &str, phone: &str) -> LeadInput {
        LeadInput {
            customer_name: name.to_string(),
            phone: phone.to_string(),
            vehicle: "Maruti Swift".to_string(),
            pincode: Some("560034".to_string()),
            campaign_id: fixture.campaign_id.clone(),
            source_id: fixture.source_id.clone(),
        }
    }

    #[tokio::test]
    async fn test_capture_flow_integration() {
        let pool = setup_test_db().await;
        let state = AppState { pool: pool.clone() };
        let fixture = seed_campaign(&pool).await;
        let phone = "9100000001";

        // Scan: context fetch counts exactly one scan.
        let context = crate::commands::capture::get_capture_context(
            State(state.clone()),
            Query(CaptureContextQuery {
                campaign_id: fixture.campaign_id.clone(),
                source_id: fixture.source_id.clone(),
            }),
        )
        .await
        .expect("context fetch failed")
        .0;
        assert_eq!(context.branch_id, fixture.branch_id);
        assert_eq!(context.category, "Salon");
        assert!(context.campaign_active);

        // Submit the form.
        let lead_id = submit_lead(
            State(state.clone()),
            Json(lead_input(&fixture, "Ravi Kumar", phone)),
        )
        .await
        .expect("lead submission failed")
        .0;

        let (status, category): (String, String) =
            sqlx::query_as("SELECT status, category FROM leads WHERE lead_id = $1")
                .bind(&lead_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, "pending");
        assert_eq!(category, "Salon");

        let events: Vec<(String,)> = sqlx::query_as(
            "SELECT event FROM lead_timeline WHERE lead_id = $1 ORDER BY event_id",
        )
        .bind(&lead_id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(events, vec![("Form Submitted".to_string(),)]);

        let (scans, leads): (i32, i32) =
            sqlx::query_as("SELECT scans, leads FROM campaign_sources WHERE source_id = $1")
                .bind(&fixture.source_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(scans, 1);
        assert_eq!(leads, 1);

        // First submission creates the customer with one visit.
        let (visits, encashments): (i32, i32) = sqlx::query_as(
            "SELECT total_visits, total_encashments FROM customers WHERE phone = $1",
        )
        .bind(phone)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(visits, 1);
        assert_eq!(encashments, 0);

        // Same phone again: repeat visit, still one customer row.
        submit_lead(
            State(state.clone()),
            Json(lead_input(&fixture, "Ravi Kumar", phone)),
        )
        .await
        .expect("repeat submission failed");

        let rows: Vec<(i32,)> =
            sqlx::query_as("SELECT total_visits FROM customers WHERE phone = $1")
                .bind(phone)
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, 2);

        cleanup(&pool, &fixture, &[phone]).await;
    }

    #[tokio::test]
    async fn test_encash_flow_integration() {
        let pool = setup_test_db().await;
        let state = AppState { pool: pool.clone() };
        let fixture = seed_campaign(&pool).await;
        let phone = "9100000002";

        let lead_id = submit_lead(
            State(state.clone()),
            Json(lead_input(&fixture, "Sunita Sharma", phone)),
        )
        .await
        .unwrap()
        .0;

        request_otp(State(state.clone()), Path(lead_id.clone()))
            .await
            .expect("OTP request failed");

        // Delivery is mocked, so read the issued code back.
        let code: String = sqlx::query_scalar(
            "SELECT code FROM otp_challenges WHERE lead_id = $1 AND NOT consumed
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(&lead_id)
        .fetch_one(&pool)
        .await
        .unwrap();

        // Wrong code must not encash.
        let wrong = encash_lead(
            State(state.clone()),
            Path(lead_id.clone()),
            Json(EncashInput {
                otp: if code == "000000" { "000001".into() } else { "000000".into() },
                staff_name: "Branch User".to_string(),
            }),
        )
        .await;
        assert!(wrong.is_err());

        encash_lead(
            State(state.clone()),
            Path(lead_id.clone()),
            Json(EncashInput {
                otp: code,
                staff_name: "Branch User".to_string(),
            }),
        )
        .await
        .expect("encash failed");

        let status: String = sqlx::query_scalar("SELECT status FROM leads WHERE lead_id = $1")
            .bind(&lead_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status, "encashed");

        let encashed: i32 =
            sqlx::query_scalar("SELECT encashed FROM campaign_sources WHERE source_id = $1")
                .bind(&fixture.source_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(encashed, 1);

        let total_encashments: i32 =
            sqlx::query_scalar("SELECT total_encashments FROM customers WHERE phone = $1")
                .bind(phone)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(total_encashments, 1);

        let events: Vec<(String,)> = sqlx::query_as(
            "SELECT event FROM lead_timeline WHERE lead_id = $1 ORDER BY event_id",
        )
        .bind(&lead_id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(
            events,
            vec![
                ("Form Submitted".to_string(),),
                ("Offer Encashed".to_string(),)
            ]
        );

        // A consumed lead cannot be encashed twice.
        let again = request_otp(State(state.clone()), Path(lead_id.clone())).await;
        assert!(again.is_err());

        cleanup(&pool, &fixture, &[phone]).await;
    }

    #[tokio::test]
    async fn test_expired_otp_rejected_integration() {
        let pool = setup_test_db().await;
        let state = AppState { pool: pool.clone() };
        let fixture = seed_campaign(&pool).await;
        let phone = "9100000003";

        let lead_id = submit_lead(
            State(state.clone()),
            Json(lead_input(&fixture, "Amit Patel", phone)),
        )
        .await
        .unwrap()
        .0;

        sqlx::query(
            "INSERT INTO otp_challenges (lead_id, code, expires_at)
             VALUES ($1, '123456', now() - interval '1 minute')",
        )
        .bind(&lead_id)
        .execute(&pool)
        .await
        .unwrap();

        let result = encash_lead(
            State(state.clone()),
            Path(lead_id.clone()),
            Json(EncashInput {
                otp: "123456".to_string(),
                staff_name: "Branch User".to_string(),
            }),
        )
        .await;
        assert!(result.is_err(), "expired OTP must not encash");

        let status: String = sqlx::query_scalar("SELECT status FROM leads WHERE lead_id = $1")
            .bind(&lead_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status, "pending");

        cleanup(&pool, &fixture, &[phone]).await;
    }

    #[tokio::test]
    async fn test_campaign_stats_integration() {
        let pool = setup_test_db().await;
        let state = AppState { pool: pool.clone() };
        let fixture = seed_campaign(&pool).await;

        // Second source for the same campaign.
        let place2 = new_id("PLC");
        let source2 = new_id("SRC");
        sqlx::query(
            "INSERT INTO places (place_id, place_name, category, monthly_cost)
             VALUES ($1, 'Test Gym', 'Gym', 8000)",
        )
        .bind(&place2)
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO campaign_sources (source_id, campaign_id, place_id, scans, leads, encashed)
             VALUES ($1, $2, $3, 150, 100, 50)",
        )
        .bind(&source2)
        .bind(&fixture.campaign_id)
        .bind(&place2)
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "UPDATE campaign_sources SET scans = 200, leads = 150, encashed = 80 WHERE source_id = $1",
        )
        .bind(&fixture.source_id)
        .execute(&pool)
        .await
        .unwrap();

        let stats = crate::commands::campaign::get_campaign_stats(
            State(state.clone()),
            Query(crate::commands::campaign::CampaignStatsQuery {
                id: fixture.campaign_id.clone(),
            }),
        )
        .await
        .unwrap()
        .0;

        assert_eq!(stats.scans, Some(350));
        assert_eq!(stats.leads, Some(250));
        assert_eq!(stats.encashed, Some(130));

        cleanup(&pool, &fixture, &[]).await;
        let _ = sqlx::query("DELETE FROM places WHERE place_id = $1")
            .bind(&place2)
            .execute(&pool)
            .await;
    }
}
