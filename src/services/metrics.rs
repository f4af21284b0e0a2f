use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, CounterVec, Gauge, GaugeVec,
};
use sqlx::PgPool;
use tracing::{info, warn};

lazy_static! {
    // ── Event counters (increment on each event) ────────────────────────────
    pub static ref LOGINS_COUNTER: CounterVec = register_counter_vec!(
        "api_logins_total",
        "Login attempts by status",
        &["status"]
    ).unwrap();

    pub static ref REGISTRATIONS_COUNTER: CounterVec = register_counter_vec!(
        "api_registrations_total",
        "User registrations by outcome",
        &["outcome"]
    ).unwrap();

    pub static ref ASSESSMENTS_COUNTER: CounterVec = register_counter_vec!(
        "api_assessments_recorded_total",
        "Assessments recorded by kind",
        &["kind"]
    ).unwrap();

    pub static ref VOLUNTEER_SUBMISSIONS_COUNTER: CounterVec = register_counter_vec!(
        "api_volunteer_submissions_total",
        "Volunteer form submissions by outcome",
        &["outcome"]
    ).unwrap();

    // ── Business gauges (refreshed by the collector loop) ───────────────────
    pub static ref SCHOOLS_GAUGE: Gauge = register_gauge!(
        "platform_schools_active_total",
        "Active partner schools"
    ).unwrap();

    pub static ref STUDENTS_GAUGE: Gauge = register_gauge!(
        "platform_students_active_total",
        "Active students"
    ).unwrap();

    pub static ref COHORTS_GAUGE: Gauge = register_gauge!(
        "platform_cohorts_active_total",
        "Active cohorts"
    ).unwrap();

    pub static ref USERS_GAUGE: GaugeVec = register_gauge_vec!(
        "platform_users_total",
        "Active users by role",
        &["role"]
    ).unwrap();

    pub static ref ONBOARDINGS_GAUGE: GaugeVec = register_gauge_vec!(
        "platform_onboardings_total",
        "School onboardings by status",
        &["status"]
    ).unwrap();

    pub static ref TASKS_COMPLETED_GAUGE: Gauge = register_gauge!(
        "platform_onboarding_tasks_completed_total",
        "Completed onboarding tasks"
    ).unwrap();

    pub static ref ONBOARDING_PROGRESS_GAUGE: Gauge = register_gauge!(
        "platform_onboarding_progress_avg",
        "Mean overall onboarding progress (0-100)"
    ).unwrap();

    pub static ref VOLUNTEER_REQUESTS_GAUGE: GaugeVec = register_gauge_vec!(
        "platform_volunteer_requests_total",
        "Volunteer requests by status",
        &["status"]
    ).unwrap();
}

/// Spawn the background metrics collector (refreshes every 5 minutes).
pub fn start(pool: PgPool) {
    tokio::spawn(async move {
        if let Err(e) = collect(&pool).await {
            warn!("Metrics: initial collection failed: {}", e);
        }
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await;
            if let Err(e) = collect(&pool).await {
                warn!("Metrics: collection failed: {}", e);
            }
        }
    });
}

async fn collect(pool: &PgPool) -> anyhow::Result<()> {
    let schools: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schools WHERE is_active = TRUE")
        .fetch_one(pool)
        .await?;
    SCHOOLS_GAUGE.set(schools as f64);

    let students: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE is_active = TRUE")
            .fetch_one(pool)
            .await?;
    STUDENTS_GAUGE.set(students as f64);

    let cohorts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cohorts WHERE is_active = TRUE")
        .fetch_one(pool)
        .await?;
    COHORTS_GAUGE.set(cohorts as f64);

    let user_counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT role, COUNT(*)::BIGINT FROM users WHERE is_active = TRUE GROUP BY role",
    )
    .fetch_all(pool)
    .await
    .unwrap_or_default();
    for (role, count) in user_counts {
        USERS_GAUGE.with_label_values(&[&role]).set(count as f64);
    }

    let onboarding_counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*)::BIGINT FROM school_onboardings GROUP BY status",
    )
    .fetch_all(pool)
    .await
    .unwrap_or_default();
    for (status, count) in onboarding_counts {
        ONBOARDINGS_GAUGE
            .with_label_values(&[&status])
            .set(count as f64);
    }

    let avg_progress: f64 = sqlx::query_scalar(
        "SELECT COALESCE(AVG(overall_progress), 0)::FLOAT8 FROM school_onboardings",
    )
    .fetch_one(pool)
    .await
    .unwrap_or(0.0);
    ONBOARDING_PROGRESS_GAUGE.set(avg_progress);

    let completed_tasks: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM onboarding_tasks WHERE status = 'completed'",
    )
    .fetch_one(pool)
    .await
    .unwrap_or(0);
    TASKS_COMPLETED_GAUGE.set(completed_tasks as f64);

    let volunteer_counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*)::BIGINT FROM volunteer_requests GROUP BY status",
    )
    .fetch_all(pool)
    .await
    .unwrap_or_default();
    for (status, count) in volunteer_counts {
        VOLUNTEER_REQUESTS_GAUGE
            .with_label_values(&[&status])
            .set(count as f64);
    }

    info!("Metrics: collected platform gauges");
    Ok(())
}
