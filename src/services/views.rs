use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::cohort::Cohort;
use crate::models::school::School;

/// Platform-wide tallies for the read-only view role.
#[derive(Debug, Serialize)]
pub struct PlatformSummary {
    pub schools: i64,
    pub students: i64,
    pub cohorts: i64,
    pub programs: i64,
    pub onboardings_in_progress: i64,
    pub average_onboarding_progress: i64,
    pub new_volunteer_requests: i64,
}

#[derive(Debug, Serialize)]
pub struct OnboardingSnapshot {
    pub status: String,
    pub current_phase: String,
    pub overall_progress: i32,
}

/// Per-school read-only aggregate.
#[derive(Debug, Serialize)]
pub struct SchoolView {
    #[serde(flatten)]
    pub school: School,
    pub student_count: i64,
    pub cohorts: Vec<Cohort>,
    pub onboarding: Option<OnboardingSnapshot>,
}

pub struct ViewService;

impl ViewService {
    pub async fn summary(pool: &PgPool) -> anyhow::Result<PlatformSummary> {
        let schools: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM schools WHERE is_active = TRUE")
                .fetch_one(pool)
                .await?;
        let students: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE is_active = TRUE")
                .fetch_one(pool)
                .await?;
        let cohorts: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cohorts WHERE is_active = TRUE")
                .fetch_one(pool)
                .await?;
        let programs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM programs WHERE is_active = TRUE")
                .fetch_one(pool)
                .await?;
        let onboardings_in_progress: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM school_onboardings WHERE status = 'in_progress'",
        )
        .fetch_one(pool)
        .await?;
        let average_onboarding_progress: i64 = sqlx::query_scalar(
            "SELECT COALESCE(ROUND(AVG(overall_progress)), 0)::BIGINT FROM school_onboardings",
        )
        .fetch_one(pool)
        .await?;
        let new_volunteer_requests: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM volunteer_requests WHERE status = 'new'")
                .fetch_one(pool)
                .await?;

        Ok(PlatformSummary {
            schools,
            students,
            cohorts,
            programs,
            onboardings_in_progress,
            average_onboarding_progress,
            new_volunteer_requests,
        })
    }

    pub async fn school_view(pool: &PgPool, school_id: Uuid) -> anyhow::Result<Option<SchoolView>> {
        let school = sqlx::query_as::<_, School>("SELECT * FROM schools WHERE id = $1")
            .bind(school_id)
            .fetch_optional(pool)
            .await?;
        let Some(school) = school else {
            return Ok(None);
        };

        let student_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM students WHERE school_id = $1 AND is_active = TRUE",
        )
        .bind(school_id)
        .fetch_one(pool)
        .await?;
        let cohorts = sqlx::query_as::<_, Cohort>(
            "SELECT * FROM cohorts WHERE school_id = $1 ORDER BY level, name",
        )
        .bind(school_id)
        .fetch_all(pool)
        .await?;
        let onboarding: Option<(String, String, i32)> = sqlx::query_as(
            "SELECT status, current_phase, overall_progress
             FROM school_onboardings WHERE school_id = $1",
        )
        .bind(school_id)
        .fetch_optional(pool)
        .await?;

        Ok(Some(SchoolView {
            school,
            student_count,
            cohorts,
            onboarding: onboarding.map(|(status, current_phase, overall_progress)| {
                OnboardingSnapshot {
                    status,
                    current_phase,
                    overall_progress,
                }
            }),
        }))
    }
}
