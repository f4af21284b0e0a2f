use sqlx::PgPool;
use uuid::Uuid;

use crate::models::school::{CreateSchoolRequest, School, UpdateSchoolRequest};

pub struct SchoolService;

impl SchoolService {
    pub async fn list(pool: &PgPool) -> anyhow::Result<Vec<School>> {
        let schools = sqlx::query_as::<_, School>("SELECT * FROM schools ORDER BY name")
            .fetch_all(pool)
            .await?;
        Ok(schools)
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<School>> {
        let school = sqlx::query_as::<_, School>("SELECT * FROM schools WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(school)
    }

    pub async fn create(pool: &PgPool, req: &CreateSchoolRequest) -> anyhow::Result<School> {
        let school = sqlx::query_as::<_, School>(
            "INSERT INTO schools (name, address, city, pincode, contact_name, contact_phone, contact_email)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(&req.name)
        .bind(&req.address)
        .bind(&req.city)
        .bind(&req.pincode)
        .bind(&req.contact_name)
        .bind(&req.contact_phone)
        .bind(&req.contact_email)
        .fetch_one(pool)
        .await?;
        Ok(school)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateSchoolRequest,
    ) -> anyhow::Result<Option<School>> {
        let school = sqlx::query_as::<_, School>(
            "UPDATE schools
             SET name          = COALESCE($1, name),
                 address       = COALESCE($2, address),
                 city          = COALESCE($3, city),
                 pincode       = COALESCE($4, pincode),
                 contact_name  = COALESCE($5, contact_name),
                 contact_phone = COALESCE($6, contact_phone),
                 contact_email = COALESCE($7, contact_email),
                 is_active     = COALESCE($8, is_active)
             WHERE id = $9
             RETURNING *",
        )
        .bind(&req.name)
        .bind(&req.address)
        .bind(&req.city)
        .bind(&req.pincode)
        .bind(&req.contact_name)
        .bind(&req.contact_phone)
        .bind(&req.contact_email)
        .bind(req.is_active)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(school)
    }

    /// Deletes only the school row. Cohorts, students and the onboarding
    /// record keep their dangling references; the `purge-school` tool is the
    /// operator path for a full cleanup.
    pub async fn delete(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM schools WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Default)]
pub struct PurgeSummary {
    pub students: u64,
    pub cohorts: u64,
    pub profiles: u64,
    pub assessments: u64,
    pub attendance_records: u64,
    pub onboardings: u64,
}

/// Full cascade delete of one school and everything hanging off it.
/// Onboarding and profile children go with their parents via FK cascade;
/// the rest is deleted explicitly, students last so the subqueries still
/// resolve.
pub async fn purge_school(pool: &PgPool, school_id: Uuid) -> anyhow::Result<PurgeSummary> {
    let mut summary = PurgeSummary::default();

    summary.profiles = sqlx::query(
        "DELETE FROM student_profiles
         WHERE student_id IN (SELECT id FROM students WHERE school_id = $1)",
    )
    .bind(school_id)
    .execute(pool)
    .await?
    .rows_affected();

    summary.assessments = sqlx::query(
        "DELETE FROM assessments
         WHERE student_id IN (SELECT id FROM students WHERE school_id = $1)",
    )
    .bind(school_id)
    .execute(pool)
    .await?
    .rows_affected();

    summary.attendance_records = sqlx::query(
        "DELETE FROM attendance_records
         WHERE cohort_id IN (SELECT id FROM cohorts WHERE school_id = $1)
            OR student_id IN (SELECT id FROM students WHERE school_id = $1)",
    )
    .bind(school_id)
    .execute(pool)
    .await?
    .rows_affected();

    summary.students = sqlx::query("DELETE FROM students WHERE school_id = $1")
        .bind(school_id)
        .execute(pool)
        .await?
        .rows_affected();

    summary.cohorts = sqlx::query("DELETE FROM cohorts WHERE school_id = $1")
        .bind(school_id)
        .execute(pool)
        .await?
        .rows_affected();

    summary.onboardings = sqlx::query("DELETE FROM school_onboardings WHERE school_id = $1")
        .bind(school_id)
        .execute(pool)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM schools WHERE id = $1")
        .bind(school_id)
        .execute(pool)
        .await?;

    Ok(summary)
}
