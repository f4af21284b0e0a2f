use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::grouping;
use crate::error::ApiError;
use crate::models::cohort::{
    AttendanceRecord, Cohort, CohortDetail, CreateCohortRequest, GenerateCohortsRequest,
    GeneratedCohort, RecordAttendanceRequest, UpdateCohortRequest,
};
use crate::models::student::Student;

pub struct CohortService;

impl CohortService {
    pub async fn list(pool: &PgPool, school_id: Option<Uuid>) -> anyhow::Result<Vec<Cohort>> {
        let cohorts = match school_id {
            Some(school_id) => {
                sqlx::query_as::<_, Cohort>(
                    "SELECT * FROM cohorts WHERE school_id = $1 ORDER BY level, name",
                )
                .bind(school_id)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Cohort>("SELECT * FROM cohorts ORDER BY level, name")
                    .fetch_all(pool)
                    .await?
            }
        };
        Ok(cohorts)
    }

    pub async fn get_detail(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<CohortDetail>> {
        let cohort = sqlx::query_as::<_, Cohort>("SELECT * FROM cohorts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        let Some(cohort) = cohort else {
            return Ok(None);
        };
        let students = sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE cohort_id = $1 ORDER BY last_name, first_name",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        Ok(Some(CohortDetail { cohort, students }))
    }

    pub async fn create(pool: &PgPool, req: &CreateCohortRequest) -> anyhow::Result<Cohort> {
        let cohort = sqlx::query_as::<_, Cohort>(
            "INSERT INTO cohorts (name, school_id, program_id, tutor_id, level, max_size)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 20))
             RETURNING *",
        )
        .bind(&req.name)
        .bind(req.school_id)
        .bind(req.program_id)
        .bind(req.tutor_id)
        .bind(req.level)
        .bind(req.max_size)
        .fetch_one(pool)
        .await?;
        Ok(cohort)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateCohortRequest,
    ) -> anyhow::Result<Option<Cohort>> {
        let cohort = sqlx::query_as::<_, Cohort>(
            "UPDATE cohorts
             SET name      = COALESCE($1, name),
                 tutor_id  = COALESCE($2, tutor_id),
                 level     = COALESCE($3, level),
                 max_size  = COALESCE($4, max_size),
                 is_active = COALESCE($5, is_active)
             WHERE id = $6
             RETURNING *",
        )
        .bind(&req.name)
        .bind(req.tutor_id)
        .bind(req.level)
        .bind(req.max_size)
        .bind(req.is_active)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(cohort)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        sqlx::query("UPDATE students SET cohort_id = NULL WHERE cohort_id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        let result = sqlx::query("DELETE FROM cohorts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the cohort's membership: detach everyone currently assigned,
    /// then attach the provided students.
    pub async fn set_students(
        pool: &PgPool,
        id: Uuid,
        student_ids: &[Uuid],
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE students SET cohort_id = NULL WHERE cohort_id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if !student_ids.is_empty() {
            sqlx::query("UPDATE students SET cohort_id = $1 WHERE id = ANY($2)")
                .bind(id)
                .bind(student_ids)
                .execute(pool)
                .await?;
        }
        Ok(())
    }

    /// Auto-generation: group the school's active, unassigned students of
    /// the program by current level, chunk each level into bins of at most
    /// max_size, and create one cohort per bin. Tutors are assigned
    /// afterwards by PUT.
    pub async fn generate(
        pool: &PgPool,
        req: &GenerateCohortsRequest,
    ) -> Result<Vec<GeneratedCohort>, ApiError> {
        let program = crate::services::programs::ProgramService::get(pool, req.program_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::NotFound("Program"))?;

        let max_size = req.max_size.unwrap_or(20);
        if max_size < 1 {
            return Err(ApiError::Validation("max_size must be at least 1".into()));
        }

        let students: Vec<(Uuid, i32)> = sqlx::query_as(
            "SELECT id, current_level FROM students
             WHERE school_id = $1 AND program_id = $2
               AND cohort_id IS NULL AND is_active = TRUE AND current_level >= 1
             ORDER BY last_name, first_name",
        )
        .bind(req.school_id)
        .bind(req.program_id)
        .fetch_all(pool)
        .await?;

        let groups = grouping::chunk_by_level(&students, max_size as usize);

        let mut generated = Vec::with_capacity(groups.len());
        let mut seq_per_level = 0;
        let mut last_level = 0;
        for group in groups {
            if group.level != last_level {
                last_level = group.level;
                seq_per_level = 0;
            }
            seq_per_level += 1;
            let name = format!("{} L{} - {}", program.name, group.level, seq_per_level);
            let cohort = Self::create(
                pool,
                &CreateCohortRequest {
                    name,
                    school_id: req.school_id,
                    program_id: req.program_id,
                    tutor_id: None,
                    level: group.level,
                    max_size: Some(max_size),
                },
            )
            .await
            .map_err(ApiError::Internal)?;

            sqlx::query("UPDATE students SET cohort_id = $1 WHERE id = ANY($2)")
                .bind(cohort.id)
                .bind(&group.student_ids)
                .execute(pool)
                .await?;

            generated.push(GeneratedCohort {
                cohort,
                student_count: group.student_ids.len(),
            });
        }
        Ok(generated)
    }

    pub async fn list_attendance(
        pool: &PgPool,
        cohort_id: Uuid,
    ) -> anyhow::Result<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance_records WHERE cohort_id = $1
             ORDER BY session_date DESC, student_id",
        )
        .bind(cohort_id)
        .fetch_all(pool)
        .await?;
        Ok(records)
    }

    /// One upsert per entry keyed on (cohort, student, date) — re-submitting
    /// a session's sheet overwrites the previous marks.
    pub async fn record_attendance(
        pool: &PgPool,
        cohort_id: Uuid,
        req: &RecordAttendanceRequest,
        recorded_by: Option<Uuid>,
    ) -> anyhow::Result<Vec<AttendanceRecord>> {
        let mut records = Vec::with_capacity(req.entries.len());
        for entry in &req.entries {
            let record = sqlx::query_as::<_, AttendanceRecord>(
                "INSERT INTO attendance_records
                     (cohort_id, student_id, session_date, present, remarks, recorded_by)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 ON CONFLICT (cohort_id, student_id, session_date)
                 DO UPDATE SET present = EXCLUDED.present,
                               remarks = EXCLUDED.remarks,
                               recorded_by = EXCLUDED.recorded_by
                 RETURNING *",
            )
            .bind(cohort_id)
            .bind(entry.student_id)
            .bind(req.session_date)
            .bind(entry.present)
            .bind(&entry.remarks)
            .bind(recorded_by)
            .fetch_one(pool)
            .await?;
            records.push(record);
        }
        Ok(records)
    }
}
