use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::placement;
use crate::error::ApiError;
use crate::models::student::{
    Assessment, AssessmentKind, CreateStudentRequest, RecordAssessmentRequest, Student,
    UpdateStudentRequest,
};

pub struct StudentService;

impl StudentService {
    pub async fn list(pool: &PgPool, school_id: Option<Uuid>) -> anyhow::Result<Vec<Student>> {
        let students = match school_id {
            Some(school_id) => {
                sqlx::query_as::<_, Student>(
                    "SELECT * FROM students WHERE school_id = $1 ORDER BY last_name, first_name",
                )
                .bind(school_id)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Student>(
                    "SELECT * FROM students ORDER BY last_name, first_name",
                )
                .fetch_all(pool)
                .await?
            }
        };
        Ok(students)
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(student)
    }

    pub async fn create(pool: &PgPool, req: &CreateStudentRequest) -> anyhow::Result<Student> {
        let student = sqlx::query_as::<_, Student>(
            "INSERT INTO students (first_name, last_name, gender, date_of_birth,
                                   guardian_name, guardian_phone, school_id, program_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.gender)
        .bind(req.date_of_birth)
        .bind(&req.guardian_name)
        .bind(&req.guardian_phone)
        .bind(req.school_id)
        .bind(req.program_id)
        .fetch_one(pool)
        .await?;
        Ok(student)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateStudentRequest,
    ) -> anyhow::Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            "UPDATE students
             SET first_name     = COALESCE($1, first_name),
                 last_name      = COALESCE($2, last_name),
                 gender         = COALESCE($3, gender),
                 date_of_birth  = COALESCE($4, date_of_birth),
                 guardian_name  = COALESCE($5, guardian_name),
                 guardian_phone = COALESCE($6, guardian_phone),
                 school_id      = COALESCE($7, school_id),
                 program_id     = COALESCE($8, program_id),
                 is_active      = COALESCE($9, is_active)
             WHERE id = $10
             RETURNING *",
        )
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.gender)
        .bind(req.date_of_birth)
        .bind(&req.guardian_name)
        .bind(&req.guardian_phone)
        .bind(req.school_id)
        .bind(req.program_id)
        .bind(req.is_active)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(student)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_assessments(pool: &PgPool, student_id: Uuid) -> anyhow::Result<Vec<Assessment>> {
        let assessments = sqlx::query_as::<_, Assessment>(
            "SELECT * FROM assessments WHERE student_id = $1 ORDER BY conducted_at DESC",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await?;
        Ok(assessments)
    }

    /// Records a scored assessment and applies its outcome to the student's
    /// level: baselines place by score band, level assessments advance one
    /// level at the program's pass threshold.
    pub async fn record_assessment(
        pool: &PgPool,
        student_id: Uuid,
        req: &RecordAssessmentRequest,
        conducted_by: Option<Uuid>,
    ) -> Result<Assessment, ApiError> {
        let student = Self::get(pool, student_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::NotFound("Student"))?;

        let program_id = student.program_id.ok_or_else(|| {
            ApiError::Validation("Student is not enrolled in a program".into())
        })?;
        let program = crate::services::programs::ProgramService::get(pool, program_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::NotFound("Program"))?;

        let percent = placement::percent(req.score, req.max_score)
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        if req.kind == AssessmentKind::Level && student.current_level == 0 {
            return Err(ApiError::Validation(
                "Student has no level yet; record a baseline assessment first".into(),
            ));
        }

        let outcome = placement::apply_assessment(
            req.kind,
            percent,
            student.current_level,
            program.level_count,
            program.pass_threshold,
        );

        let conducted_at = req.conducted_at.unwrap_or_else(chrono::Utc::now);
        let assessment = sqlx::query_as::<_, Assessment>(
            "INSERT INTO assessments (student_id, program_id, kind, level, score, max_score,
                                      percent, promoted, conducted_by, conducted_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
        .bind(student_id)
        .bind(program_id)
        .bind(req.kind.to_string())
        .bind(outcome.level)
        .bind(req.score)
        .bind(req.max_score)
        .bind(percent)
        .bind(outcome.promoted)
        .bind(conducted_by)
        .bind(conducted_at)
        .fetch_one(pool)
        .await?;

        if outcome.new_level != student.current_level {
            sqlx::query("UPDATE students SET current_level = $1 WHERE id = $2")
                .bind(outcome.new_level)
                .bind(student_id)
                .execute(pool)
                .await?;
        }

        Ok(assessment)
    }
}
