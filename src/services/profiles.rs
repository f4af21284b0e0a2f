use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::reports::{self, ProfileReport};
use crate::error::ApiError;
use crate::models::profile::{
    AcademicRecord, AddAcademicRecordRequest, AddBehavioralRecordRequest,
    AddCommunicationLogRequest, AddGoalRequest, AddInterventionRequest, BehavioralRecord,
    CommunicationLog, CreateProfileRequest, Goal, Intervention, InterventionStatus, ProfileDetail,
    ReportType, StudentProfile, UpdateGoalRequest,
};

pub struct ProfileService;

impl ProfileService {
    pub async fn create(
        pool: &PgPool,
        req: &CreateProfileRequest,
    ) -> Result<StudentProfile, ApiError> {
        let student_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)")
                .bind(req.student_id)
                .fetch_one(pool)
                .await?;
        if !student_exists {
            return Err(ApiError::NotFound("Student"));
        }

        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM student_profiles WHERE student_id = $1)",
        )
        .bind(req.student_id)
        .fetch_one(pool)
        .await?;
        if duplicate {
            return Err(ApiError::Validation(
                "A profile already exists for this student".into(),
            ));
        }

        let profile = sqlx::query_as::<_, StudentProfile>(
            "INSERT INTO student_profiles (student_id, notes)
             VALUES ($1, $2)
             RETURNING *",
        )
        .bind(req.student_id)
        .bind(&req.notes)
        .fetch_one(pool)
        .await?;
        Ok(profile)
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<StudentProfile>> {
        let profile =
            sqlx::query_as::<_, StudentProfile>("SELECT * FROM student_profiles WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(profile)
    }

    pub async fn get_by_student(
        pool: &PgPool,
        student_id: Uuid,
    ) -> anyhow::Result<Option<StudentProfile>> {
        let profile = sqlx::query_as::<_, StudentProfile>(
            "SELECT * FROM student_profiles WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_optional(pool)
        .await?;
        Ok(profile)
    }

    pub async fn get_detail(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<ProfileDetail>> {
        let Some(profile) = Self::get(pool, id).await? else {
            return Ok(None);
        };
        let academic_records = sqlx::query_as::<_, AcademicRecord>(
            "SELECT * FROM academic_records WHERE profile_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        let behavioral_records = sqlx::query_as::<_, BehavioralRecord>(
            "SELECT * FROM behavioral_records WHERE profile_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        let interventions = sqlx::query_as::<_, Intervention>(
            "SELECT * FROM interventions WHERE profile_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        let communication_logs = sqlx::query_as::<_, CommunicationLog>(
            "SELECT * FROM communication_logs WHERE profile_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        let goals = sqlx::query_as::<_, Goal>(
            "SELECT * FROM goals WHERE profile_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(Some(ProfileDetail {
            profile,
            academic_records,
            behavioral_records,
            interventions,
            communication_logs,
            goals,
        }))
    }

    pub async fn report(
        pool: &PgPool,
        id: Uuid,
        report_type: ReportType,
    ) -> anyhow::Result<Option<ProfileReport>> {
        let Some(detail) = Self::get_detail(pool, id).await? else {
            return Ok(None);
        };
        Ok(Some(reports::profile_report(detail, report_type, Utc::now())))
    }

    async fn require(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM student_profiles WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        if exists {
            Ok(())
        } else {
            Err(ApiError::NotFound("Profile"))
        }
    }

    pub async fn add_academic_record(
        pool: &PgPool,
        profile_id: Uuid,
        req: &AddAcademicRecordRequest,
    ) -> Result<AcademicRecord, ApiError> {
        Self::require(pool, profile_id).await?;
        let record = sqlx::query_as::<_, AcademicRecord>(
            "INSERT INTO academic_records (profile_id, subject, term, score, max_score, grade, remarks)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(profile_id)
        .bind(&req.subject)
        .bind(&req.term)
        .bind(req.score)
        .bind(req.max_score)
        .bind(&req.grade)
        .bind(&req.remarks)
        .fetch_one(pool)
        .await?;
        Ok(record)
    }

    pub async fn add_behavioral_record(
        pool: &PgPool,
        profile_id: Uuid,
        req: &AddBehavioralRecordRequest,
    ) -> Result<BehavioralRecord, ApiError> {
        Self::require(pool, profile_id).await?;
        let record = sqlx::query_as::<_, BehavioralRecord>(
            "INSERT INTO behavioral_records (profile_id, category, description, action_taken)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(profile_id)
        .bind(req.category.to_string())
        .bind(&req.description)
        .bind(&req.action_taken)
        .fetch_one(pool)
        .await?;
        Ok(record)
    }

    pub async fn add_intervention(
        pool: &PgPool,
        profile_id: Uuid,
        req: &AddInterventionRequest,
    ) -> Result<Intervention, ApiError> {
        Self::require(pool, profile_id).await?;
        let status = req.status.unwrap_or(InterventionStatus::Planned);
        let intervention = sqlx::query_as::<_, Intervention>(
            "INSERT INTO interventions (profile_id, kind, description, status, started_on, ended_on)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(profile_id)
        .bind(&req.kind)
        .bind(&req.description)
        .bind(status.to_string())
        .bind(req.started_on)
        .bind(req.ended_on)
        .fetch_one(pool)
        .await?;
        Ok(intervention)
    }

    pub async fn add_communication_log(
        pool: &PgPool,
        profile_id: Uuid,
        req: &AddCommunicationLogRequest,
    ) -> Result<CommunicationLog, ApiError> {
        Self::require(pool, profile_id).await?;
        let log = sqlx::query_as::<_, CommunicationLog>(
            "INSERT INTO communication_logs (profile_id, channel, contact_person, summary)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(profile_id)
        .bind(req.channel.to_string())
        .bind(&req.contact_person)
        .bind(&req.summary)
        .fetch_one(pool)
        .await?;
        Ok(log)
    }

    pub async fn add_goal(
        pool: &PgPool,
        profile_id: Uuid,
        req: &AddGoalRequest,
    ) -> Result<Goal, ApiError> {
        Self::require(pool, profile_id).await?;
        let goal = sqlx::query_as::<_, Goal>(
            "INSERT INTO goals (profile_id, title, description, target_date)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(profile_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.target_date)
        .fetch_one(pool)
        .await?;
        Ok(goal)
    }

    pub async fn update_goal(
        pool: &PgPool,
        profile_id: Uuid,
        goal_id: Uuid,
        req: &UpdateGoalRequest,
    ) -> Result<Goal, ApiError> {
        let goal = sqlx::query_as::<_, Goal>(
            "UPDATE goals
             SET title       = COALESCE($1, title),
                 description = COALESCE($2, description),
                 status      = COALESCE($3, status),
                 target_date = COALESCE($4, target_date)
             WHERE id = $5 AND profile_id = $6
             RETURNING *",
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.status.map(|s| s.to_string()))
        .bind(req.target_date)
        .bind(goal_id)
        .bind(profile_id)
        .fetch_optional(pool)
        .await?;
        goal.ok_or(ApiError::NotFound("Goal"))
    }
}
