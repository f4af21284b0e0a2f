use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::progress::{self, TaskProgress};
use crate::domain::reports::{self, OnboardingReport};
use crate::domain::workflow::{self, WorkItem};
use crate::error::ApiError;
use crate::models::onboarding::{
    AddCommentRequest, CompleteMilestoneRequest, CompleteTaskRequest, CreateMilestoneRequest,
    CreateOnboardingRequest, CreateTaskRequest, CreateTicketRequest, CreateTrainingSessionRequest,
    MilestoneSignOff, OnboardingDetail, OnboardingMilestone, OnboardingPhase, OnboardingTask,
    PhaseProgressEntry, SchoolOnboarding, SupportTicket, TaskComment, TaskStatus, TicketStatus,
    TrainingSession, UpdateMilestoneRequest, UpdateOnboardingRequest, UpdateTaskRequest,
    UpdateTicketRequest,
};

pub struct OnboardingService;

impl OnboardingService {
    pub async fn list(pool: &PgPool) -> anyhow::Result<Vec<SchoolOnboarding>> {
        let onboardings = sqlx::query_as::<_, SchoolOnboarding>(
            "SELECT * FROM school_onboardings ORDER BY created_at DESC",
        )
        .fetch_all(pool)
        .await?;
        Ok(onboardings)
    }

    pub async fn create(
        pool: &PgPool,
        req: &CreateOnboardingRequest,
    ) -> Result<SchoolOnboarding, ApiError> {
        let school_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM schools WHERE id = $1)")
                .bind(req.school_id)
                .fetch_one(pool)
                .await?;
        if !school_exists {
            return Err(ApiError::NotFound("School"));
        }

        let duplicate: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM school_onboardings WHERE school_id = $1)",
        )
        .bind(req.school_id)
        .fetch_one(pool)
        .await?;
        if duplicate {
            return Err(ApiError::Validation(
                "An onboarding already exists for this school".into(),
            ));
        }

        let onboarding = sqlx::query_as::<_, SchoolOnboarding>(
            "INSERT INTO school_onboardings (school_id, coordinator_id, target_launch_date, notes)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(req.school_id)
        .bind(req.coordinator_id)
        .bind(req.target_launch_date)
        .bind(&req.notes)
        .fetch_one(pool)
        .await?;
        Ok(onboarding)
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<SchoolOnboarding>> {
        let onboarding =
            sqlx::query_as::<_, SchoolOnboarding>("SELECT * FROM school_onboardings WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(onboarding)
    }

    pub async fn get_detail(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<OnboardingDetail>> {
        let Some(onboarding) = Self::get(pool, id).await? else {
            return Ok(None);
        };
        let phase_progress = sqlx::query_as::<_, PhaseProgressEntry>(
            "SELECT phase, progress, status FROM onboarding_phase_progress
             WHERE onboarding_id = $1",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        let tasks = sqlx::query_as::<_, OnboardingTask>(
            "SELECT * FROM onboarding_tasks WHERE onboarding_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        let milestones = sqlx::query_as::<_, OnboardingMilestone>(
            "SELECT * FROM onboarding_milestones WHERE onboarding_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        let training_sessions = sqlx::query_as::<_, TrainingSession>(
            "SELECT * FROM training_sessions WHERE onboarding_id = $1 ORDER BY session_date",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;
        let support_tickets = sqlx::query_as::<_, SupportTicket>(
            "SELECT * FROM support_tickets WHERE onboarding_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        // Phase rows come back in fixed workflow order, matching the roll-up.
        let mut phase_progress = phase_progress;
        phase_progress.sort_by_key(|e| {
            OnboardingPhase::ALL
                .iter()
                .position(|p| p.to_string() == e.phase)
                .unwrap_or(usize::MAX)
        });

        Ok(Some(OnboardingDetail {
            onboarding,
            phase_progress,
            tasks,
            milestones,
            training_sessions,
            support_tickets,
        }))
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateOnboardingRequest,
    ) -> anyhow::Result<Option<SchoolOnboarding>> {
        let onboarding = sqlx::query_as::<_, SchoolOnboarding>(
            "UPDATE school_onboardings
             SET coordinator_id     = COALESCE($1, coordinator_id),
                 status             = COALESCE($2, status),
                 target_launch_date = COALESCE($3, target_launch_date),
                 actual_launch_date = COALESCE($4, actual_launch_date),
                 notes              = COALESCE($5, notes)
             WHERE id = $6
             RETURNING *",
        )
        .bind(req.coordinator_id)
        .bind(req.status.map(|s| s.to_string()))
        .bind(req.target_launch_date)
        .bind(req.actual_launch_date)
        .bind(&req.notes)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(onboarding)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM school_onboardings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn report(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<OnboardingReport>> {
        let Some(detail) = Self::get_detail(pool, id).await? else {
            return Ok(None);
        };
        Ok(Some(reports::onboarding_report(detail, Utc::now())))
    }

    /// Recompute and persist the derived fields after any task mutation:
    /// overall progress, per-phase rows, and current_phase.
    async fn roll_up(pool: &PgPool, onboarding_id: Uuid) -> Result<(), ApiError> {
        let rows: Vec<(String, String, i32)> = sqlx::query_as(
            "SELECT phase, status, completion_percentage FROM onboarding_tasks
             WHERE onboarding_id = $1",
        )
        .bind(onboarding_id)
        .fetch_all(pool)
        .await?;

        let tasks: Vec<TaskProgress> = rows
            .iter()
            .filter_map(|(phase, status, pct)| {
                Some(TaskProgress {
                    phase: phase.parse().ok()?,
                    status: status.parse().ok()?,
                    completion_percentage: *pct,
                })
            })
            .collect();

        let overall = progress::overall_progress(&tasks);
        let entries = progress::phase_progress(&tasks);

        let previous: String =
            sqlx::query_scalar("SELECT current_phase FROM school_onboardings WHERE id = $1")
                .bind(onboarding_id)
                .fetch_one(pool)
                .await?;
        let previous_phase = previous
            .parse()
            .unwrap_or(OnboardingPhase::InitialSetup);
        let current = progress::current_phase(&entries, previous_phase);

        sqlx::query(
            "UPDATE school_onboardings SET overall_progress = $1, current_phase = $2 WHERE id = $3",
        )
        .bind(overall)
        .bind(current.to_string())
        .bind(onboarding_id)
        .execute(pool)
        .await?;

        sqlx::query("DELETE FROM onboarding_phase_progress WHERE onboarding_id = $1")
            .bind(onboarding_id)
            .execute(pool)
            .await?;
        for entry in &entries {
            sqlx::query(
                "INSERT INTO onboarding_phase_progress (onboarding_id, phase, progress, status)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(onboarding_id)
            .bind(entry.phase.to_string())
            .bind(entry.progress)
            .bind(entry.status.to_string())
            .execute(pool)
            .await?;
        }
        Ok(())
    }

    // ── Tasks ────────────────────────────────────────────────────────────

    pub async fn create_task(
        pool: &PgPool,
        onboarding_id: Uuid,
        req: &CreateTaskRequest,
    ) -> Result<OnboardingTask, ApiError> {
        Self::get(pool, onboarding_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::NotFound("Onboarding"))?;

        let task = sqlx::query_as::<_, OnboardingTask>(
            "INSERT INTO onboarding_tasks
                 (onboarding_id, title, description, phase, priority, due_date, assigned_to, blockers)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'medium'), $6, $7, COALESCE($8, '{}'))
             RETURNING *",
        )
        .bind(onboarding_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.phase.to_string())
        .bind(req.priority.map(|p| p.to_string()))
        .bind(req.due_date)
        .bind(req.assigned_to)
        .bind(&req.blockers)
        .fetch_one(pool)
        .await?;

        Self::roll_up(pool, onboarding_id).await?;
        Ok(task)
    }

    async fn load_task(
        pool: &PgPool,
        onboarding_id: Uuid,
        task_id: Uuid,
    ) -> Result<OnboardingTask, ApiError> {
        let task = sqlx::query_as::<_, OnboardingTask>(
            "SELECT * FROM onboarding_tasks WHERE id = $1 AND onboarding_id = $2",
        )
        .bind(task_id)
        .bind(onboarding_id)
        .fetch_optional(pool)
        .await?;
        task.ok_or(ApiError::NotFound("Task"))
    }

    pub async fn update_task(
        pool: &PgPool,
        onboarding_id: Uuid,
        task_id: Uuid,
        req: &UpdateTaskRequest,
    ) -> Result<OnboardingTask, ApiError> {
        let task = Self::load_task(pool, onboarding_id, task_id).await?;

        if let Some(pct) = req.completion_percentage {
            if !(0..=100).contains(&pct) {
                return Err(ApiError::Validation(
                    "completion_percentage must be between 0 and 100".into(),
                ));
            }
        }

        // Status changes go through the workflow rules; an illegal jump is a
        // 400 and leaves the row untouched.
        let mut item = WorkItem {
            status: task.status.parse().unwrap_or(TaskStatus::Pending),
            completion_percentage: task.completion_percentage,
            completed_date: task.completed_date,
        };
        if let Some(to) = req.status {
            workflow::apply_status(&mut item, to, Utc::now())
                .map_err(|e| ApiError::Validation(e.to_string()))?;
        }
        // An explicit percentage wins unless the workflow just forced 100.
        if let Some(pct) = req.completion_percentage {
            if item.status != TaskStatus::Completed {
                item.completion_percentage = pct;
            }
        }

        let task = sqlx::query_as::<_, OnboardingTask>(
            "UPDATE onboarding_tasks
             SET title                 = COALESCE($1, title),
                 description           = COALESCE($2, description),
                 phase                 = COALESCE($3, phase),
                 priority              = COALESCE($4, priority),
                 status                = $5,
                 completion_percentage = $6,
                 completed_date        = $7,
                 due_date              = COALESCE($8, due_date),
                 assigned_to           = COALESCE($9, assigned_to),
                 blockers              = COALESCE($10, blockers)
             WHERE id = $11
             RETURNING *",
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.phase.map(|p| p.to_string()))
        .bind(req.priority.map(|p| p.to_string()))
        .bind(item.status.to_string())
        .bind(item.completion_percentage)
        .bind(item.completed_date)
        .bind(req.due_date)
        .bind(req.assigned_to)
        .bind(&req.blockers)
        .bind(task_id)
        .fetch_one(pool)
        .await?;

        Self::roll_up(pool, onboarding_id).await?;
        Ok(task)
    }

    /// Force-complete a task. Idempotent: re-completing an already-completed
    /// task changes nothing and appends no evidence.
    pub async fn complete_task(
        pool: &PgPool,
        onboarding_id: Uuid,
        task_id: Uuid,
        req: &CompleteTaskRequest,
        author_id: Option<Uuid>,
    ) -> Result<OnboardingTask, ApiError> {
        let task = Self::load_task(pool, onboarding_id, task_id).await?;

        let mut item = WorkItem {
            status: task.status.parse().unwrap_or(TaskStatus::Pending),
            completion_percentage: task.completion_percentage,
            completed_date: task.completed_date,
        };
        if !workflow::complete(&mut item, Utc::now()) {
            return Ok(task);
        }

        let task = sqlx::query_as::<_, OnboardingTask>(
            "UPDATE onboarding_tasks
             SET status = $1, completion_percentage = $2, completed_date = $3
             WHERE id = $4
             RETURNING *",
        )
        .bind(item.status.to_string())
        .bind(item.completion_percentage)
        .bind(item.completed_date)
        .bind(task_id)
        .fetch_one(pool)
        .await?;

        if let Some(comment) = &req.comment {
            sqlx::query("INSERT INTO task_comments (task_id, author_id, body) VALUES ($1, $2, $3)")
                .bind(task_id)
                .bind(author_id)
                .bind(comment)
                .execute(pool)
                .await?;
        }

        Self::roll_up(pool, onboarding_id).await?;
        Ok(task)
    }

    pub async fn add_comment(
        pool: &PgPool,
        onboarding_id: Uuid,
        task_id: Uuid,
        req: &AddCommentRequest,
        author_id: Option<Uuid>,
    ) -> Result<TaskComment, ApiError> {
        Self::load_task(pool, onboarding_id, task_id).await?;
        let comment = sqlx::query_as::<_, TaskComment>(
            "INSERT INTO task_comments (task_id, author_id, body)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(task_id)
        .bind(author_id)
        .bind(&req.body)
        .fetch_one(pool)
        .await?;
        Ok(comment)
    }

    pub async fn list_comments(
        pool: &PgPool,
        onboarding_id: Uuid,
        task_id: Uuid,
    ) -> Result<Vec<TaskComment>, ApiError> {
        Self::load_task(pool, onboarding_id, task_id).await?;
        let comments = sqlx::query_as::<_, TaskComment>(
            "SELECT * FROM task_comments WHERE task_id = $1 ORDER BY created_at",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;
        Ok(comments)
    }

    pub async fn delete_task(
        pool: &PgPool,
        onboarding_id: Uuid,
        task_id: Uuid,
    ) -> Result<(), ApiError> {
        let result =
            sqlx::query("DELETE FROM onboarding_tasks WHERE id = $1 AND onboarding_id = $2")
                .bind(task_id)
                .bind(onboarding_id)
                .execute(pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Task"));
        }
        Self::roll_up(pool, onboarding_id).await?;
        Ok(())
    }

    // ── Milestones ───────────────────────────────────────────────────────

    pub async fn create_milestone(
        pool: &PgPool,
        onboarding_id: Uuid,
        req: &CreateMilestoneRequest,
    ) -> Result<OnboardingMilestone, ApiError> {
        Self::get(pool, onboarding_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::NotFound("Onboarding"))?;

        let milestone = sqlx::query_as::<_, OnboardingMilestone>(
            "INSERT INTO onboarding_milestones
                 (onboarding_id, title, description, phase, target_date, sign_off_required)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, FALSE))
             RETURNING *",
        )
        .bind(onboarding_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.phase.to_string())
        .bind(req.target_date)
        .bind(req.sign_off_required)
        .fetch_one(pool)
        .await?;
        Ok(milestone)
    }

    async fn load_milestone(
        pool: &PgPool,
        onboarding_id: Uuid,
        milestone_id: Uuid,
    ) -> Result<OnboardingMilestone, ApiError> {
        let milestone = sqlx::query_as::<_, OnboardingMilestone>(
            "SELECT * FROM onboarding_milestones WHERE id = $1 AND onboarding_id = $2",
        )
        .bind(milestone_id)
        .bind(onboarding_id)
        .fetch_optional(pool)
        .await?;
        milestone.ok_or(ApiError::NotFound("Milestone"))
    }

    pub async fn update_milestone(
        pool: &PgPool,
        onboarding_id: Uuid,
        milestone_id: Uuid,
        req: &UpdateMilestoneRequest,
    ) -> Result<OnboardingMilestone, ApiError> {
        let milestone = Self::load_milestone(pool, onboarding_id, milestone_id).await?;

        let mut item = WorkItem {
            status: milestone.status.parse().unwrap_or(TaskStatus::Pending),
            completion_percentage: 0,
            completed_date: milestone.completed_date,
        };
        if let Some(to) = req.status {
            workflow::apply_status(&mut item, to, Utc::now())
                .map_err(|e| ApiError::Validation(e.to_string()))?;
        }

        let milestone = sqlx::query_as::<_, OnboardingMilestone>(
            "UPDATE onboarding_milestones
             SET title             = COALESCE($1, title),
                 description       = COALESCE($2, description),
                 phase             = COALESCE($3, phase),
                 status            = $4,
                 completed_date    = $5,
                 target_date       = COALESCE($6, target_date),
                 sign_off_required = COALESCE($7, sign_off_required)
             WHERE id = $8
             RETURNING *",
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.phase.map(|p| p.to_string()))
        .bind(item.status.to_string())
        .bind(item.completed_date)
        .bind(req.target_date)
        .bind(req.sign_off_required)
        .bind(milestone_id)
        .fetch_one(pool)
        .await?;
        Ok(milestone)
    }

    /// Force-complete a milestone, appending a sign-off entry when a signer
    /// is supplied. Completion without a sign-off stays allowed even when
    /// the milestone requires one; that case is only surfaced in the log.
    pub async fn complete_milestone(
        pool: &PgPool,
        onboarding_id: Uuid,
        milestone_id: Uuid,
        req: &CompleteMilestoneRequest,
    ) -> Result<OnboardingMilestone, ApiError> {
        let milestone = Self::load_milestone(pool, onboarding_id, milestone_id).await?;

        let mut item = WorkItem {
            status: milestone.status.parse().unwrap_or(TaskStatus::Pending),
            completion_percentage: 0,
            completed_date: milestone.completed_date,
        };
        if !workflow::complete(&mut item, Utc::now()) {
            return Ok(milestone);
        }

        if milestone.sign_off_required && req.signed_by.is_none() {
            tracing::warn!(
                "milestone {milestone_id} completed without sign-off despite sign_off_required"
            );
        }

        let milestone = sqlx::query_as::<_, OnboardingMilestone>(
            "UPDATE onboarding_milestones
             SET status = $1, completed_date = $2
             WHERE id = $3
             RETURNING *",
        )
        .bind(item.status.to_string())
        .bind(item.completed_date)
        .bind(milestone_id)
        .fetch_one(pool)
        .await?;

        if let Some(signed_by) = req.signed_by {
            sqlx::query(
                "INSERT INTO milestone_sign_offs (milestone_id, signed_by, note)
                 VALUES ($1, $2, $3)",
            )
            .bind(milestone_id)
            .bind(signed_by)
            .bind(&req.note)
            .execute(pool)
            .await?;
        }
        Ok(milestone)
    }

    pub async fn list_sign_offs(
        pool: &PgPool,
        onboarding_id: Uuid,
        milestone_id: Uuid,
    ) -> Result<Vec<MilestoneSignOff>, ApiError> {
        Self::load_milestone(pool, onboarding_id, milestone_id).await?;
        let sign_offs = sqlx::query_as::<_, MilestoneSignOff>(
            "SELECT * FROM milestone_sign_offs WHERE milestone_id = $1 ORDER BY signed_at",
        )
        .bind(milestone_id)
        .fetch_all(pool)
        .await?;
        Ok(sign_offs)
    }

    // ── Training sessions & support tickets ──────────────────────────────

    pub async fn add_training_session(
        pool: &PgPool,
        onboarding_id: Uuid,
        req: &CreateTrainingSessionRequest,
    ) -> Result<TrainingSession, ApiError> {
        Self::get(pool, onboarding_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::NotFound("Onboarding"))?;

        let session = sqlx::query_as::<_, TrainingSession>(
            "INSERT INTO training_sessions
                 (onboarding_id, title, session_date, trainer, audience, attendee_count, notes)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0), $7)
             RETURNING *",
        )
        .bind(onboarding_id)
        .bind(&req.title)
        .bind(req.session_date)
        .bind(&req.trainer)
        .bind(&req.audience)
        .bind(req.attendee_count)
        .bind(&req.notes)
        .fetch_one(pool)
        .await?;
        Ok(session)
    }

    pub async fn add_ticket(
        pool: &PgPool,
        onboarding_id: Uuid,
        req: &CreateTicketRequest,
    ) -> Result<SupportTicket, ApiError> {
        Self::get(pool, onboarding_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::NotFound("Onboarding"))?;

        let ticket = sqlx::query_as::<_, SupportTicket>(
            "INSERT INTO support_tickets (onboarding_id, subject, description, severity)
             VALUES ($1, $2, $3, COALESCE($4, 'medium'))
             RETURNING *",
        )
        .bind(onboarding_id)
        .bind(&req.subject)
        .bind(&req.description)
        .bind(req.severity.map(|s| s.to_string()))
        .fetch_one(pool)
        .await?;
        Ok(ticket)
    }

    pub async fn update_ticket(
        pool: &PgPool,
        onboarding_id: Uuid,
        ticket_id: Uuid,
        req: &UpdateTicketRequest,
    ) -> Result<SupportTicket, ApiError> {
        let resolved_at = match req.status {
            Some(TicketStatus::Resolved) => Some(Utc::now()),
            _ => None,
        };
        let ticket = sqlx::query_as::<_, SupportTicket>(
            "UPDATE support_tickets
             SET subject     = COALESCE($1, subject),
                 description = COALESCE($2, description),
                 severity    = COALESCE($3, severity),
                 status      = COALESCE($4, status),
                 resolved_at = COALESCE($5, resolved_at)
             WHERE id = $6 AND onboarding_id = $7
             RETURNING *",
        )
        .bind(&req.subject)
        .bind(&req.description)
        .bind(req.severity.map(|s| s.to_string()))
        .bind(req.status.map(|s| s.to_string()))
        .bind(resolved_at)
        .bind(ticket_id)
        .bind(onboarding_id)
        .fetch_optional(pool)
        .await?;
        ticket.ok_or(ApiError::NotFound("Ticket"))
    }
}
