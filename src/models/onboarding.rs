use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Onboarding phases in their fixed workflow order. The order matters:
/// `current_phase` selection walks this list front to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingPhase {
    InitialSetup,
    Documentation,
    TeacherTraining,
    InfrastructureSetup,
    PilotTesting,
    FullLaunch,
    PostLaunchSupport,
}

impl OnboardingPhase {
    pub const ALL: [OnboardingPhase; 7] = [
        OnboardingPhase::InitialSetup,
        OnboardingPhase::Documentation,
        OnboardingPhase::TeacherTraining,
        OnboardingPhase::InfrastructureSetup,
        OnboardingPhase::PilotTesting,
        OnboardingPhase::FullLaunch,
        OnboardingPhase::PostLaunchSupport,
    ];
}

impl std::fmt::Display for OnboardingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OnboardingPhase::InitialSetup => "initial_setup",
            OnboardingPhase::Documentation => "documentation",
            OnboardingPhase::TeacherTraining => "teacher_training",
            OnboardingPhase::InfrastructureSetup => "infrastructure_setup",
            OnboardingPhase::PilotTesting => "pilot_testing",
            OnboardingPhase::FullLaunch => "full_launch",
            OnboardingPhase::PostLaunchSupport => "post_launch_support",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OnboardingPhase {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial_setup" => Ok(OnboardingPhase::InitialSetup),
            "documentation" => Ok(OnboardingPhase::Documentation),
            "teacher_training" => Ok(OnboardingPhase::TeacherTraining),
            "infrastructure_setup" => Ok(OnboardingPhase::InfrastructureSetup),
            "pilot_testing" => Ok(OnboardingPhase::PilotTesting),
            "full_launch" => Ok(OnboardingPhase::FullLaunch),
            "post_launch_support" => Ok(OnboardingPhase::PostLaunchSupport),
            _ => Err(anyhow::anyhow!("Unknown onboarding phase: {s}")),
        }
    }
}

/// Task and milestone workflow states. `skipped` and `blocked` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Skipped,
    Blocked,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Skipped | TaskStatus::Blocked
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Blocked => "blocked",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "skipped" => Ok(TaskStatus::Skipped),
            "blocked" => Ok(TaskStatus::Blocked),
            _ => Err(anyhow::anyhow!("Unknown task status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            "critical" => Ok(TaskPriority::Critical),
            _ => Err(anyhow::anyhow!("Unknown task priority: {s}")),
        }
    }
}

/// Status of one phase's rolled-up progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    InProgress,
    Completed,
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PhaseStatus::Pending => "pending",
            PhaseStatus::InProgress => "in_progress",
            PhaseStatus::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketSeverity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for TicketSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TicketSeverity::Low => "low",
            TicketSeverity::Medium => "medium",
            TicketSeverity::High => "high",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "in_progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            _ => Err(anyhow::anyhow!("Unknown ticket status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    NotStarted,
    InProgress,
    Completed,
    OnHold,
}

impl std::fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OnboardingStatus::NotStarted => "not_started",
            OnboardingStatus::InProgress => "in_progress",
            OnboardingStatus::Completed => "completed",
            OnboardingStatus::OnHold => "on_hold",
        };
        write!(f, "{s}")
    }
}

/// Aggregate root row. `overall_progress` and `current_phase` are derived
/// and rewritten after every task mutation; enum-valued columns are TEXT.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SchoolOnboarding {
    pub id: Uuid,
    pub school_id: Uuid,
    pub coordinator_id: Option<Uuid>,
    pub status: String,
    pub current_phase: String,
    pub overall_progress: i32,
    pub target_launch_date: Option<NaiveDate>,
    pub actual_launch_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored per-phase roll-up. Only phases that have tasks get a row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PhaseProgressEntry {
    pub phase: String,
    pub progress: i32,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OnboardingTask {
    pub id: Uuid,
    pub onboarding_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub phase: String,
    pub priority: String,
    pub status: String,
    pub completion_percentage: i32,
    pub due_date: Option<NaiveDate>,
    pub completed_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub blockers: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskComment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub author_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OnboardingMilestone {
    pub id: Uuid,
    pub onboarding_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub phase: String,
    pub status: String,
    pub target_date: Option<NaiveDate>,
    pub completed_date: Option<DateTime<Utc>>,
    pub sign_off_required: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MilestoneSignOff {
    pub id: Uuid,
    pub milestone_id: Uuid,
    pub signed_by: Uuid,
    pub note: Option<String>,
    pub signed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainingSession {
    pub id: Uuid,
    pub onboarding_id: Uuid,
    pub title: String,
    pub session_date: NaiveDate,
    pub trainer: Option<String>,
    pub audience: Option<String>,
    pub attendee_count: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SupportTicket {
    pub id: Uuid,
    pub onboarding_id: Uuid,
    pub subject: String,
    pub description: Option<String>,
    pub severity: String,
    pub status: String,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full aggregate returned by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct OnboardingDetail {
    #[serde(flatten)]
    pub onboarding: SchoolOnboarding,
    pub phase_progress: Vec<PhaseProgressEntry>,
    pub tasks: Vec<OnboardingTask>,
    pub milestones: Vec<OnboardingMilestone>,
    pub training_sessions: Vec<TrainingSession>,
    pub support_tickets: Vec<SupportTicket>,
}

// Request DTOs
#[derive(Debug, Deserialize)]
pub struct CreateOnboardingRequest {
    pub school_id: Uuid,
    pub coordinator_id: Option<Uuid>,
    pub target_launch_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOnboardingRequest {
    pub coordinator_id: Option<Uuid>,
    pub status: Option<OnboardingStatus>,
    pub target_launch_date: Option<NaiveDate>,
    pub actual_launch_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub phase: OnboardingPhase,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
    pub blockers: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub phase: Option<OnboardingPhase>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub completion_percentage: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
    pub blockers: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteTaskRequest {
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateMilestoneRequest {
    pub title: String,
    pub description: Option<String>,
    pub phase: OnboardingPhase,
    pub target_date: Option<NaiveDate>,
    pub sign_off_required: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMilestoneRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub phase: Option<OnboardingPhase>,
    pub status: Option<TaskStatus>,
    pub target_date: Option<NaiveDate>,
    pub sign_off_required: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteMilestoneRequest {
    pub signed_by: Option<Uuid>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTrainingSessionRequest {
    pub title: String,
    pub session_date: NaiveDate,
    pub trainer: Option<String>,
    pub audience: Option<String>,
    pub attendee_count: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub subject: String,
    pub description: Option<String>,
    pub severity: Option<TicketSeverity>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub severity: Option<TicketSeverity>,
    pub status: Option<TicketStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_order_is_stable() {
        let names: Vec<String> = OnboardingPhase::ALL.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "initial_setup",
                "documentation",
                "teacher_training",
                "infrastructure_setup",
                "pilot_testing",
                "full_launch",
                "post_launch_support",
            ]
        );
    }

    #[test]
    fn task_status_terminality() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Skipped.is_terminal());
        assert!(TaskStatus::Blocked.is_terminal());
    }
}
