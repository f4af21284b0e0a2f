use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Enhanced per-student profile, one-to-one with a Student. The profile
/// itself is a thin anchor; the substance lives in the append-only child
/// collections below.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentProfile {
    pub id: Uuid,
    pub student_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AcademicRecord {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub subject: String,
    pub term: String,
    pub score: i32,
    pub max_score: i32,
    pub grade: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BehavioralRecord {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub category: String,
    pub description: String,
    pub action_taken: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Intervention {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub kind: String,
    pub description: Option<String>,
    pub status: String,
    pub started_on: Option<NaiveDate>,
    pub ended_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommunicationLog {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub channel: String,
    pub contact_person: Option<String>,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub target_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordCategory {
    Positive,
    Concern,
    Incident,
}

impl std::fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecordCategory::Positive => "positive",
            RecordCategory::Concern => "concern",
            RecordCategory::Incident => "incident",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionStatus {
    Planned,
    Ongoing,
    Completed,
    Discontinued,
}

impl std::fmt::Display for InterventionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InterventionStatus::Planned => "planned",
            InterventionStatus::Ongoing => "ongoing",
            InterventionStatus::Completed => "completed",
            InterventionStatus::Discontinued => "discontinued",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationChannel {
    Call,
    Meeting,
    Message,
    HomeVisit,
}

impl std::fmt::Display for CommunicationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CommunicationChannel::Call => "call",
            CommunicationChannel::Meeting => "meeting",
            CommunicationChannel::Message => "message",
            CommunicationChannel::HomeVisit => "home_visit",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    NotStarted,
    InProgress,
    Achieved,
    Abandoned,
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GoalStatus::NotStarted => "not_started",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Achieved => "achieved",
            GoalStatus::Abandoned => "abandoned",
        };
        write!(f, "{s}")
    }
}

/// Report flavor requested via `?type=`. Defaults to comprehensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Comprehensive,
    Academic,
    Behavioral,
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReportType::Comprehensive => "comprehensive",
            ReportType::Academic => "academic",
            ReportType::Behavioral => "behavioral",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ReportType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comprehensive" => Ok(ReportType::Comprehensive),
            "academic" => Ok(ReportType::Academic),
            "behavioral" => Ok(ReportType::Behavioral),
            _ => Err(anyhow::anyhow!("Unknown report type: {s}")),
        }
    }
}

/// Full profile aggregate returned by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct ProfileDetail {
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub academic_records: Vec<AcademicRecord>,
    pub behavioral_records: Vec<BehavioralRecord>,
    pub interventions: Vec<Intervention>,
    pub communication_logs: Vec<CommunicationLog>,
    pub goals: Vec<Goal>,
}

// Request DTOs
#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub student_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddAcademicRecordRequest {
    pub subject: String,
    pub term: String,
    pub score: i32,
    pub max_score: i32,
    pub grade: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddBehavioralRecordRequest {
    pub category: RecordCategory,
    pub description: String,
    pub action_taken: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddInterventionRequest {
    pub kind: String,
    pub description: Option<String>,
    pub status: Option<InterventionStatus>,
    pub started_on: Option<NaiveDate>,
    pub ended_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AddCommunicationLogRequest {
    pub channel: CommunicationChannel,
    pub contact_person: Option<String>,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct AddGoalRequest {
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<GoalStatus>,
    pub target_date: Option<NaiveDate>,
}
