use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Enrolled student. `current_level` is 0 until a baseline assessment
/// places them; `cohort_id` is set when the student is assigned to a batch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub school_id: Uuid,
    pub program_id: Option<Uuid>,
    pub cohort_id: Option<Uuid>,
    pub current_level: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Baseline,
    Level,
}

impl std::fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AssessmentKind::Baseline => "baseline",
            AssessmentKind::Level => "level",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AssessmentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baseline" => Ok(AssessmentKind::Baseline),
            "level" => Ok(AssessmentKind::Level),
            _ => Err(anyhow::anyhow!("Unknown assessment kind: {s}")),
        }
    }
}

/// One scored assessment. `level` is the placement result for baselines
/// and the tested level for level assessments; `promoted` records whether
/// the student's level changed as a result.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assessment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub program_id: Uuid,
    pub kind: String,
    pub level: i32,
    pub score: i32,
    pub max_score: i32,
    pub percent: i32,
    pub promoted: bool,
    pub conducted_by: Option<Uuid>,
    pub conducted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub school_id: Uuid,
    pub program_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub school_id: Option<Uuid>,
    pub program_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct RecordAssessmentRequest {
    pub kind: AssessmentKind,
    pub score: i32,
    pub max_score: i32,
    pub conducted_at: Option<DateTime<Utc>>,
}
