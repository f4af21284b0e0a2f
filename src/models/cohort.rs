use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::student::Student;

/// Teaching batch: students of one school at one level of a program,
/// synced to a tutor.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cohort {
    pub id: Uuid,
    pub name: String,
    pub school_id: Uuid,
    pub program_id: Uuid,
    pub tutor_id: Option<Uuid>,
    pub level: i32,
    pub max_size: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub cohort_id: Uuid,
    pub student_id: Uuid,
    pub session_date: NaiveDate,
    pub present: bool,
    pub remarks: Option<String>,
    pub recorded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CohortDetail {
    #[serde(flatten)]
    pub cohort: Cohort,
    pub students: Vec<Student>,
}

/// Cohort created by auto-generation, with how many students landed in it.
#[derive(Debug, Serialize)]
pub struct GeneratedCohort {
    #[serde(flatten)]
    pub cohort: Cohort,
    pub student_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateCohortRequest {
    pub name: String,
    pub school_id: Uuid,
    pub program_id: Uuid,
    pub tutor_id: Option<Uuid>,
    pub level: i32,
    pub max_size: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCohortRequest {
    pub name: Option<String>,
    pub tutor_id: Option<Uuid>,
    pub level: Option<i32>,
    pub max_size: Option<i32>,
    pub is_active: Option<bool>,
}

/// Replaces the full membership of a cohort.
#[derive(Debug, Deserialize)]
pub struct SetStudentsRequest {
    pub student_ids: Vec<Uuid>,
}

/// Auto-generation input: active, unassigned students of the school/program
/// are grouped by current level and chunked into cohorts of at most
/// `max_size`.
#[derive(Debug, Deserialize)]
pub struct GenerateCohortsRequest {
    pub school_id: Uuid,
    pub program_id: Uuid,
    pub max_size: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceEntry {
    pub student_id: Uuid,
    pub present: bool,
    pub remarks: Option<String>,
}

/// One session's attendance sheet. Re-submitting the same date overwrites
/// the previous marks.
#[derive(Debug, Deserialize)]
pub struct RecordAttendanceRequest {
    pub session_date: NaiveDate,
    pub entries: Vec<AttendanceEntry>,
}
