use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Public volunteer sign-up. `status` is TEXT:
/// new | contacted | onboarded | declined.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VolunteerRequest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub pincode: String,
    pub interest_area: Option<String>,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unauthenticated submission. Every field is optional at the serde layer
/// so the handler can report ALL missing required fields in one 400 instead
/// of failing on the first.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitVolunteerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub interest_area: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVolunteerRequest {
    pub status: Option<String>,
    pub interest_area: Option<String>,
    pub message: Option<String>,
}
