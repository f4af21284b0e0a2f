use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    ProgramManager,
    Tutor,
    ViewUser,
}

impl UserRole {
    /// Roles allowed to mutate core records (schools, programs, cohorts,
    /// onboarding, profiles).
    pub fn can_manage(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::ProgramManager)
    }

    /// Roles allowed to record attendance and assessments.
    pub fn can_record(&self) -> bool {
        matches!(
            self,
            UserRole::Admin | UserRole::ProgramManager | UserRole::Tutor
        )
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UserRole::Admin => "admin",
            UserRole::ProgramManager => "program_manager",
            UserRole::Tutor => "tutor",
            UserRole::ViewUser => "view_user",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "program_manager" => Ok(UserRole::ProgramManager),
            "tutor" => Ok(UserRole::Tutor),
            "view_user" => Ok(UserRole::ViewUser),
            _ => Err(anyhow::anyhow!("Unknown role: {s}")),
        }
    }
}

/// DB row struct — role is stored as TEXT and parsed at the edges.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Identity-provider uid this profile is linked to.
    pub auth_uid: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub school_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Request/Response DTOs
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub school_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub school_id: Option<Uuid>,
    pub is_active: bool,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            display_name: u.display_name,
            role: u.role.parse().unwrap_or(UserRole::ViewUser),
            phone: u.phone,
            school_id: u.school_id,
            is_active: u.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub school_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in [
            UserRole::Admin,
            UserRole::ProgramManager,
            UserRole::Tutor,
            UserRole::ViewUser,
        ] {
            let parsed: UserRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn unknown_role_falls_back_to_view_user() {
        let u = User {
            id: Uuid::new_v4(),
            auth_uid: "uid-1".into(),
            email: "a@b.c".into(),
            display_name: "A".into(),
            role: "superuser".into(),
            phone: None,
            school_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let profile = UserProfile::from(u);
        assert_eq!(profile.role, UserRole::ViewUser);
    }
}
