use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;
use crate::models::auth::AuthenticatedUser;
use crate::models::user::UserRole;
use crate::services::users::UserService;
use crate::AppState;

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid Authorization header format"))?;

        let verified = state
            .identity
            .verify_id_token(token)
            .await
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token"))?;

        let user = UserService::find_by_auth_uid(&state.db, &verified.uid)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(ApiError::Unauthorized("Unknown or deactivated user"))?;

        Ok(AuthenticatedUser {
            user_id: user.id,
            auth_uid: user.auth_uid,
            email: user.email,
            role: user.role.parse().unwrap_or(UserRole::ViewUser),
            school_id: user.school_id,
        })
    }
}

/// Writes to core records: admin and program_manager only.
pub fn require_manage(user: &AuthenticatedUser) -> Result<(), ApiError> {
    if user.role.can_manage() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Insufficient permissions"))
    }
}

/// Attendance and assessment recording: tutors are allowed too.
pub fn require_record(user: &AuthenticatedUser) -> Result<(), ApiError> {
    if user.role.can_record() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Insufficient permissions"))
    }
}

pub fn require_admin(user: &AuthenticatedUser) -> Result<(), ApiError> {
    if user.role == UserRole::Admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Admin access required"))
    }
}
