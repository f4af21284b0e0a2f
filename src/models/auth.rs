use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserRole;

/// JWT claims issued by the local identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Identity-provider uid.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Result of verifying a bearer token against the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedToken {
    pub uid: String,
    pub email: String,
}

/// Identity attached to a request after token verification and profile lookup.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub auth_uid: String,
    pub email: String,
    pub role: UserRole,
    pub school_id: Option<Uuid>,
}
