use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{RegisterRequest, UpdateUserRequest, User, UserRole};
use crate::services::identity::IdentityProvider;

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("User already exists")]
    AlreadyExists,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Profile store seam for the registration choreography. Implemented for
/// `PgPool` in production; tests swap in an in-memory stub.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    async fn insert_profile(&self, auth_uid: &str, req: &RegisterRequest) -> anyhow::Result<User>;
}

#[async_trait]
impl UserDirectory for PgPool {
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(self)
                .await?;
        Ok(exists)
    }

    async fn insert_profile(&self, auth_uid: &str, req: &RegisterRequest) -> anyhow::Result<User> {
        let role = req.role.clone().unwrap_or(UserRole::ViewUser);
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (auth_uid, email, display_name, role, phone, school_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(auth_uid)
        .bind(&req.email)
        .bind(&req.display_name)
        .bind(role.to_string())
        .bind(&req.phone)
        .bind(req.school_id)
        .fetch_one(self)
        .await?;
        Ok(user)
    }
}

pub struct UserService;

impl UserService {
    /// Registration choreography. The ordering is deliberate: the duplicate
    /// check runs before any identity account exists, and a profile-save
    /// failure rolls the fresh identity account back (best effort — a failed
    /// rollback is logged, not retried).
    pub async fn register(
        directory: &dyn UserDirectory,
        identity: &dyn IdentityProvider,
        req: &RegisterRequest,
    ) -> Result<User, RegisterError> {
        if directory.email_exists(&req.email).await? {
            return Err(RegisterError::AlreadyExists);
        }

        let uid = identity.create_user(&req.email, &req.password).await?;

        match directory.insert_profile(&uid, req).await {
            Ok(user) => Ok(user),
            Err(e) => {
                if let Err(del_err) = identity.delete_user(&uid).await {
                    tracing::warn!(
                        "profile save failed and identity rollback for uid {uid} also failed: {del_err}"
                    );
                }
                Err(RegisterError::Other(e))
            }
        }
    }

    pub async fn list(pool: &PgPool) -> anyhow::Result<Vec<User>> {
        let users =
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY role, display_name")
                .fetch_all(pool)
                .await?;
        Ok(users)
    }

    pub async fn find_by_auth_uid(pool: &PgPool, auth_uid: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE auth_uid = $1 AND is_active = TRUE",
        )
        .bind(auth_uid)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateUserRequest,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users
             SET display_name = COALESCE($1, display_name),
                 role         = COALESCE($2, role),
                 phone        = COALESCE($3, phone),
                 school_id    = COALESCE($4, school_id),
                 is_active    = COALESCE($5, is_active)
             WHERE id = $6
             RETURNING *",
        )
        .bind(&req.display_name)
        .bind(req.role.as_ref().map(|r| r.to_string()))
        .bind(&req.phone)
        .bind(req.school_id)
        .bind(req.is_active)
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    /// Deletes the profile row and the linked identity account.
    pub async fn delete(
        pool: &PgPool,
        identity: &dyn IdentityProvider,
        id: Uuid,
    ) -> anyhow::Result<Option<()>> {
        let auth_uid: Option<String> =
            sqlx::query_scalar("DELETE FROM users WHERE id = $1 RETURNING auth_uid")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        match auth_uid {
            Some(uid) => {
                identity.delete_user(&uid).await?;
                Ok(Some(()))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    use crate::models::auth::VerifiedToken;

    #[derive(Default)]
    struct StubIdentity {
        created: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl IdentityProvider for StubIdentity {
        async fn create_user(&self, email: &str, _password: &str) -> anyhow::Result<String> {
            let uid = format!("uid-{email}");
            self.created.lock().unwrap().push(uid.clone());
            Ok(uid)
        }

        async fn sign_in(&self, _email: &str, _password: &str) -> anyhow::Result<String> {
            Ok("token".into())
        }

        async fn verify_id_token(&self, _token: &str) -> anyhow::Result<VerifiedToken> {
            anyhow::bail!("not used")
        }

        async fn delete_user(&self, uid: &str) -> anyhow::Result<()> {
            self.deleted.lock().unwrap().push(uid.to_string());
            Ok(())
        }
    }

    struct StubDirectory {
        existing_email: Option<String>,
        insert_fails: bool,
    }

    #[async_trait]
    impl UserDirectory for StubDirectory {
        async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
            Ok(self.existing_email.as_deref() == Some(email))
        }

        async fn insert_profile(
            &self,
            auth_uid: &str,
            req: &RegisterRequest,
        ) -> anyhow::Result<User> {
            if self.insert_fails {
                anyhow::bail!("profile insert failed");
            }
            Ok(User {
                id: Uuid::new_v4(),
                auth_uid: auth_uid.to_string(),
                email: req.email.clone(),
                display_name: req.display_name.clone(),
                role: req
                    .role
                    .clone()
                    .unwrap_or(UserRole::ViewUser)
                    .to_string(),
                phone: req.phone.clone(),
                school_id: req.school_id,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        }
    }

    fn request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: "pw".into(),
            display_name: "Test User".into(),
            role: Some(UserRole::Tutor),
            phone: None,
            school_id: None,
        }
    }

    #[tokio::test]
    async fn register_creates_identity_then_profile() {
        let identity = StubIdentity::default();
        let directory = StubDirectory {
            existing_email: None,
            insert_fails: false,
        };

        let user = UserService::register(&directory, &identity, &request("new@x.org"))
            .await
            .unwrap();
        assert_eq!(user.auth_uid, "uid-new@x.org");
        assert_eq!(identity.created.lock().unwrap().len(), 1);
        assert!(identity.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_never_reaches_the_identity_provider() {
        let identity = StubIdentity::default();
        let directory = StubDirectory {
            existing_email: Some("taken@x.org".into()),
            insert_fails: false,
        };

        let err = UserService::register(&directory, &identity, &request("taken@x.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::AlreadyExists));
        assert_eq!(err.to_string(), "User already exists");
        assert!(identity.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn profile_save_failure_rolls_back_the_identity_account() {
        let identity = StubIdentity::default();
        let directory = StubDirectory {
            existing_email: None,
            insert_fails: true,
        };

        let err = UserService::register(&directory, &identity, &request("doomed@x.org"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterError::Other(_)));

        let created = identity.created.lock().unwrap();
        let deleted = identity.deleted.lock().unwrap();
        assert_eq!(created.as_slice(), ["uid-doomed@x.org"]);
        assert_eq!(deleted.as_slice(), created.as_slice());
    }
}
