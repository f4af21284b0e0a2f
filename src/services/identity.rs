use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use sqlx::PgPool;

use crate::models::auth::{Claims, VerifiedToken};

/// External identity service, kept opaque behind the contract the rest of
/// the app needs: create an account, sign in, verify a bearer token, and
/// delete an account (used by the registration rollback).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_user(&self, email: &str, password: &str) -> anyhow::Result<String>;
    async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<String>;
    async fn verify_id_token(&self, token: &str) -> anyhow::Result<VerifiedToken>;
    async fn delete_user(&self, uid: &str) -> anyhow::Result<()>;
}

pub fn issue_token(
    uid: &str,
    email: &str,
    secret: &str,
    expiry_seconds: u64,
) -> anyhow::Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: uid.to_string(),
        email: email.to_string(),
        iat: now,
        exp: now + expiry_seconds as i64,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify_token(token: &str, secret: &str) -> anyhow::Result<VerifiedToken> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation)?;
    Ok(VerifiedToken {
        uid: data.claims.sub,
        email: data.claims.email,
    })
}

fn new_uid() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(28)
        .map(char::from)
        .collect()
}

/// Credential store backed by the `auth_accounts` table: bcrypt-hashed
/// passwords, HS256 bearer tokens.
pub struct LocalIdentityProvider {
    pool: PgPool,
    jwt_secret: String,
    token_expiry_seconds: u64,
}

impl LocalIdentityProvider {
    pub fn new(pool: PgPool, jwt_secret: String, token_expiry_seconds: u64) -> Self {
        Self {
            pool,
            jwt_secret,
            token_expiry_seconds,
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn create_user(&self, email: &str, password: &str) -> anyhow::Result<String> {
        let uid = new_uid();
        let hash = bcrypt::hash(password, 12)?;
        sqlx::query(
            "INSERT INTO auth_accounts (uid, email, password_hash) VALUES ($1, $2, $3)",
        )
        .bind(&uid)
        .bind(email)
        .bind(&hash)
        .execute(&self.pool)
        .await?;
        Ok(uid)
    }

    async fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<String> {
        let account: Option<(String, String)> = sqlx::query_as(
            "SELECT uid, password_hash FROM auth_accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let (uid, hash) = account.ok_or_else(|| anyhow::anyhow!("Invalid credentials"))?;
        let valid = bcrypt::verify(password, &hash)
            .map_err(|_| anyhow::anyhow!("Invalid credentials"))?;
        if !valid {
            anyhow::bail!("Invalid credentials");
        }
        issue_token(&uid, email, &self.jwt_secret, self.token_expiry_seconds)
    }

    async fn verify_id_token(&self, token: &str) -> anyhow::Result<VerifiedToken> {
        verify_token(token, &self.jwt_secret)
    }

    async fn delete_user(&self, uid: &str) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM auth_accounts WHERE uid = $1")
            .bind(uid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips() {
        let token = issue_token("uid-123", "a@b.c", "secret", 3600).unwrap();
        let verified = verify_token(&token, "secret").unwrap();
        assert_eq!(verified.uid, "uid-123");
        assert_eq!(verified.email, "a@b.c");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("uid-123", "a@b.c", "secret", 3600).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "uid-123".into(),
            email: "a@b.c".into(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(verify_token(&token, "secret").is_err());
    }

    #[test]
    fn uids_are_distinct() {
        let a = new_uid();
        let b = new_uid();
        assert_eq!(a.len(), 28);
        assert_ne!(a, b);
    }
}
