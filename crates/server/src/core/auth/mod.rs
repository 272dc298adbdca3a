//! Authentication Module
//!
//! Handles registration, login and token verification. Passwords are stored as
//! bcrypt hashes; sessions are stateless HS256 JWTs carrying the user id and an
//! absolute expiry, so nothing about a login is written to the database.

pub mod handlers;
pub mod middleware;

use crate::core::error::{Error, Result};
use crate::core::models::User;
use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

/// Claims embedded in every session token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id, decimal
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Auth manager handles all authentication
pub struct AuthManager {
    pool: SqlitePool,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthManager {
    pub fn new(pool: SqlitePool, secret: &str, token_ttl: Duration, bcrypt_cost: u32) -> Self {
        Self {
            pool,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl,
            bcrypt_cost,
        }
    }

    /// Register a new user, returning its id
    pub async fn register(&self, username: &str, password: &str) -> Result<i64> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::InvalidInput(
                "Username and password are required".to_string(),
            ));
        }

        let password = password.to_string();
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash(password, cost)).await??;

        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(&password_hash)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => {
                let user_id = done.last_insert_rowid();
                info!("[Auth] User registered: {} (id {})", username, user_id);
                Ok(user_id)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!("[Auth] Registration rejected, username taken: {}", username);
                Err(Error::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials and issue a session token
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::InvalidInput(
                "Username and password are required".to_string(),
            ));
        }

        let user: Option<User> =
            sqlx::query_as("SELECT id, username, password_hash FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        let Some(user) = user else {
            warn!("[Auth] Failed login attempt for {}", username);
            return Err(Error::InvalidCredentials);
        };

        let password = password.to_string();
        let stored = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify(password, &stored)).await??;

        if !valid {
            warn!("[Auth] Failed login attempt for {}", username);
            return Err(Error::InvalidCredentials);
        }

        let token = self.issue_token(user.id)?;
        info!("[Auth] User logged in: {} (id {})", user.username, user.id);

        Ok(token)
    }

    /// Sign a token for `user_id` that expires after the configured lifetime
    pub fn issue_token(&self, user_id: i64) -> Result<String> {
        self.issue_token_expiring(user_id, Utc::now() + self.token_ttl)
    }

    /// Sign a token for `user_id` with an explicit expiry
    pub fn issue_token_expiring(&self, user_id: i64, expires_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Error::Internal(format!("Token signing failed: {}", e)))
    }

    /// Resolve a token to the user id it was issued for.
    ///
    /// Bad signatures, malformed tokens and expired tokens all fail the same way.
    pub fn verify(&self, token: &str) -> Result<i64> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("[Auth] Token rejected: {}", e);
            Error::InvalidOrExpiredToken
        })?;

        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| Error::InvalidOrExpiredToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store;
    use tempfile::tempdir;

    async fn manager(dir: &std::path::Path) -> AuthManager {
        let url = format!("sqlite://{}", dir.join("auth.sqlite").display());
        let pool = store::connect(&url).await.unwrap();
        AuthManager::new(pool, "test-secret", Duration::hours(4), 4)
    }

    #[tokio::test]
    async fn test_register_then_login_resolves_same_user() {
        let dir = tempdir().unwrap();
        let auth = manager(dir.path()).await;

        let user_id = auth.register("alice", "pw1").await.unwrap();
        let token = auth.login("alice", "pw1").await.unwrap();

        assert_eq!(auth.verify(&token).unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let dir = tempdir().unwrap();
        let auth = manager(dir.path()).await;

        auth.register("alice", "pw1").await.unwrap();
        let err = auth.register("alice", "other").await.unwrap_err();
        assert!(matches!(err, Error::UsernameTaken));

        // First password still works, so the row was not overwritten
        assert!(auth.login("alice", "pw1").await.is_ok());
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = 'alice'")
            .fetch_one(&auth.pool)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_fail_alike() {
        let dir = tempdir().unwrap();
        let auth = manager(dir.path()).await;
        auth.register("alice", "pw1").await.unwrap();

        let wrong_pw = auth.login("alice", "wrongpw").await.unwrap_err();
        let no_user = auth.login("mallory", "pw1").await.unwrap_err();

        assert!(matches!(wrong_pw, Error::InvalidCredentials));
        assert!(matches!(no_user, Error::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), no_user.to_string());
    }

    #[tokio::test]
    async fn test_empty_fields_are_invalid_input() {
        let dir = tempdir().unwrap();
        let auth = manager(dir.path()).await;

        assert!(matches!(
            auth.register("", "pw").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            auth.register("bob", "").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            auth.login("   ", "pw").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_password_is_not_stored_in_plaintext() {
        let dir = tempdir().unwrap();
        let auth = manager(dir.path()).await;
        auth.register("alice", "pw1").await.unwrap();

        let (stored,): (String,) =
            sqlx::query_as("SELECT password_hash FROM users WHERE username = 'alice'")
                .fetch_one(&auth.pool)
                .await
                .unwrap();
        assert_ne!(stored, "pw1");
        assert!(stored.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_expired_and_tampered_tokens_fail_alike() {
        let dir = tempdir().unwrap();
        let auth = manager(dir.path()).await;

        let expired = auth
            .issue_token_expiring(1, Utc::now() - Duration::minutes(5))
            .unwrap();
        let other = AuthManager::new(auth.pool.clone(), "other-secret", Duration::hours(4), 4);
        let forged = other.issue_token(1).unwrap();

        let e1 = auth.verify(&expired).unwrap_err();
        let e2 = auth.verify(&forged).unwrap_err();
        let e3 = auth.verify("not-a-jwt").unwrap_err();

        assert!(matches!(e1, Error::InvalidOrExpiredToken));
        assert!(matches!(e2, Error::InvalidOrExpiredToken));
        assert!(matches!(e3, Error::InvalidOrExpiredToken));
    }
}
