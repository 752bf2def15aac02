// src/core/auth.rs
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use std::fs;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use crate::core::config::Config;
use crate::db::Database;
use crate::models::{SessionRecord, UserRecord};
use crate::utils;

// For password verification
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

// Define JWT claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    // Subject (username)
    pub sub: String,
    // Authorization string at signon time
    pub auth: String,
    // Issued at
    pub iat: i64,
    // Expiration time
    pub exp: i64,
    // Session ID
    pub sid: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid session")]
    InvalidSession,

    #[error("Database error: {0}")]
    DbError(#[from] crate::db::DbError),

    #[error("Argon2 error: {0}")]
    Argon2Error(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Outcome of checking a presented password against a user record.
#[derive(Debug, PartialEq, Eq)]
pub enum PasswordCheck {
    /// Matches the stored argon2 hash.
    Match,
    /// Matches a legacy SHA-512 digest; the caller should upgrade the
    /// stored hash.
    MatchLegacy,
    NoMatch,
}

#[derive(Clone)]
pub struct AuthManager {
    jwt_secret: String,
    session_duration: Duration,
    persistence_duration: Duration,
}

impl AuthManager {
    pub fn new(config: &Config) -> Self {
        let secret_dir = utils::get_app_config_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."));

        let jwt_secret = Self::get_or_create_jwt_secret(&secret_dir);

        Self {
            jwt_secret,
            session_duration: Duration::from_std(config.session_duration)
                .unwrap_or_else(|_| Duration::hours(1)),
            persistence_duration: Duration::from_std(config.persistence_duration)
                .unwrap_or_else(|_| Duration::days(7)),
        }
    }

    // Get or create JWT secret
    fn get_or_create_jwt_secret(secret_dir: &Path) -> String {
        let secret_file = secret_dir.join("jwt_secret");

        if secret_file.exists() {
            if let Ok(secret) = fs::read_to_string(&secret_file) {
                let secret = secret.trim().to_string();
                if !secret.is_empty() {
                    return secret;
                }
            }
        }

        let secret = utils::generate_secret();
        fs::write(&secret_file, &secret).ok();

        secret
    }

    /// Hash a password for storage with Argon2id.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let argon2 = Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2::Params::new(
                65536, // 64 MB
                3,     // 3 iterations
                4,     // 4 parallel lanes
                None,
            )
            .map_err(|e| AuthError::Argon2Error(e.to_string()))?,
        );

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Argon2Error(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Check a presented password against the account's stored hash,
    /// falling back to the legacy SHA-512 digest carried over from the
    /// old site. Accounts that verified against a legacy digest get
    /// their hash upgraded by the caller.
    pub fn verify_password(&self, user: &UserRecord, password: &str) -> PasswordCheck {
        if let Some(stored) = &user.password_hash {
            if let Ok(parsed) = PasswordHash::new(stored) {
                if Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
                {
                    return PasswordCheck::Match;
                }
            }
            return PasswordCheck::NoMatch;
        }

        if let Some(legacy) = &user.sha_password {
            let digest = hex::encode(Sha512::digest(password.as_bytes()));
            if digest.eq_ignore_ascii_case(legacy) {
                return PasswordCheck::MatchLegacy;
            }
        }

        PasswordCheck::NoMatch
    }

    /// Open a session for a verified user and return the signed JWT.
    pub async fn open_session(&self, db: &Database, user: &UserRecord) -> Result<String> {
        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let expires_at = now + self.session_duration;

        db.create_session(&SessionRecord {
            id: session_id.clone(),
            username: user.username.clone(),
            expires_at,
            persistent: false,
        })
        .await?;

        let claims = Claims {
            sub: user.username.clone(),
            auth: user.auth.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            sid: session_id,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Issue a long-lived persistence token ("remember me").
    pub async fn issue_persistence_token(
        &self,
        db: &Database,
        user: &UserRecord,
    ) -> Result<String> {
        let token = utils::generate_secret();

        db.create_session(&SessionRecord {
            id: token.clone(),
            username: user.username.clone(),
            expires_at: Utc::now() + self.persistence_duration,
            persistent: true,
        })
        .await?;

        Ok(token)
    }

    /// Exchange a persistence token for the account it belongs to.
    pub async fn resume_session(&self, db: &Database, token: &str) -> Result<UserRecord> {
        let session = db
            .get_session(token)
            .await?
            .ok_or(AuthError::InvalidSession)?;

        if !session.persistent {
            return Err(AuthError::InvalidSession);
        }
        if session.expires_at < Utc::now() {
            db.delete_session(token).await?;
            return Err(AuthError::SessionExpired);
        }

        db.find_user_by_username(&session.username)
            .await?
            .ok_or(AuthError::InvalidSession)
    }

    /// Decode and verify the JWT signature and expiry.
    pub fn decode_claims(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )?;

        let claims = token_data.claims;

        if claims.exp < Utc::now().timestamp() {
            return Err(AuthError::SessionExpired);
        }

        Ok(claims)
    }

    /// Full validation: signature, expiry, and the session row the
    /// token was issued against (so signoff actually revokes it).
    pub async fn validate_token(&self, db: &Database, token: &str) -> Result<Claims> {
        let claims = self.decode_claims(token)?;

        match db.get_session(&claims.sid).await? {
            Some(session) if session.expires_at >= Utc::now() => Ok(claims),
            Some(_) => Err(AuthError::SessionExpired),
            None => Err(AuthError::InvalidSession),
        }
    }

    /// Revoke the session behind a token.
    pub async fn close_session(&self, db: &Database, token: &str) -> Result<()> {
        let claims = self.decode_claims(token)?;
        db.delete_session(&claims.sid).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn manager() -> AuthManager {
        AuthManager {
            jwt_secret: "test-secret".to_string(),
            session_duration: Duration::hours(1),
            persistence_duration: Duration::days(7),
        }
    }

    fn user_with(password_hash: Option<String>, sha_password: Option<String>) -> UserRecord {
        UserRecord {
            id: 7,
            username: "margaret".to_string(),
            email: "margaret@example.com".to_string(),
            password_hash,
            sha_password,
            auth: "blog,edit".to_string(),
            options: 0,
            confirm_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn argon2_roundtrip() {
        let auth = manager();
        let hash = auth.hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        let user = user_with(Some(hash), None);
        assert_eq!(auth.verify_password(&user, "correct horse"), PasswordCheck::Match);
        assert_eq!(auth.verify_password(&user, "wrong horse"), PasswordCheck::NoMatch);
    }

    #[test]
    fn legacy_sha512_digest_matches() {
        let auth = manager();
        let digest = hex::encode(Sha512::digest(b"OldPassword9"));
        let user = user_with(None, Some(digest.to_uppercase()));

        assert_eq!(
            auth.verify_password(&user, "OldPassword9"),
            PasswordCheck::MatchLegacy
        );
        assert_eq!(auth.verify_password(&user, "other"), PasswordCheck::NoMatch);
    }

    #[test]
    fn argon2_hash_takes_precedence_over_legacy() {
        let auth = manager();
        let hash = auth.hash_password("NewPassword3").unwrap();
        let stale_digest = hex::encode(Sha512::digest(b"OldPassword9"));
        let user = user_with(Some(hash), Some(stale_digest));

        // once upgraded, the stale digest no longer authenticates
        assert_eq!(auth.verify_password(&user, "OldPassword9"), PasswordCheck::NoMatch);
        assert_eq!(auth.verify_password(&user, "NewPassword3"), PasswordCheck::Match);
    }

    #[test]
    fn account_with_no_credentials_never_matches() {
        let auth = manager();
        let user = user_with(None, None);
        assert_eq!(auth.verify_password(&user, ""), PasswordCheck::NoMatch);
    }

    #[test]
    fn claims_roundtrip() {
        let auth = manager();
        let now = Utc::now();
        let claims = Claims {
            sub: "margaret".to_string(),
            auth: "blog,edit".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
            sid: "session-1".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
        )
        .unwrap();

        let decoded = auth.decode_claims(&token).unwrap();
        assert_eq!(decoded.sub, "margaret");
        assert_eq!(decoded.sid, "session-1");
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let auth = manager();
        let now = Utc::now();
        let claims = Claims {
            sub: "margaret".to_string(),
            auth: "blog,edit".to_string(),
            iat: (now - Duration::hours(3)).timestamp(),
            exp: (now - Duration::hours(2)).timestamp(),
            sid: "session-1".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
        )
        .unwrap();

        assert!(auth.decode_claims(&token).is_err());
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let auth = manager();
        let other = AuthManager {
            jwt_secret: "different-secret".to_string(),
            ..manager()
        };
        let now = Utc::now();
        let claims = Claims {
            sub: "margaret".to_string(),
            auth: "yes".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
            sid: "session-1".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(other.jwt_secret.as_bytes()),
        )
        .unwrap();

        assert!(auth.decode_claims(&token).is_err());
    }
}
