/// Password hashing and bearer token issuance
use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm as JwtAlgorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Credential store: Argon2id password hashes and HS256 access tokens
#[derive(Clone)]
pub struct Credentials {
    hasher: Argon2<'static>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl Credentials {
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let params = Params::new(config.argon2_memory_kib, config.argon2_iterations, 1, None)
            .map_err(|e| AppError::Internal(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self {
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: Duration::minutes(config.token_ttl_minutes),
        })
    }

    /// Salted one-way hash in PHC string format
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(hash.to_string())
    }

    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .hasher
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is unreadable: {}", e);
                false
            }
        }
    }

    /// Signed token carrying the user id and an expiry
    pub fn issue_token(&self, user_id: &str) -> AppResult<String> {
        let now = Utc::now();
        self.encode_claims(&Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        })
    }

    fn encode_claims(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::new(JwtAlgorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verify signature and expiry, returning the user id
    pub fn resolve_token(&self, token: &str) -> AppResult<String> {
        let mut validation = Validation::new(JwtAlgorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Token verification failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthenticated("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::Unauthenticated("Invalid token signature".to_string())
                }
                _ => AppError::Unauthenticated("Could not validate credentials".to_string()),
            }
        })?;

        if data.claims.sub.is_empty() {
            return Err(AppError::Unauthenticated(
                "Could not validate credentials".to_string(),
            ));
        }

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn credentials() -> Credentials {
        Credentials::new(&test_config().authentication).unwrap()
    }

    #[test]
    fn test_password_round_trip() {
        let creds = credentials();
        let hash = creds.hash_password("hunter22").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(creds.verify_password("hunter22", &hash));
        assert!(!creds.verify_password("hunter23", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let creds = credentials();
        let a = creds.hash_password("same-password").unwrap();
        let b = creds.hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!credentials().verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_token_resolves_to_user_id() {
        let creds = credentials();
        let token = creds.issue_token("user-123").unwrap();
        assert_eq!(creds.resolve_token(&token).unwrap(), "user-123");
    }

    #[test]
    fn test_expired_token_rejected() {
        let creds = credentials();
        let issued = Utc::now() - Duration::hours(2);
        let token = creds
            .encode_claims(&Claims {
                sub: "user-123".to_string(),
                iat: issued.timestamp(),
                exp: (issued + Duration::minutes(30)).timestamp(),
            })
            .unwrap();

        assert!(matches!(
            creds.resolve_token(&token),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let mut other = test_config().authentication;
        other.jwt_secret = "a-completely-different-secret-value-xyz".to_string();
        let token = Credentials::new(&other).unwrap().issue_token("user-123").unwrap();

        assert!(matches!(
            credentials().resolve_token(&token),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(matches!(
            credentials().resolve_token("not.a.jwt"),
            Err(AppError::Unauthenticated(_))
        ));
    }
}
