/// Account manager: registration, login, token authentication and profiles
use crate::{
    account::{
        normalize_email, Credentials, LoginRequest, ProfilePatch, RegisterRequest, TokenResponse,
        User,
    },
    db::{self, users::UserRecord},
    error::{AppError, AppResult},
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use validator::Validate;

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    credentials: Arc<Credentials>,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, credentials: Arc<Credentials>) -> Self {
        Self { db, credentials }
    }

    /// Register a new user and issue their first token
    pub async fn register(&self, req: RegisterRequest) -> AppResult<TokenResponse> {
        let req = RegisterRequest {
            email: normalize_email(&req.email),
            username: req.username.trim().to_string(),
            password: req.password,
        };
        req.validate()?;

        if db::users::email_or_username_taken(&self.db, &req.email, &req.username).await? {
            return Err(AppError::Conflict(
                "Email or username already registered".to_string(),
            ));
        }

        let password_hash = self.hash_password(req.password).await?;

        let record = UserRecord {
            id: db::new_id(),
            email: req.email,
            username: req.username,
            password_hash,
            bio: None,
            avatar_url: None,
            created_at: Utc::now(),
        };

        // A concurrent registration can still win the race; the UNIQUE
        // constraints report it here.
        db::users::insert(&self.db, &record).await.map_err(|e| {
            if e.is_unique_violation() {
                AppError::Conflict("Email or username already registered".to_string())
            } else {
                e
            }
        })?;

        tracing::info!("Registered user {} ({})", record.username, record.id);

        let token = self.credentials.issue_token(&record.id)?;
        Ok(TokenResponse::bearer(token, record.into()))
    }

    /// Verify email and password and issue a token
    pub async fn login(&self, req: LoginRequest) -> AppResult<TokenResponse> {
        let invalid = || AppError::Unauthenticated("Incorrect email or password".to_string());

        let record = db::users::find_by_email(&self.db, &normalize_email(&req.email))
            .await?
            .ok_or_else(invalid)?;

        let credentials = Arc::clone(&self.credentials);
        let stored_hash = record.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || {
            credentials.verify_password(&req.password, &stored_hash)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?;

        if !valid {
            return Err(invalid());
        }

        let token = self.credentials.issue_token(&record.id)?;
        Ok(TokenResponse::bearer(token, record.into()))
    }

    /// Resolve a bearer token to a stored user
    pub async fn authenticate(&self, token: &str) -> AppResult<User> {
        let user_id = self.credentials.resolve_token(token)?;

        // Token outlived its user
        let record = db::users::find_by_id(&self.db, &user_id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Could not validate credentials".to_string()))?;

        Ok(record.into())
    }

    /// Get a user's public profile
    pub async fn get_user(&self, id: &str) -> AppResult<User> {
        db::users::find_by_id(&self.db, id)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Apply a profile patch for the signed-in user
    pub async fn update_profile(&self, user: &User, patch: ProfilePatch) -> AppResult<User> {
        if patch.is_empty() {
            return Ok(user.clone());
        }

        let username = patch.username.as_deref().map(str::trim);
        if let Some(name) = username {
            let len = name.chars().count();
            if !(3..=32).contains(&len) {
                return Err(AppError::Validation(
                    "username must be 3 to 32 characters".to_string(),
                ));
            }

            if db::users::username_taken_by_other(&self.db, name, &user.id).await? {
                return Err(AppError::Conflict("Username already taken".to_string()));
            }
        }

        db::users::update_profile(
            &self.db,
            &user.id,
            username,
            patch.bio.as_deref(),
            patch.avatar_url.as_deref(),
        )
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                AppError::Conflict("Username already taken".to_string())
            } else {
                e
            }
        })?;

        self.get_user(&user.id).await
    }

    async fn hash_password(&self, password: String) -> AppResult<String> {
        let credentials = Arc::clone(&self.credentials);
        tokio::task::spawn_blocking(move || credentials.hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }
}
