//! Registration and login.
//!
//! Credential checking sits behind the [`Authenticator`] capability so a
//! different backend can be injected without touching the handlers.

use std::sync::Arc;

use async_trait::async_trait;
use newworld_core::validation::validate_registration;
use newworld_core::{Role, User};
use newworld_db::{Database, DbError, NewUser};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::JwtManager;
use crate::error::{ApiError, ApiResult};
use crate::password::{hash_password, verify_password};

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Message shared by every failed login.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Resolves an e-mail/password pair to an account.
///
/// Implementations must fail with the same error whether the e-mail is
/// unknown or the password is wrong.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<User>;
}

/// Checks credentials against the users table.
#[derive(Debug, Clone)]
pub struct DbAuthenticator {
    db: Database,
}

impl DbAuthenticator {
    pub fn new(db: Database) -> Self {
        DbAuthenticator { db }
    }
}

#[async_trait]
impl Authenticator for DbAuthenticator {
    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<User> {
        let Some(user) = self.db.users().get_by_email(email).await? else {
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }

        Ok(user)
    }
}

/// Account creation and token issuance.
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    jwt: Arc<JwtManager>,
    authenticator: Arc<dyn Authenticator>,
}

impl AuthService {
    pub fn new(db: Database, jwt: Arc<JwtManager>, authenticator: Arc<dyn Authenticator>) -> Self {
        AuthService {
            db,
            jwt,
            authenticator,
        }
    }

    /// Creates a `user` account.
    ///
    /// Uniqueness is left to the table's unique indexes: the insert is the
    /// check, so two racing registrations cannot both succeed.
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<User> {
        validate_registration(&request.username, &request.email, &request.password)?;

        let password_hash = hash_password(request.password).await?;

        let new_user = NewUser {
            username: request.username,
            email: request.email,
            password_hash,
            role: Role::User,
        };

        self.create_user(new_user).await
    }

    /// Inserts an account with an already hashed password.
    pub async fn create_user(&self, new_user: NewUser) -> ApiResult<User> {
        match self.db.users().create(&new_user).await {
            Ok(user) => {
                info!(user_id = user.id, role = %user.role, "User registered");
                Ok(user)
            }
            Err(e) if e.is_duplicate_of("users.username") => {
                Err(ApiError::conflict("username already exists"))
            }
            Err(e) if e.is_duplicate_of("users.email") => {
                Err(ApiError::conflict("email already exists"))
            }
            Err(e @ DbError::UniqueViolation { .. }) => Err(ApiError::conflict(e.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Verifies credentials and returns a bearer token.
    pub async fn login(&self, request: LoginRequest) -> ApiResult<String> {
        // Blank credentials fail the same way as wrong ones
        if request.email.trim().is_empty() || request.password.is_empty() {
            warn!("Login refused");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }

        let user = match self
            .authenticator
            .authenticate(&request.email, &request.password)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                warn!("Login refused");
                return Err(e);
            }
        };

        let token = self.jwt.issue(&user.email, user.role)?;
        info!(user_id = user.id, "Token issued");
        Ok(token)
    }
}
