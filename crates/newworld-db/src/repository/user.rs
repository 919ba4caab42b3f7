//! # User Repository
//!
//! Database operations for accounts.
//!
//! ## Registration Without a Race
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(NewUser)                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO users ... RETURNING *     (single statement)               │
//! │       │                                                                 │
//! │       ├── ok ──────────────────────────────► User                      │
//! │       │                                                                 │
//! │       └── UNIQUE constraint failed: users.username                     │
//! │           UNIQUE constraint failed: users.email                        │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │           DbError::UniqueViolation { field: "users.<column>" }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no "does this username exist?" pre-check. Two concurrent
//! registrations for the same name race on the unique index and exactly
//! one of them wins.

use chrono::Utc;
use newworld_core::{Role, User};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at";

/// Input for [`UserRepository::create`]. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user.
    ///
    /// ## Errors
    /// `DbError::UniqueViolation` with field `users.username` or
    /// `users.email` when either is taken (including by a deleted account).
    pub async fn create(&self, user: &NewUser) -> DbResult<User> {
        debug!(username = %user.username, role = %user.role, "Inserting user");
        let now = Utc::now();

        let sql = format!(
            "INSERT INTO users (username, email, password_hash, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             RETURNING {USER_COLUMNS}"
        );

        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// Gets a live user by e-mail.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1 AND deleted_at IS NULL"
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets a live user by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1 AND deleted_at IS NULL");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Lists live users with the given role, oldest first.
    pub async fn list_by_role(&self, role: Role) -> DbResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE role = ?1 AND deleted_at IS NULL
             ORDER BY id"
        );

        let users = sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Soft deletes a user.
    ///
    /// ## Errors
    /// `DbError::NotFound` when no live user has this ID.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft deleting user");
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE users SET deleted_at = ?2, updated_at = ?2
             WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Counts live users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
