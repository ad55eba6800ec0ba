//! User
//!
//! A staff account. Accounts are created by an admin (or seeded on first
//! start) and never hard-deleted; locking someone out goes through the
//! ``suspended`` flag so their appointments keep a valid owner.

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{Done, SqlitePool};

use crate::{
    ac::Role,
    auth::password,
    config::DefaultAdmin,
    fallible::{ApiResult, Error},
};

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// argon2 PHC string, never serialized
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub suspended: bool,
    pub created_at: NaiveDateTime,
}

/// Fields an admin may change on an existing account. ``None`` leaves the
/// stored value untouched.
#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub role: Option<Role>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserStatistics {
    pub total: i64,
    pub admins: i64,
    pub dietitians: i64,
    pub new_last_30_days: i64,
}

impl User {
    /// Create a new account. The password is stored as an argon2 hash only.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        password: &str,
        role: Role,
    ) -> ApiResult<i64> {
        validate_username(username)?;

        let hash = password::hash(password);
        let done = sqlx::query("INSERT INTO users (username, password, role) VALUES (?, ?, ?)")
            .bind(username)
            .bind(hash)
            .bind(role)
            .execute(db)
            .await
            .map_err(Error::from_user_insert)?;

        Ok(done.last_insert_rowid())
    }

    pub async fn find_by_username(db: &SqlitePool, username: &str) -> ApiResult<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(db)
                .await?,
        )
    }

    pub async fn list(db: &SqlitePool) -> ApiResult<Vec<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(db)
            .await?)
    }

    /// Substring match on the username. ``instr`` keeps the match case
    /// sensitive; sqlite's ``LIKE`` is not.
    pub async fn search(db: &SqlitePool, query: &str) -> ApiResult<Vec<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE instr(username, ?) > 0 ORDER BY id")
                .bind(query)
                .fetch_all(db)
                .await?,
        )
    }

    pub async fn update(db: &SqlitePool, id: i64, fields: UserUpdate) -> ApiResult<()> {
        let hash = fields.password.as_deref().map(password::hash);

        let done = sqlx::query(
            "UPDATE users SET role = COALESCE(?, role), password = COALESCE(?, password) WHERE id = ?",
        )
        .bind(fields.role)
        .bind(hash)
        .bind(id)
        .execute(db)
        .await?;

        if done.rows_affected() == 0 {
            return Err(Error::NotFound("user"));
        }
        Ok(())
    }

    pub async fn set_suspended(db: &SqlitePool, id: i64, suspended: bool) -> ApiResult<()> {
        let done = sqlx::query("UPDATE users SET suspended = ? WHERE id = ?")
            .bind(suspended)
            .bind(id)
            .execute(db)
            .await?;

        if done.rows_affected() == 0 {
            return Err(Error::NotFound("user"));
        }
        Ok(())
    }

    /// Independent counting queries; the counts are not taken in one
    /// transaction, so a concurrent write can skew them against each other.
    pub async fn statistics(db: &SqlitePool) -> ApiResult<UserStatistics> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;
        let admins = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(db)
            .await?;
        let dietitians =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = 'dietitian'")
                .fetch_one(db)
                .await?;
        let new_last_30_days = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE created_at >= datetime('now', '-30 days')",
        )
        .fetch_one(db)
        .await?;

        Ok(UserStatistics {
            total,
            admins,
            dietitians,
            new_last_30_days,
        })
    }

    /// Seeds the configured admin account if no account with that name
    /// exists yet, so a fresh instance is reachable at all.
    pub async fn ensure_default_admin(db: &SqlitePool, admin: &DefaultAdmin) -> ApiResult<()> {
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
            .bind(&admin.username)
            .fetch_optional(db)
            .await?;
        if existing.is_some() {
            return Ok(());
        }

        let id = Self::create(db, &admin.username, &admin.password, Role::Admin).await?;
        info!("seeded default admin `{}` with id {}", admin.username, id);
        warn!("the default admin uses the password from the config file, rotate it");
        Ok(())
    }
}

fn validate_username(username: &str) -> ApiResult<()> {
    lazy_static! {
        static ref RE: Regex = Regex::new("^[a-z0-9_]{3,16}$").unwrap();
    }

    if RE.is_match(username) {
        Ok(())
    } else {
        Err(Error::Validation(
            "username must be 3-16 characters of a-z, 0-9 or _".to_string(),
        ))
    }
}
