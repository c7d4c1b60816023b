//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::invite_code::consume_invite;
use crate::entities::{NewUserRecord, UserAccessEntity, UserEntity, UserRoleDb};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, name, email, password_hash, google_id, avatar, role, \
     invite_code, blocked, block_until, created_at, updated_at";

/// Repository for user accounts.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a password account and redeems its invite code in one transaction.
    ///
    /// Returns `Ok(None)` when the code could not be redeemed (expired or used
    /// up by the time the conditional increment ran); nothing is written then.
    pub async fn register_with_invite(
        &self,
        record: &NewUserRecord,
        invite_code_id: Uuid,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("register_with_invite");
        let result = self.register_in_tx(record, invite_code_id).await;
        timer.record();
        result
    }

    async fn register_in_tx(
        &self,
        record: &NewUserRecord,
        invite_code_id: Uuid,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if !consume_invite(&mut tx, invite_code_id).await? {
            tracing::debug!(%invite_code_id, "Invite code no longer usable at registration");
            tx.rollback().await?;
            return Ok(None);
        }

        let sql = format!(
            "INSERT INTO users (name, email, password_hash, invite_code) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, UserEntity>(&sql)
            .bind(&record.name)
            .bind(&record.email)
            .bind(&record.password_hash)
            .bind(&record.invite_code)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO invite_code_uses (invite_code_id, user_id) VALUES ($1, $2)")
            .bind(invite_code_id)
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(user))
    }

    /// Creates an account for a first-time Google sign-in.
    pub async fn create_oauth_user(
        &self,
        name: &str,
        email: &str,
        avatar: Option<&str>,
        google_id: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_oauth_user");
        let sql = format!(
            "INSERT INTO users (name, email, avatar, google_id) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let result = sqlx::query_as::<_, UserEntity>(&sql)
            .bind(name)
            .bind(email)
            .bind(avatar)
            .bind(google_id)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Attaches a Google id to an existing account; keeps any avatar already set.
    pub async fn link_google_id(
        &self,
        id: Uuid,
        google_id: &str,
        avatar: Option<&str>,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("link_google_id");
        let sql = format!(
            "UPDATE users SET google_id = $2, avatar = COALESCE(avatar, $3), updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let result = sqlx::query_as::<_, UserEntity>(&sql)
            .bind(id)
            .bind(google_id)
            .bind(avatar)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let result = sqlx::query_as::<_, UserEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Case-insensitive lookup.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let sql = format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        );
        let result = sqlx::query_as::<_, UserEntity>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_google_id");
        let sql = format!("SELECT {} FROM users WHERE google_id = $1", USER_COLUMNS);
        let result = sqlx::query_as::<_, UserEntity>(&sql)
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Role and block columns only; read on every authenticated request.
    pub async fn find_access(&self, id: Uuid) -> Result<Option<UserAccessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_access");
        let result = sqlx::query_as::<_, UserAccessEntity>(
            "SELECT id, role, blocked, block_until FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Updates the given profile fields; `None` leaves a field unchanged.
    pub async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        avatar: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_profile");
        let sql = format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                avatar = COALESCE($3, avatar),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let result = sqlx::query_as::<_, UserEntity>(&sql)
            .bind(id)
            .bind(name)
            .bind(avatar)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn update_role(
        &self,
        id: Uuid,
        role: UserRoleDb,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_role");
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let result = sqlx::query_as::<_, UserEntity>(&sql)
            .bind(id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Sets or lifts a block. Lifting always clears `block_until`.
    pub async fn set_block(
        &self,
        id: Uuid,
        blocked: bool,
        block_until: Option<DateTime<Utc>>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_user_block");
        let sql = format!(
            r#"
            UPDATE users SET
                blocked = $2,
                block_until = CASE WHEN $2 THEN $3 ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let result = sqlx::query_as::<_, UserEntity>(&sql)
            .bind(id)
            .bind(blocked)
            .bind(block_until)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Returns true if a row was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// All accounts, newest first.
    pub async fn list_all(&self) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_all_users");
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at DESC, id DESC",
            USER_COLUMNS
        );
        let result = sqlx::query_as::<_, UserEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// One page of accounts, newest first. `pattern` is an ILIKE pattern
    /// matched against name and email.
    pub async fn list_page(
        &self,
        pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_users_page");
        let sql = format!(
            r#"
            SELECT {} FROM users
            WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            USER_COLUMNS
        );
        let result = sqlx::query_as::<_, UserEntity>(&sql)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn count(&self, pattern: Option<&str>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_users");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)",
        )
        .bind(pattern)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
