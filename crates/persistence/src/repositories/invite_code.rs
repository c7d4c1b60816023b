//! Invite code repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{InviteCodeEntity, InviteCodeUseEntity, InviteCodeWithCreatorEntity};
use crate::metrics::QueryTimer;

const WITH_CREATOR: &str = r#"
    SELECT ic.id, ic.code, ic.created_by, ic.expires_at, ic.max_uses, ic.used_count,
           ic.created_at, u.name AS creator_name, u.email AS creator_email
    FROM invite_codes ic
    LEFT JOIN users u ON u.id = ic.created_by
"#;

/// Redeems one use of an invite code inside the caller's transaction.
///
/// The increment only applies while the code is unexpired and below its cap,
/// so concurrent registrations can never overshoot `max_uses`.
pub(crate) async fn consume_invite(
    conn: &mut PgConnection,
    invite_code_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE invite_codes
        SET used_count = used_count + 1
        WHERE id = $1 AND used_count < max_uses AND expires_at > NOW()
        "#,
    )
    .bind(invite_code_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Repository for invite code operations.
#[derive(Clone)]
pub struct InviteCodeRepository {
    pool: PgPool,
}

impl InviteCodeRepository {
    /// Creates a new InviteCodeRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new code.
    pub async fn create(
        &self,
        code: &str,
        created_by: Uuid,
        expires_at: DateTime<Utc>,
        max_uses: i32,
    ) -> Result<InviteCodeEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_invite_code");
        let result = sqlx::query_as::<_, InviteCodeEntity>(
            r#"
            INSERT INTO invite_codes (code, created_by, expires_at, max_uses)
            VALUES ($1, $2, $3, $4)
            RETURNING id, code, created_by, expires_at, max_uses, used_count, created_at
            "#,
        )
        .bind(code)
        .bind(created_by)
        .bind(expires_at)
        .bind(max_uses)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<InviteCodeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invite_code_by_code");
        let result = sqlx::query_as::<_, InviteCodeEntity>(
            r#"
            SELECT id, code, created_by, expires_at, max_uses, used_count, created_at
            FROM invite_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_with_creator(
        &self,
        id: Uuid,
    ) -> Result<Option<InviteCodeWithCreatorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invite_code_with_creator");
        let sql = format!("{} WHERE ic.id = $1", WITH_CREATOR);
        let result = sqlx::query_as::<_, InviteCodeWithCreatorEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// One page of codes, newest first. `pattern` is an ILIKE pattern on the code.
    pub async fn list_page(
        &self,
        pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<InviteCodeWithCreatorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_invite_codes_page");
        let sql = format!(
            "{} WHERE ($1::text IS NULL OR ic.code ILIKE $1) \
             ORDER BY ic.created_at DESC, ic.id DESC LIMIT $2 OFFSET $3",
            WITH_CREATOR
        );
        let result = sqlx::query_as::<_, InviteCodeWithCreatorEntity>(&sql)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn count(&self, pattern: Option<&str>) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_invite_codes");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM invite_codes WHERE ($1::text IS NULL OR code ILIKE $1)",
        )
        .bind(pattern)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Codes issued by one user, newest first.
    pub async fn list_by_creator(
        &self,
        created_by: Uuid,
    ) -> Result<Vec<InviteCodeWithCreatorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_invite_codes_by_creator");
        let sql = format!(
            "{} WHERE ic.created_by = $1 ORDER BY ic.created_at DESC, ic.id DESC",
            WITH_CREATOR
        );
        let result = sqlx::query_as::<_, InviteCodeWithCreatorEntity>(&sql)
            .bind(created_by)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Accounts registered through any of the given codes, oldest first.
    pub async fn users_for_codes(
        &self,
        invite_code_ids: &[Uuid],
    ) -> Result<Vec<InviteCodeUseEntity>, sqlx::Error> {
        if invite_code_ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("list_invite_code_users");
        let result = sqlx::query_as::<_, InviteCodeUseEntity>(
            r#"
            SELECT icu.invite_code_id, icu.user_id, u.name, u.email
            FROM invite_code_uses icu
            JOIN users u ON u.id = icu.user_id
            WHERE icu.invite_code_id = ANY($1)
            ORDER BY icu.used_at ASC
            "#,
        )
        .bind(invite_code_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Returns true if a row was deleted.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_invite_code");
        let result = sqlx::query("DELETE FROM invite_codes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Codes that are unexpired and still have uses left.
    pub async fn count_active(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_active_invite_codes");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM invite_codes WHERE expires_at > NOW() AND used_count < max_uses",
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
