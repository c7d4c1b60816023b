//! Dashboard aggregates for admins and moderators.

use chrono::{Duration, Utc};
use domain::models::dashboard::{
    AdminStats, ModStats, PENDING_COMMENT_WINDOW_HOURS, RECENT_USER_WINDOW_DAYS,
};
use sqlx::{PgPool, Row};

use crate::metrics::QueryTimer;

/// Repository for back-office totals.
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Totals for the admin dashboard in one round trip.
    pub async fn admin_stats(&self) -> Result<AdminStats, sqlx::Error> {
        let timer = QueryTimer::new("admin_dashboard_stats");
        let result = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM movies) AS total_movies,
                (SELECT COUNT(*) FROM comments) AS total_comments,
                (SELECT COUNT(*) FROM invite_codes
                    WHERE expires_at > NOW() AND used_count < max_uses) AS active_invite_codes
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        let row = result?;

        Ok(AdminStats {
            total_users: row.get("total_users"),
            total_movies: row.get("total_movies"),
            total_comments: row.get("total_comments"),
            active_invite_codes: row.get("active_invite_codes"),
        })
    }

    /// Totals for the moderator dashboard.
    pub async fn mod_stats(&self) -> Result<ModStats, sqlx::Error> {
        let now = Utc::now();
        let comments_since = now - Duration::hours(PENDING_COMMENT_WINDOW_HOURS);
        let users_since = now - Duration::days(RECENT_USER_WINDOW_DAYS);

        let timer = QueryTimer::new("mod_dashboard_stats");
        let result = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM movies) AS total_movies,
                (SELECT COUNT(*) FROM comments) AS total_comments,
                (SELECT COUNT(*) FROM comments WHERE created_at > $1) AS pending_comments,
                (SELECT COUNT(*) FROM users WHERE created_at > $2) AS recent_users
            "#,
        )
        .bind(comments_since)
        .bind(users_since)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        let row = result?;

        Ok(ModStats {
            total_movies: row.get("total_movies"),
            total_comments: row.get("total_comments"),
            pending_comments: row.get("pending_comments"),
            recent_users: row.get("recent_users"),
        })
    }
}
