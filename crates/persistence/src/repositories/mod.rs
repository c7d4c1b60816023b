//! Repository implementations for database operations.

pub mod comment;
pub mod dashboard;
pub mod invite_code;
pub mod library;
pub mod movie;
pub mod notification;
pub mod user;

pub use comment::CommentRepository;
pub use dashboard::DashboardRepository;
pub use invite_code::InviteCodeRepository;
pub use library::LibraryRepository;
pub use movie::MovieRepository;
pub use notification::NotificationRepository;
pub use user::UserRepository;

/// PostgreSQL SQLSTATE for unique_violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for foreign_key_violation.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL SQLSTATE for check_violation.
pub const CHECK_VIOLATION: &str = "23514";

fn has_code(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(code),
        _ => false,
    }
}

/// True when the error is a duplicate key on a unique index.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    has_code(err, UNIQUE_VIOLATION)
}

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    has_code(err, FOREIGN_KEY_VIOLATION)
}

pub fn is_check_violation(err: &sqlx::Error) -> bool {
    has_code(err, CHECK_VIOLATION)
}
