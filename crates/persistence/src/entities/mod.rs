//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod comment;
pub mod invite_code;
pub mod movie;
pub mod notification;
pub mod user;

pub use comment::{CommentEntity, CommentLikeEntity, CommentListEntity, CommentWithAuthorEntity};
pub use invite_code::{InviteCodeEntity, InviteCodeUseEntity, InviteCodeWithCreatorEntity};
pub use movie::{MovieEntity, MovieSourceDb, RatingEntity, WatchHistoryEntity};
pub use notification::{NotificationEntity, NotificationTypeDb, NotificationWithRelatedEntity};
pub use user::{NewUserRecord, UserAccessEntity, UserEntity, UserRoleDb};
