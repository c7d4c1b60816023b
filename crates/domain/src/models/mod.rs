//! Domain models for the movie catalog.

pub mod comment;
pub mod common;
pub mod dashboard;
pub mod invite_code;
pub mod movie;
pub mod movie_source;
pub mod notification;
pub mod user;

pub use comment::{Comment, CommentThread, CommentView};
pub use common::{MessageResponse, PageQuery};
pub use invite_code::{InviteCode, InviteRejection};
pub use movie::{Movie, MovieSort, MovieSource, NewMovie};
pub use notification::{NewNotification, Notification, NotificationType};
pub use user::{AuthorSummary, Role, User, UserSummary};
