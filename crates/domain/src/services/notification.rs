//! Notifications raised by catalog and moderation events.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{NewNotification, NotificationType};

/// Sent to the moderator who imported a movie.
pub fn new_movie_imported(importer: Uuid, movie_id: Uuid, title: &str) -> NewNotification {
    NewNotification {
        user_id: importer,
        content: format!("New movie added: {}", title),
        kind: NotificationType::NewMovie,
        related_movie_id: Some(movie_id),
        related_comment_id: None,
    }
}

/// Sent to a comment's author when someone else replies.
///
/// Returns `None` when the author replied to their own comment.
pub fn comment_reply(
    parent_author: Uuid,
    replier: Uuid,
    movie_id: Uuid,
    reply_id: Uuid,
) -> Option<NewNotification> {
    if parent_author == replier {
        return None;
    }
    Some(NewNotification {
        user_id: parent_author,
        content: "Someone replied to your comment".to_string(),
        kind: NotificationType::CommentReply,
        related_movie_id: Some(movie_id),
        related_comment_id: Some(reply_id),
    })
}

/// Sent to a user when a moderator blocks the account.
pub fn account_blocked(user_id: Uuid, until: Option<DateTime<Utc>>) -> NewNotification {
    let content = match until {
        Some(until) => format!(
            "Your account has been blocked until {}",
            until.format("%Y-%m-%d %H:%M UTC")
        ),
        None => "Your account has been blocked".to_string(),
    };
    NewNotification {
        user_id,
        content,
        kind: NotificationType::AccountBlocked,
        related_movie_id: None,
        related_comment_id: None,
    }
}
