//! Per-user notification inbox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Events that produce a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewMovie,
    CommentReply,
    AccountBlocked,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::NewMovie => "new_movie",
            NotificationType::CommentReply => "comment_reply",
            NotificationType::AccountBlocked => "account_blocked",
            NotificationType::System => "system",
        }
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new_movie" => Ok(NotificationType::NewMovie),
            "comment_reply" => Ok(NotificationType::CommentReply),
            "account_blocked" => Ok(NotificationType::AccountBlocked),
            "system" => Ok(NotificationType::System),
            _ => Err(format!("Invalid notification type: {}", s)),
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub read: bool,
    pub related_movie_id: Option<Uuid>,
    pub related_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Movie fields shown in the inbox.
#[derive(Debug, Clone, Serialize)]
pub struct RelatedMovie {
    pub id: Uuid,
    pub title: String,
    pub poster: Option<String>,
}

/// Comment fields shown in the inbox.
#[derive(Debug, Clone, Serialize)]
pub struct RelatedComment {
    pub id: Uuid,
    pub content: String,
}

/// Notification with its related movie and comment resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub related_movie: Option<RelatedMovie>,
    pub related_comment: Option<RelatedComment>,
}

/// Fields needed to insert a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub content: String,
    pub kind: NotificationType,
    pub related_movie_id: Option<Uuid>,
    pub related_comment_id: Option<Uuid>,
}

/// Moderator request to send a notification to a user.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[serde(alias = "user")]
    pub user_id: Uuid,

    #[validate(
        length(min = 1, max = 1000, message = "Content must be 1-1000 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub content: String,

    #[serde(rename = "type", default = "default_kind")]
    pub kind: NotificationType,

    #[serde(default, alias = "relatedMovie")]
    pub related_movie_id: Option<Uuid>,

    #[serde(default, alias = "relatedComment")]
    pub related_comment_id: Option<Uuid>,
}

fn default_kind() -> NotificationType {
    NotificationType::System
}

impl From<CreateNotificationRequest> for NewNotification {
    fn from(req: CreateNotificationRequest) -> Self {
        Self {
            user_id: req.user_id,
            content: req.content,
            kind: req.kind,
            related_movie_id: req.related_movie_id,
            related_comment_id: req.related_comment_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trip_names() {
        for kind in [
            NotificationType::NewMovie,
            NotificationType::CommentReply,
            NotificationType::AccountBlocked,
            NotificationType::System,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<NotificationType>().unwrap(), kind);
        }
    }

    #[test]
    fn test_notification_serializes_type_key() {
        let n = Notification {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            content: "hello".to_string(),
            kind: NotificationType::System,
            read: false,
            related_movie_id: None,
            related_comment_id: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "system");
        assert_eq!(json["read"], false);
    }

    #[test]
    fn test_create_request_defaults_to_system() {
        let user = Uuid::new_v4();
        let req: CreateNotificationRequest =
            serde_json::from_value(serde_json::json!({"user": user, "content": "Maintenance tonight"}))
                .unwrap();
        assert!(req.validate().is_ok());

        let new: NewNotification = req.into();
        assert_eq!(new.user_id, user);
        assert_eq!(new.kind, NotificationType::System);
    }

    #[test]
    fn test_create_request_rejects_unknown_type() {
        let result: Result<CreateNotificationRequest, _> = serde_json::from_value(
            serde_json::json!({"userId": Uuid::new_v4(), "content": "x", "type": "promo"}),
        );
        assert!(result.is_err());
    }
}
