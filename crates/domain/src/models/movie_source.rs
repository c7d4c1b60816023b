//! Requests for browsing and importing from external movie sources.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Page size for Drive listings when none is given.
pub const DEFAULT_DRIVE_PAGE_SIZE: u32 = 10;

/// Query for the third-party catalog list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Keyword search against the third-party catalog.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExternalSearchQuery {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 200, message = "Keyword is required"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub keyword: String,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Import one movie from the third-party catalog by its id or slug.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApiImportRequest {
    #[serde(alias = "movieId")]
    #[validate(
        length(min = 1, max = 255, message = "API movie id is required"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub api_movie_id: String,
}

/// Drive file listing query.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DriveListQuery {
    pub page_token: Option<String>,
    #[validate(range(min = 1, max = 100, message = "pageSize must be between 1 and 100"))]
    pub page_size: Option<u32>,
}

impl DriveListQuery {
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_DRIVE_PAGE_SIZE)
    }
}

/// Import a Drive video file, optionally overriding the derived metadata.
///
/// `genre` and `actors` are comma separated lists.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DriveImportRequest {
    #[validate(length(min = 1, max = 255, message = "Drive file id is required"))]
    pub file_id: String,

    #[validate(length(max = 255, message = "Title too long"))]
    pub title: Option<String>,

    #[validate(length(max = 10000, message = "Description too long"))]
    pub description: Option<String>,

    pub genre: Option<String>,

    #[validate(range(min = 1888, max = 2100, message = "Invalid release year"))]
    pub release_year: Option<i32>,

    #[validate(length(max = 255, message = "Director name too long"))]
    pub director: Option<String>,

    pub actors: Option<String>,
}

/// Drive refresh token handed over by a moderator.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DriveAuthRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Drive file metadata as returned by the Drive v3 API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub description: Option<String>,
    pub thumbnail_link: Option<String>,
    pub web_view_link: Option<String>,
}

/// One page of Drive files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_requires_keyword() {
        let q: ExternalSearchQuery = serde_json::from_str("{}").unwrap();
        assert!(q.validate().is_err());

        let q: ExternalSearchQuery = serde_json::from_str(r#"{"keyword":"  "}"#).unwrap();
        assert!(q.validate().is_err());

        let q: ExternalSearchQuery = serde_json::from_str(r#"{"keyword":"mai"}"#).unwrap();
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_api_import_accepts_movie_id_alias() {
        let req: ApiImportRequest = serde_json::from_str(r#"{"movieId":"nha-ba-nu"}"#).unwrap();
        assert_eq!(req.api_movie_id, "nha-ba-nu");
    }

    #[test]
    fn test_drive_list_default_page_size() {
        assert_eq!(DriveListQuery::default().page_size(), 10);
    }

    #[test]
    fn test_drive_file_list_deserialize() {
        let list: DriveFileList = serde_json::from_value(serde_json::json!({
            "files": [{"id": "f1", "name": "clip.mp4", "mimeType": "video/mp4"}],
            "nextPageToken": "tok"
        }))
        .unwrap();
        assert_eq!(list.files.len(), 1);
        assert_eq!(list.files[0].mime_type.as_deref(), Some("video/mp4"));
        assert_eq!(list.next_page_token.as_deref(), Some("tok"));
    }
}
