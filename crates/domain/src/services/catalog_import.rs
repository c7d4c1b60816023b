//! Maps third-party catalog payloads onto new movie records.
//!
//! Two sources feed the catalog: a public movie API whose payloads vary in
//! shape between endpoints, and Google Drive video files. Both mappers are
//! pure; fetching and de-duplication happen in the API layer.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::models::movie::{MovieSource, NewMovie};
use crate::models::movie_source::{DriveFile, DriveImportRequest};

/// Director used when the source has none.
pub const UNKNOWN_DIRECTOR: &str = "Unknown";

/// Genre used for Drive imports without one.
pub const UNCATEGORIZED_GENRE: &str = "Uncategorized";

lazy_static! {
    static ref FILE_EXTENSION: Regex = Regex::new(r"\.[^/.]+$").unwrap();
}

/// Errors mapping an external payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("External movie has no title")]
    MissingTitle,

    #[error("External movie has no playable video")]
    MissingVideo,

    #[error("External payload is not an object")]
    NotAnObject,
}

fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_str(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| non_empty_str(obj, key))
}

/// Strings or `{ "name": ... }` objects, blanks dropped.
fn names(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.as_str()),
            Value::Object(o) => o.get("name").and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn array<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Vec<Value>> {
    obj.get(key).and_then(Value::as_array)
}

fn year(obj: &Map<String, Value>) -> Option<i32> {
    let year = match obj.get("year")? {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    year.filter(|y| *y > 0)
}

fn director(obj: &Map<String, Value>) -> String {
    let joined = match obj.get("director") {
        Some(Value::Array(list)) => names(list).join(", "),
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    };
    if joined.is_empty() {
        UNKNOWN_DIRECTOR.to_string()
    } else {
        joined
    }
}

/// First episode's first server link, preferring the embed player.
fn episode_link(episodes: Option<&Vec<Value>>) -> Option<String> {
    let server = episodes?
        .first()?
        .get("server_data")?
        .as_array()?
        .first()?
        .as_object()?;
    first_str(server, &["link_embed", "link_m3u8"])
}

/// Maps a movie API payload to a new movie.
///
/// Detail endpoints wrap the movie as `{ "movie": {...}, "episodes": [...] }`;
/// list and search endpoints return the movie object directly. Both shapes
/// are accepted.
pub fn map_api_movie(
    payload: &Value,
    api_id: &str,
    current_year: i32,
    uploaded_by: Option<Uuid>,
) -> Result<NewMovie, ImportError> {
    let root = payload.as_object().ok_or(ImportError::NotAnObject)?;
    let movie = root
        .get("movie")
        .and_then(Value::as_object)
        .unwrap_or(root);
    let episodes = array(root, "episodes").or_else(|| array(movie, "episodes"));

    let title = first_str(movie, &["name", "title", "originalName", "origin_name"])
        .ok_or(ImportError::MissingTitle)?;

    let description =
        first_str(movie, &["content", "description", "overview"]).unwrap_or_default();

    let genre = match array(movie, "category") {
        Some(categories) => names(categories),
        None => array(movie, "genres").map(|g| names(g)).unwrap_or_default(),
    };

    let actors = match array(movie, "actor") {
        Some(actors) => names(actors),
        None => array(movie, "cast").map(|c| names(c)).unwrap_or_default(),
    };

    let video_url = episode_link(episodes)
        .or_else(|| first_str(movie, &["videoUrl", "video_url"]))
        .ok_or(ImportError::MissingVideo)?;

    Ok(NewMovie {
        title,
        description,
        genre,
        release_year: Some(year(movie).unwrap_or(current_year)),
        director: Some(director(movie)),
        actors,
        poster: first_str(movie, &["thumb_url", "poster_path", "posterUrl", "poster_url"]),
        video_url,
        source: MovieSource::Api,
        api_id: Some(api_id.to_string()),
        drive_file_id: None,
        uploaded_by,
    })
}

/// File name without its last extension.
pub fn strip_extension(name: &str) -> String {
    FILE_EXTENSION.replace(name, "").into_owned()
}

/// Comma separated list, trimmed, blanks dropped.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Embeddable player URL for a Drive file.
pub fn drive_preview_url(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/preview", file_id)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Maps a Drive video file to a new movie, applying the moderator's overrides.
pub fn map_drive_file(
    file: &DriveFile,
    overrides: &DriveImportRequest,
    current_year: i32,
    uploaded_by: Option<Uuid>,
) -> Result<NewMovie, ImportError> {
    let title = non_blank(overrides.title.as_deref())
        .or_else(|| non_blank(Some(&strip_extension(&file.name))))
        .ok_or(ImportError::MissingTitle)?;

    let description = non_blank(overrides.description.as_deref())
        .or_else(|| non_blank(file.description.as_deref()))
        .unwrap_or_else(|| format!("Movie {}", title));

    let genre = overrides
        .genre
        .as_deref()
        .map(split_list)
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| vec![UNCATEGORIZED_GENRE.to_string()]);

    let actors = overrides
        .actors
        .as_deref()
        .map(split_list)
        .unwrap_or_default();

    Ok(NewMovie {
        title,
        description,
        genre,
        release_year: Some(overrides.release_year.unwrap_or(current_year)),
        director: Some(
            non_blank(overrides.director.as_deref())
                .unwrap_or_else(|| UNKNOWN_DIRECTOR.to_string()),
        ),
        actors,
        poster: non_blank(file.thumbnail_link.as_deref()),
        video_url: drive_preview_url(&file.id),
        source: MovieSource::GoogleDrive,
        api_id: None,
        drive_file_id: Some(file.id.clone()),
        uploaded_by,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_map_wrapped_detail_payload() {
        let payload = json!({
            "status": true,
            "movie": {
                "name": "Mai",
                "origin_name": "Mai",
                "content": "A masseuse's past catches up with her.",
                "category": [{"name": "Drama"}, {"name": "Romance"}],
                "year": 2024,
                "director": ["Tran Thanh"],
                "actor": ["Phuong Anh Dao", "Tuan Tran"],
                "thumb_url": "https://img.example.com/mai.jpg"
            },
            "episodes": [{
                "server_name": "#1",
                "server_data": [{
                    "link_embed": "https://player.example.com/embed/mai",
                    "link_m3u8": "https://cdn.example.com/mai.m3u8"
                }]
            }]
        });

        let uploader = Uuid::new_v4();
        let movie = map_api_movie(&payload, "mai", 2020, Some(uploader)).unwrap();
        assert_eq!(movie.title, "Mai");
        assert_eq!(movie.genre, vec!["Drama", "Romance"]);
        assert_eq!(movie.release_year, Some(2024));
        assert_eq!(movie.director.as_deref(), Some("Tran Thanh"));
        assert_eq!(movie.actors.len(), 2);
        assert_eq!(movie.poster.as_deref(), Some("https://img.example.com/mai.jpg"));
        assert_eq!(movie.video_url, "https://player.example.com/embed/mai");
        assert_eq!(movie.source, MovieSource::Api);
        assert_eq!(movie.api_id.as_deref(), Some("mai"));
        assert_eq!(movie.uploaded_by, Some(uploader));
    }

    #[test]
    fn test_map_flat_payload_fallbacks() {
        let payload = json!({
            "title": "Arrival",
            "overview": "Linguist meets heptapods.",
            "genres": [{"name": "Sci-Fi"}, "Drama"],
            "cast": [{"name": "Amy Adams"}, {"name": "Jeremy Renner"}],
            "poster_path": "https://img.example.com/arrival.jpg",
            "video_url": "https://cdn.example.com/arrival.mp4"
        });

        let movie = map_api_movie(&payload, "329865", 2016, None).unwrap();
        assert_eq!(movie.title, "Arrival");
        assert_eq!(movie.description, "Linguist meets heptapods.");
        assert_eq!(movie.genre, vec!["Sci-Fi", "Drama"]);
        assert_eq!(movie.actors, vec!["Amy Adams", "Jeremy Renner"]);
        assert_eq!(movie.release_year, Some(2016));
        assert_eq!(movie.director.as_deref(), Some(UNKNOWN_DIRECTOR));
        assert_eq!(movie.video_url, "https://cdn.example.com/arrival.mp4");
    }

    #[test]
    fn test_map_uses_m3u8_when_no_embed() {
        let payload = json!({
            "movie": {"name": "Lat Mat 7"},
            "episodes": [{"server_data": [{"link_embed": "", "link_m3u8": "https://cdn.example.com/lm7.m3u8"}]}]
        });
        let movie = map_api_movie(&payload, "lat-mat-7", 2024, None).unwrap();
        assert_eq!(movie.video_url, "https://cdn.example.com/lm7.m3u8");
    }

    #[test]
    fn test_map_string_year_and_director() {
        let payload = json!({
            "name": "Bo Gia",
            "year": "2021",
            "director": "Vu Ngoc Dang",
            "videoUrl": "https://cdn.example.com/bogia.mp4"
        });
        let movie = map_api_movie(&payload, "bo-gia", 2000, None).unwrap();
        assert_eq!(movie.release_year, Some(2021));
        assert_eq!(movie.director.as_deref(), Some("Vu Ngoc Dang"));
        assert_eq!(movie.description, "");
    }

    #[test]
    fn test_map_errors() {
        assert_eq!(
            map_api_movie(&json!([]), "x", 2024, None),
            Err(ImportError::NotAnObject)
        );
        assert_eq!(
            map_api_movie(&json!({"videoUrl": "https://x.example/v.mp4"}), "x", 2024, None),
            Err(ImportError::MissingTitle)
        );
        assert_eq!(
            map_api_movie(&json!({"name": "No Video"}), "x", 2024, None),
            Err(ImportError::MissingVideo)
        );
    }

    fn drive_file() -> DriveFile {
        DriveFile {
            id: "1AbC".to_string(),
            name: "the.road.home.mp4".to_string(),
            mime_type: Some("video/mp4".to_string()),
            description: None,
            thumbnail_link: Some("https://lh3.example.com/thumb".to_string()),
            web_view_link: None,
        }
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("movie.mp4"), "movie");
        assert_eq!(strip_extension("the.road.home.mkv"), "the.road.home");
        assert_eq!(strip_extension("no_extension"), "no_extension");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" Drama, ,Comedy "), vec!["Drama", "Comedy"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_map_drive_file_defaults() {
        let file = drive_file();
        let overrides = DriveImportRequest {
            file_id: file.id.clone(),
            ..Default::default()
        };

        let movie = map_drive_file(&file, &overrides, 2025, None).unwrap();
        assert_eq!(movie.title, "the.road.home");
        assert_eq!(movie.description, "Movie the.road.home");
        assert_eq!(movie.genre, vec![UNCATEGORIZED_GENRE]);
        assert_eq!(movie.release_year, Some(2025));
        assert_eq!(movie.director.as_deref(), Some(UNKNOWN_DIRECTOR));
        assert!(movie.actors.is_empty());
        assert_eq!(movie.poster.as_deref(), Some("https://lh3.example.com/thumb"));
        assert_eq!(movie.video_url, "https://drive.google.com/file/d/1AbC/preview");
        assert_eq!(movie.source, MovieSource::GoogleDrive);
        assert_eq!(movie.drive_file_id.as_deref(), Some("1AbC"));
    }

    #[test]
    fn test_map_drive_file_overrides() {
        let file = drive_file();
        let overrides = DriveImportRequest {
            file_id: file.id.clone(),
            title: Some("The Road Home".to_string()),
            description: Some("Zhang Yimou, 1999.".to_string()),
            genre: Some("Drama, Romance".to_string()),
            release_year: Some(1999),
            director: Some("Zhang Yimou".to_string()),
            actors: Some("Zhang Ziyi, Sun Honglei".to_string()),
        };

        let movie = map_drive_file(&file, &overrides, 2025, None).unwrap();
        assert_eq!(movie.title, "The Road Home");
        assert_eq!(movie.genre, vec!["Drama", "Romance"]);
        assert_eq!(movie.release_year, Some(1999));
        assert_eq!(movie.actors, vec!["Zhang Ziyi", "Sun Honglei"]);
    }

    #[test]
    fn test_map_drive_file_uses_file_description() {
        let mut file = drive_file();
        file.description = Some("Uploaded from camera".to_string());
        let overrides = DriveImportRequest {
            file_id: file.id.clone(),
            ..Default::default()
        };
        let movie = map_drive_file(&file, &overrides, 2025, None).unwrap();
        assert_eq!(movie.description, "Uploaded from camera");
    }
}
