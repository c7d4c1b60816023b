//! Movie catalog domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Lowest accepted rating.
pub const MIN_RATING: f64 = 1.0;

/// Highest accepted rating.
pub const MAX_RATING: f64 = 5.0;

/// Where a movie record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieSource {
    Api,
    GoogleDrive,
}

impl MovieSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieSource::Api => "api",
            MovieSource::GoogleDrive => "google_drive",
        }
    }
}

impl FromStr for MovieSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api" => Ok(MovieSource::Api),
            "google_drive" | "drive" => Ok(MovieSource::GoogleDrive),
            _ => Err(format!("Invalid movie source: {}", s)),
        }
    }
}

impl fmt::Display for MovieSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a movie in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub genre: Vec<String>,
    pub release_year: Option<i32>,
    pub director: Option<String>,
    pub actors: Vec<String>,
    pub poster: Option<String>,
    pub video_url: String,
    pub source: MovieSource,
    pub api_id: Option<String>,
    pub drive_file_id: Option<String>,
    pub rating: f64,
    pub rating_count: i32,
    pub views: i64,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to insert a movie. Counters start at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub genre: Vec<String>,
    pub release_year: Option<i32>,
    pub director: Option<String>,
    pub actors: Vec<String>,
    pub poster: Option<String>,
    pub video_url: String,
    pub source: MovieSource,
    pub api_id: Option<String>,
    pub drive_file_id: Option<String>,
    pub uploaded_by: Option<Uuid>,
}

/// Sort orders for the public movie list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovieSort {
    #[default]
    Newest,
    Oldest,
    Rating,
    Views,
}

impl MovieSort {
    /// ORDER BY clause body. Ties fall back to newest first.
    pub fn as_sql(&self) -> &'static str {
        match self {
            MovieSort::Newest => "created_at DESC, id DESC",
            MovieSort::Oldest => "created_at ASC, id ASC",
            MovieSort::Rating => "rating DESC, created_at DESC",
            MovieSort::Views => "views DESC, created_at DESC",
        }
    }

    /// Unknown or missing values sort newest first.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("oldest") => MovieSort::Oldest,
            Some("rating") => MovieSort::Rating,
            Some("views") => MovieSort::Views,
            _ => MovieSort::Newest,
        }
    }
}

/// Query parameters for `GET /movies`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMoviesQuery {
    #[serde(alias = "filter")]
    pub genre: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListMoviesQuery {
    /// Genre filter; "all" and blank mean no filter.
    pub fn genre_filter(&self) -> Option<&str> {
        self.genre
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty() && !g.eq_ignore_ascii_case("all"))
    }

    pub fn sort(&self) -> MovieSort {
        MovieSort::parse_or_default(self.sort_by.as_deref())
    }
}

/// Request to add a movie by hand.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieRequest {
    #[validate(
        length(min = 1, max = 255, message = "Title must be 1-255 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: String,

    #[validate(length(min = 1, max = 10000, message = "Description is required"))]
    pub description: String,

    #[validate(
        length(min = 1, message = "At least one genre is required"),
        custom(function = "shared::validation::validate_genres")
    )]
    pub genre: Vec<String>,

    #[validate(range(min = 1888, max = 2100, message = "Invalid release year"))]
    pub release_year: Option<i32>,

    #[validate(length(max = 255, message = "Director name too long"))]
    pub director: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_actors"))]
    pub actors: Vec<String>,

    #[validate(custom(function = "shared::validation::validate_media_url"))]
    pub poster: Option<String>,

    #[validate(
        length(min = 1, message = "Video URL is required"),
        custom(function = "shared::validation::validate_media_url")
    )]
    pub video_url: String,

    pub source: MovieSource,
}

impl CreateMovieRequest {
    pub fn into_new_movie(self, uploaded_by: Uuid) -> NewMovie {
        NewMovie {
            title: self.title.trim().to_string(),
            description: self.description,
            genre: self.genre,
            release_year: self.release_year,
            director: self.director,
            actors: self.actors,
            poster: self.poster.filter(|p| !p.is_empty()),
            video_url: self.video_url,
            source: self.source,
            api_id: None,
            drive_file_id: None,
            uploaded_by: Some(uploaded_by),
        }
    }
}

/// Partial movie update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovieRequest {
    #[validate(
        length(min = 1, max = 255, message = "Title must be 1-255 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 10000, message = "Description cannot be empty"))]
    pub description: Option<String>,

    #[validate(
        length(min = 1, message = "At least one genre is required"),
        custom(function = "shared::validation::validate_genres")
    )]
    pub genre: Option<Vec<String>>,

    #[validate(range(min = 1888, max = 2100, message = "Invalid release year"))]
    pub release_year: Option<i32>,

    #[validate(length(max = 255, message = "Director name too long"))]
    pub director: Option<String>,

    #[validate(custom(function = "shared::validation::validate_actors"))]
    pub actors: Option<Vec<String>>,

    #[validate(custom(function = "shared::validation::validate_media_url"))]
    pub poster: Option<String>,

    #[validate(
        length(min = 1, message = "Video URL cannot be empty"),
        custom(function = "shared::validation::validate_media_url")
    )]
    pub video_url: Option<String>,
}

/// A single 1-5 rating submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateMovieRequest {
    #[validate(custom(function = "validate_rating"))]
    pub rating: f64,
}

/// Aggregate rating after a submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub rating: f64,
    pub rating_count: i32,
}

/// Paginated movie list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieListResponse {
    pub movies: Vec<Movie>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_movies: i64,
}

/// Rating arithmetic errors.
#[derive(Debug, Error, PartialEq)]
pub enum RatingError {
    #[error("Rating must be between 1 and 5")]
    OutOfRange,
}

/// Rejects anything outside `[1, 5]`, including NaN.
pub fn check_rating(rating: f64) -> Result<(), RatingError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(RatingError::OutOfRange)
    }
}

fn validate_rating(rating: f64) -> Result<(), ValidationError> {
    check_rating(rating).map_err(|e| {
        let mut error = ValidationError::new("rating_range");
        error.message = Some(e.to_string().into());
        error
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The running-average fold the movie repository performs in SQL.
    fn apply_rating(average: f64, count: i32, rating: f64) -> Result<(f64, i32), RatingError> {
        check_rating(rating)?;
        let count = count.max(0);
        let total = average * f64::from(count) + rating;
        let new_count = count + 1;
        Ok((total / f64::from(new_count), new_count))
    }

    #[test]
    fn test_apply_rating_first_submission() {
        assert_eq!(apply_rating(0.0, 0, 4.0), Ok((4.0, 1)));
    }

    #[test]
    fn test_apply_rating_matches_mean() {
        let ratings = [5.0, 3.0, 4.0, 1.0, 2.0, 5.0];
        let (mut avg, mut count) = (0.0, 0);
        for r in ratings {
            (avg, count) = apply_rating(avg, count, r).unwrap();
        }
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
        assert_eq!(count, 6);
        assert!((avg - mean).abs() < 1e-9);
    }

    #[test]
    fn test_apply_rating_rejects_out_of_range() {
        assert_eq!(apply_rating(3.0, 2, 0.0), Err(RatingError::OutOfRange));
        assert_eq!(apply_rating(3.0, 2, 6.0), Err(RatingError::OutOfRange));
        assert_eq!(apply_rating(3.0, 2, f64::NAN), Err(RatingError::OutOfRange));
    }

    #[test]
    fn test_rate_request_validation() {
        assert!(RateMovieRequest { rating: 1.0 }.validate().is_ok());
        assert!(RateMovieRequest { rating: 5.0 }.validate().is_ok());
        assert!(RateMovieRequest { rating: 0.0 }.validate().is_err());
        assert!(RateMovieRequest { rating: 6.0 }.validate().is_err());
        assert!(RateMovieRequest { rating: f64::NAN }.validate().is_err());

        let errors = RateMovieRequest { rating: 0.5 }.validate().unwrap_err();
        let message = errors.field_errors()["rating"][0].message.clone();
        assert_eq!(message.as_deref(), Some("Rating must be between 1 and 5"));
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!(MovieSort::parse_or_default(None), MovieSort::Newest);
        assert_eq!(MovieSort::parse_or_default(Some("rating")), MovieSort::Rating);
        assert_eq!(MovieSort::parse_or_default(Some("VIEWS")), MovieSort::Views);
        assert_eq!(MovieSort::parse_or_default(Some("oldest")), MovieSort::Oldest);
        assert_eq!(MovieSort::parse_or_default(Some("bogus")), MovieSort::Newest);
    }

    #[test]
    fn test_sort_sql() {
        assert!(MovieSort::Newest.as_sql().starts_with("created_at DESC"));
        assert!(MovieSort::Oldest.as_sql().starts_with("created_at ASC"));
        assert!(MovieSort::Rating.as_sql().starts_with("rating DESC"));
        assert!(MovieSort::Views.as_sql().starts_with("views DESC"));
    }

    #[test]
    fn test_genre_filter() {
        let mut q = ListMoviesQuery::default();
        assert_eq!(q.genre_filter(), None);
        q.genre = Some("all".to_string());
        assert_eq!(q.genre_filter(), None);
        q.genre = Some(" Drama ".to_string());
        assert_eq!(q.genre_filter(), Some("Drama"));
    }

    #[test]
    fn test_list_query_accepts_filter_alias() {
        let q: ListMoviesQuery =
            serde_json::from_str(r#"{"filter":"Action","sortBy":"views"}"#).unwrap();
        assert_eq!(q.genre_filter(), Some("Action"));
        assert_eq!(q.sort(), MovieSort::Views);
    }

    #[test]
    fn test_source_serde() {
        assert_eq!(
            serde_json::to_string(&MovieSource::GoogleDrive).unwrap(),
            "\"google_drive\""
        );
        assert_eq!("api".parse::<MovieSource>().unwrap(), MovieSource::Api);
    }

    #[test]
    fn test_create_request_validation() {
        let req: CreateMovieRequest = serde_json::from_value(serde_json::json!({
            "title": "Spirited Away",
            "description": "A girl wanders into the spirit world.",
            "genre": ["Animation"],
            "videoUrl": "https://cdn.example.com/spirited.m3u8",
            "source": "api"
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let uploader = Uuid::new_v4();
        let new_movie = req.clone().into_new_movie(uploader);
        assert_eq!(new_movie.uploaded_by, Some(uploader));
        assert!(new_movie.actors.is_empty());

        let no_genre = CreateMovieRequest {
            genre: vec![],
            ..req.clone()
        };
        assert!(no_genre.validate().is_err());

        let bad_video = CreateMovieRequest {
            video_url: "rtmp://stream".to_string(),
            ..req
        };
        assert!(bad_video.validate().is_err());
    }
}
