//! Field validators shared by request DTOs.

use validator::ValidationError;

/// Maximum number of genre tags on a movie.
pub const MAX_GENRES: usize = 20;

/// Maximum number of actors on a movie.
pub const MAX_ACTORS: usize = 100;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Rejects strings that are empty or whitespace only.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Value cannot be blank"))
    } else {
        Ok(())
    }
}

/// Genre tags must be non-blank and there can be at most [`MAX_GENRES`].
pub fn validate_genres(genres: &[String]) -> Result<(), ValidationError> {
    if genres.len() > MAX_GENRES {
        return Err(error("genres_count", "Too many genres (max 20)"));
    }
    if genres.iter().any(|g| g.trim().is_empty()) {
        return Err(error("genre_blank", "Genre names cannot be blank"));
    }
    Ok(())
}

/// Actor names must be non-blank and there can be at most [`MAX_ACTORS`].
pub fn validate_actors(actors: &[String]) -> Result<(), ValidationError> {
    if actors.len() > MAX_ACTORS {
        return Err(error("actors_count", "Too many actors (max 100)"));
    }
    if actors.iter().any(|a| a.trim().is_empty()) {
        return Err(error("actor_blank", "Actor names cannot be blank"));
    }
    Ok(())
}

/// Accepts an empty string or an absolute http(s) URL.
pub fn validate_media_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() || url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(error("media_url", "URL must start with http:// or https://"))
    }
}

/// Invite codes are 4 to 64 ASCII letters, digits or hyphens.
pub fn validate_invite_code(code: &str) -> Result<(), ValidationError> {
    let valid_len = (4..=64).contains(&code.len());
    let valid_chars = code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid_len && valid_chars {
        Ok(())
    } else {
        Err(error("invite_code_format", "Invalid invite code format"))
    }
}
