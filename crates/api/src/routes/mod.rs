//! HTTP route handlers.

pub mod auth;
pub mod comments;
pub mod dashboard;
pub mod health;
pub mod invite_codes;
pub mod movie_sources;
pub mod movies;
pub mod notifications;
pub mod users;
