//! Business services and external clients.

pub mod auth;
pub mod catalog;
pub mod google_drive;
pub mod google_oauth;
pub mod movie_api;

pub use auth::{AuthError, AuthResult, AuthService};
pub use catalog::{CatalogError, CatalogService};
pub use google_drive::{DriveClient, DriveError};
pub use google_oauth::{GoogleOAuthClient, GoogleProfile, OAuthError};
pub use movie_api::{MovieApiClient, MovieApiError};
