//! Domain services for the movie catalog.
//!
//! Services contain business logic that operates on domain models.

pub mod catalog_import;
pub mod notification;

pub use catalog_import::{map_api_movie, map_drive_file, ImportError};
pub use notification::{account_blocked, comment_reply, new_movie_imported};
