//! Domain layer for the movie catalog backend.
//!
//! This crate contains:
//! - Domain models and request/response types
//! - Role ordering, invite-code rules and rating arithmetic
//! - Mappers from external catalog payloads to movies

pub mod models;
pub mod services;
