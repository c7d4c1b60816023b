//! Shared utilities and common types for the movie catalog backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Token signing and verification (JWT, HS256)
//! - Password hashing with Argon2id
//! - Random code generation and HMAC signing
//! - Page/limit pagination math
//! - Field validators used by request DTOs

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
