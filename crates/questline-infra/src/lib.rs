//! Infrastructure layer for Questline.
//!
//! Contains implementations of the repository and storage ports defined in
//! `questline-core`: SQLite persistence via sqlx and the TOML configuration
//! loader.

pub mod config;
pub mod sqlite;
