//! Shared domain types for Questline.
//!
//! This crate contains the booking and scoring domain of the quest event:
//! characters, locations, quantized booking intervals, the skill taxonomy,
//! grades, and the rating computation, plus the error vocabulary shared
//! across the platform.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror,
//! regex.

pub mod character;
pub mod config;
pub mod error;
pub mod grade;
pub mod interval;
pub mod location;
pub mod rating;
pub mod skill;
pub mod user;
