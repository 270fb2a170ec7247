//! Observability setup for Questline.

pub mod tracing_setup;
