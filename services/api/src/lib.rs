//! services/api/src/lib.rs
//!
//! The library half of the `api` service: configuration, adapters, the
//! submission pipeline, and the Axum web layer. The binaries under
//! `src/bin/` wire these together.

pub mod adapters;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod web;
