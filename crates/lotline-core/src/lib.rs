//! Core types and the deal aggregation engine for lotline.
//!
//! This crate is deliberately free of HTTP and terminal dependencies. The
//! feed server and the terminal UI depend on it; it depends on neither.

pub mod curated;
pub mod deal;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod query;
pub mod store;
pub mod tracker;

pub use error::{Error, IngestionError, Result, ValidationError};
