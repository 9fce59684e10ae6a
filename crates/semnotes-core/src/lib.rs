//! semnotes-core — Domain model, store traits, scoring and progress.
//!
//! This crate defines the documents the portal stores, the async traits the
//! rest of the workspace is built on, and the two pieces of real logic: the
//! leaderboard scoring engine and the per-subject progress aggregator.

pub mod analytics;
pub mod catalog;
pub mod error;
pub mod leaderboard;
pub mod model;
pub mod progress;
pub mod scheduler;
pub mod scoring;
pub mod traits;

pub use error::StoreError;
