//! semnotes-store — Persistence and media host integrations.
//!
//! Implements the `Store` trait as a JSON-snapshotted document store and the
//! `MediaHost` trait for Cloudinary, and owns the portal configuration file.

pub mod config;
pub mod document;
pub mod error;
pub mod media;
pub mod mock;
pub mod snapshot;

pub use config::{create_media_host, load_config, load_config_from, MediaConfig, PortalConfig, ScoringConfig};
pub use document::DocumentStore;
pub use error::MediaError;
