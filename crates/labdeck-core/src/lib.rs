//! labdeck-core: Shared types and settings for the labdeck dashboard backend.
//!
//! This crate provides the foundational types used across all labdeck components:
//! - Discovery types (Host, Link) produced by the scan engine
//! - Health-check types (CheckSpec, HealthResult) for liveness probes
//! - The user-curated dashboard document tree (DashboardConfig)
//! - Runtime settings loaded from file and environment

pub mod settings;
pub mod types;

pub use settings::Settings;
