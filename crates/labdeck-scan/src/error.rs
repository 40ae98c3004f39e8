//! Error types for the labdeck-scan crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Nmap not found at path: {path}")]
    ToolMissing { path: String },

    #[error("Nmap failed: {detail}")]
    ToolFailed { detail: String },
}

pub type Result<T> = std::result::Result<T, ScanError>;
