//! cfimages core library
//!
//! This crate provides the data model, upload configuration, file validation
//! and error taxonomy shared by the client, widget and CLI crates.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{ClientConfig, UploadConfiguration, DEFAULT_ALLOWED_FORMATS};
pub use error::{ErrorMetadata, LogLevel, UploadError, ValidationError};
pub use models::{
    preview_path, AssetId, DirectUploadResponse, DirectUploadResult, SelectedFile,
    UploadOutcome, UploadTarget, UploadTargetRequest,
};
pub use validation::validate;
