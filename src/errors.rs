// ABOUTME: Error types for the reveal-slides application
// ABOUTME: Provides structured error handling for each stage of the conversion

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlidesError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to fetch remote resource: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("Failed to download {url}: HTTP {status}")]
    DownloadError { url: String, status: u16 },

    #[error("Archive extraction failed: {0}")]
    ArchiveError(String),

    #[error("Document structure error: {0}")]
    DocumentError(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),
}

// Implement conversion from anyhow::Error to our SlidesError
impl From<anyhow::Error> for SlidesError {
    fn from(err: anyhow::Error) -> Self {
        SlidesError::ValidationError(err.to_string())
    }
}

// Implement conversion from zip errors
impl From<zip::result::ZipError> for SlidesError {
    fn from(err: zip::result::ZipError) -> Self {
        SlidesError::ArchiveError(format!("ZIP operation failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, SlidesError>;
