use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Invalid blob reference: {0}")]
    InvalidReference(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid size in kilobytes: {0}")]
    InvalidSize(f64),

    #[error("File name cannot be empty")]
    EmptyFileName,
}
