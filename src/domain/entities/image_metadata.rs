use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::value_objects::SizeKb;

/// Structural facts derived from one image object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    file_name: String,
    size_kb: SizeKb,
    width: u32,
    height: u32,
    format: Option<String>,
}

impl ImageMetadata {
    pub fn new(
        file_name: String,
        size_kb: SizeKb,
        width: u32,
        height: u32,
        format: Option<String>,
    ) -> Result<Self, DomainError> {
        if file_name.is_empty() {
            return Err(DomainError::EmptyFileName);
        }

        if width == 0 || height == 0 {
            return Err(DomainError::InvalidDimensions { width, height });
        }

        Ok(Self {
            file_name,
            size_kb,
            width,
            height,
            format,
        })
    }

    // Getters
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size_kb(&self) -> SizeKb {
        self.size_kb
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }
}
