use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{
    entities::ImageMetadata,
    errors::DomainError,
    value_objects::SizeKb,
};

/// DTO for the extract activity input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub blob_name: Option<String>,
}

impl ExtractRequest {
    pub fn for_blob(blob_name: impl Into<String>) -> Self {
        Self {
            blob_name: Some(blob_name.into()),
        }
    }

    /// Read the request from an arbitrary JSON payload.
    ///
    /// Anything that is not an object carrying a string `blob_name` yields a
    /// request without one, which the activity rejects as missing input.
    pub fn from_json(payload: &serde_json::Value) -> Self {
        Self {
            blob_name: payload
                .get("blob_name")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        }
    }
}

/// DTO for metadata records exchanged between the two activities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MetadataRecord {
    #[validate(length(min = 1))]
    pub file_name: String,
    #[validate(range(min = 0.0))]
    pub size_kb: f64,
    #[validate(range(min = 1))]
    pub width: u32,
    #[validate(range(min = 1))]
    pub height: u32,
    pub format: Option<String>,
}

impl From<ImageMetadata> for MetadataRecord {
    fn from(metadata: ImageMetadata) -> Self {
        Self {
            size_kb: metadata.size_kb().value(),
            width: metadata.width(),
            height: metadata.height(),
            format: metadata.format().map(|f| f.to_string()),
            file_name: metadata.file_name().to_string(),
        }
    }
}

impl TryFrom<MetadataRecord> for ImageMetadata {
    type Error = DomainError;

    fn try_from(record: MetadataRecord) -> Result<Self, Self::Error> {
        ImageMetadata::new(
            record.file_name,
            SizeKb::new(record.size_kb)?,
            record.width,
            record.height,
            record.format,
        )
    }
}
