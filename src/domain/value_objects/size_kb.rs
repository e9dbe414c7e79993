use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Object size in kilobytes (1 KB = 1024 bytes), kept at two decimal places.
///
/// Rounding is half away from zero on the value scaled by 100, so
/// `SizeKb::from_byte_len(n)` and `SizeKb::new(n as f64 / 1024.0)` always agree.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeKb(f64);

impl SizeKb {
    const BYTES_PER_KB: f64 = 1024.0;
    const SCALE: f64 = 100.0;

    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() || value < 0.0 {
            return Err(DomainError::InvalidSize(value));
        }
        Ok(Self(Self::round(value)))
    }

    pub fn from_byte_len(len: usize) -> Self {
        Self(Self::round(len as f64 / Self::BYTES_PER_KB))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    fn round(value: f64) -> f64 {
        (value * Self::SCALE).round() / Self::SCALE
    }
}

impl std::fmt::Display for SizeKb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
