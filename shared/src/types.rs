//! Common types used across the system

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Geographic coordinates of a parcel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GeoPoint {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Supported languages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Turkish,
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Turkish => "tr",
            Language::English => "en",
        }
    }
}

/// Reference to an uploaded file, such as a parcel map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaReference {
    pub id: uuid::Uuid,
    pub file_type: MediaType,
    pub url: String,
    pub original_filename: Option<String>,
}

/// Types of media files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Document,
}
