//! Crop catalog models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Language;

/// A crop eligible for turnover assignment, with localized display names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Crop {
    pub id: Uuid,
    pub code: String,
    pub name_en: String,
    pub name_tr: String,
}

impl Crop {
    /// Display name in the requested language
    pub fn display_name(&self, language: &Language) -> &str {
        match language {
            Language::Turkish => &self.name_tr,
            Language::English => &self.name_en,
        }
    }
}
