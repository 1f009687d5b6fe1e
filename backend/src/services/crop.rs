//! Crop catalog service
//!
//! The catalog backs the crop picker in the parcel form: an ordered list of
//! crop codes with localized display names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Crop catalog service
#[derive(Clone)]
pub struct CropService {
    db: PgPool,
}

/// Stored crop
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CropRow {
    pub id: Uuid,
    pub code: String,
    pub name_en: String,
    pub name_tr: String,
    pub created_at: DateTime<Utc>,
}

/// Input for adding a crop to the catalog
#[derive(Debug, Deserialize)]
pub struct CreateCropInput {
    pub code: String,
    pub name_en: String,
    pub name_tr: String,
}

impl CropService {
    /// Create a new CropService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all crops eligible for assignment, ordered by code
    pub async fn get_crops(&self) -> AppResult<Vec<CropRow>> {
        let crops = sqlx::query_as::<_, CropRow>(
            r#"
            SELECT id, code, name_en, name_tr, created_at
            FROM crops
            ORDER BY code ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(crops)
    }

    /// Add a crop to the catalog
    pub async fn create_crop(&self, input: CreateCropInput) -> AppResult<CropRow> {
        if input.code.trim().is_empty() {
            return Err(AppError::Validation {
                field: "code".to_string(),
                message: "Crop code cannot be empty".to_string(),
                message_tr: "Ürün kodu boş olamaz".to_string(),
            });
        }
        if input.name_en.trim().is_empty() || input.name_tr.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Crop names cannot be empty".to_string(),
                message_tr: "Ürün adı boş olamaz".to_string(),
            });
        }

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM crops WHERE LOWER(code) = LOWER($1)",
        )
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "crop".to_string(),
                message: "A crop with this code already exists".to_string(),
                message_tr: "Bu kodla kayıtlı bir ürün zaten var".to_string(),
            });
        }

        let crop = sqlx::query_as::<_, CropRow>(
            r#"
            INSERT INTO crops (code, name_en, name_tr)
            VALUES ($1, $2, $3)
            RETURNING id, code, name_en, name_tr, created_at
            "#,
        )
        .bind(&input.code)
        .bind(&input.name_en)
        .bind(&input.name_tr)
        .fetch_one(&self.db)
        .await?;

        Ok(crop)
    }
}
