//! Harvester registry service
//!
//! Harvesters are the field workers a member records admissions against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Harvester registry service
#[derive(Clone)]
pub struct HarvesterService {
    db: PgPool,
}

/// Stored harvester
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HarvesterRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a harvester
#[derive(Debug, Deserialize)]
pub struct CreateHarvesterInput {
    pub full_name: String,
    pub phone: Option<String>,
    pub national_id: Option<String>,
}

/// Input for updating a harvester
#[derive(Debug, Deserialize)]
pub struct UpdateHarvesterInput {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub is_active: Option<bool>,
}

impl HarvesterService {
    /// Create a new HarvesterService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all harvesters for a member
    pub async fn get_harvesters(&self, member_id: Uuid) -> AppResult<Vec<HarvesterRow>> {
        let harvesters = sqlx::query_as::<_, HarvesterRow>(
            r#"
            SELECT id, member_id, full_name, phone, national_id, is_active, created_at
            FROM harvesters
            WHERE member_id = $1
            ORDER BY full_name ASC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.db)
        .await?;

        Ok(harvesters)
    }

    /// Register a harvester
    pub async fn create_harvester(
        &self,
        member_id: Uuid,
        input: CreateHarvesterInput,
    ) -> AppResult<HarvesterRow> {
        if input.full_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "full_name".to_string(),
                message: "Harvester name cannot be empty".to_string(),
                message_tr: "Hasatçı adı boş olamaz".to_string(),
            });
        }

        let harvester = sqlx::query_as::<_, HarvesterRow>(
            r#"
            INSERT INTO harvesters (member_id, full_name, phone, national_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, member_id, full_name, phone, national_id, is_active, created_at
            "#,
        )
        .bind(member_id)
        .bind(&input.full_name)
        .bind(&input.phone)
        .bind(&input.national_id)
        .fetch_one(&self.db)
        .await?;

        Ok(harvester)
    }

    /// Update a harvester
    pub async fn update_harvester(
        &self,
        member_id: Uuid,
        harvester_id: Uuid,
        input: UpdateHarvesterInput,
    ) -> AppResult<HarvesterRow> {
        let existing = sqlx::query_as::<_, HarvesterRow>(
            r#"
            SELECT id, member_id, full_name, phone, national_id, is_active, created_at
            FROM harvesters
            WHERE id = $1 AND member_id = $2
            "#,
        )
        .bind(harvester_id)
        .bind(member_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Harvester".to_string()))?;

        if let Some(ref name) = input.full_name {
            if name.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "full_name".to_string(),
                    message: "Harvester name cannot be empty".to_string(),
                    message_tr: "Hasatçı adı boş olamaz".to_string(),
                });
            }
        }

        let full_name = input.full_name.unwrap_or(existing.full_name);
        let phone = input.phone.or(existing.phone);
        let national_id = input.national_id.or(existing.national_id);
        let is_active = input.is_active.unwrap_or(existing.is_active);

        let harvester = sqlx::query_as::<_, HarvesterRow>(
            r#"
            UPDATE harvesters
            SET full_name = $1, phone = $2, national_id = $3, is_active = $4
            WHERE id = $5
            RETURNING id, member_id, full_name, phone, national_id, is_active, created_at
            "#,
        )
        .bind(&full_name)
        .bind(&phone)
        .bind(&national_id)
        .bind(is_active)
        .bind(harvester_id)
        .fetch_one(&self.db)
        .await?;

        Ok(harvester)
    }

    /// Remove a harvester; admissions that referenced it keep the record
    /// with the reference cleared
    pub async fn delete_harvester(&self, member_id: Uuid, harvester_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM harvesters WHERE id = $1 AND member_id = $2")
            .bind(harvester_id)
            .bind(member_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Harvester".to_string()));
        }

        Ok(())
    }
}
