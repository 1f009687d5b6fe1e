//! Land parcel service: aggregate reads and the atomic save path for a
//! parcel together with its sub parcels and crop-turnover rows.
//!
//! The client edits children in memory and submits the whole aggregate as
//! one request; children are replaced wholesale inside the save transaction.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::{CropAssignment, OwnershipStatus, RecordId, SubParcel};
use shared::submission::ParcelSubmission;
use shared::validation::{
    validate_parcel_aggregate, validate_parcel_code, validate_turnover_order,
    validate_turnover_year,
};

/// Land parcel service
#[derive(Clone)]
pub struct ParcelService {
    db: PgPool,
}

/// Stored land parcel
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LandParcelRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub code: String,
    pub location: String,
    pub total_area: Decimal,
    pub utilised_area: Decimal,
    pub ownership_status: String,
    pub cadastral_no: Option<String>,
    pub organic_transition_date: Option<NaiveDate>,
    pub applied_standards: Option<String>,
    pub buffer_zone: Option<String>,
    pub contract_start: Option<NaiveDate>,
    pub contract_end: Option<NaiveDate>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub map_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored sub parcel
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SubParcelRow {
    pub id: Uuid,
    pub land_parcel_id: Uuid,
    pub code: i32,
    pub area: Decimal,
}

/// Stored crop-turnover row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CropAssignmentRow {
    pub id: Uuid,
    pub land_parcel_id: Uuid,
    pub sub_parcel_id: Uuid,
    pub year: i32,
    pub turn_order: i16,
    pub crop_id: Option<Uuid>,
    pub planting_date: Option<NaiveDate>,
}

/// Parcel with its children, as served to the edit form
#[derive(Debug, Clone, Serialize)]
pub struct ParcelWithChildren {
    #[serde(flatten)]
    pub parcel: LandParcelRow,
    pub sub_parcels: Vec<SubParcelRow>,
    pub crops: Vec<CropAssignmentRow>,
}

impl ParcelService {
    /// Create a new ParcelService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all parcels for a member
    pub async fn get_parcels(&self, member_id: Uuid) -> AppResult<Vec<LandParcelRow>> {
        let parcels = sqlx::query_as::<_, LandParcelRow>(
            r#"
            SELECT id, member_id, code, location, total_area, utilised_area,
                   ownership_status, cadastral_no, organic_transition_date,
                   applied_standards, buffer_zone, contract_start, contract_end,
                   latitude, longitude, map_url, created_at, updated_at
            FROM land_parcels
            WHERE member_id = $1
            ORDER BY code ASC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.db)
        .await?;

        Ok(parcels)
    }

    /// Get a parcel with its sub parcels and crop rows, ordered for the form
    pub async fn get_parcel_with_children(
        &self,
        member_id: Uuid,
        parcel_id: Uuid,
    ) -> AppResult<ParcelWithChildren> {
        let parcel = sqlx::query_as::<_, LandParcelRow>(
            r#"
            SELECT id, member_id, code, location, total_area, utilised_area,
                   ownership_status, cadastral_no, organic_transition_date,
                   applied_standards, buffer_zone, contract_start, contract_end,
                   latitude, longitude, map_url, created_at, updated_at
            FROM land_parcels
            WHERE id = $1 AND member_id = $2
            "#,
        )
        .bind(parcel_id)
        .bind(member_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Land parcel".to_string()))?;

        let sub_parcels = sqlx::query_as::<_, SubParcelRow>(
            r#"
            SELECT id, land_parcel_id, code, area
            FROM sub_parcels
            WHERE land_parcel_id = $1
            ORDER BY code ASC
            "#,
        )
        .bind(parcel_id)
        .fetch_all(&self.db)
        .await?;

        let crops = sqlx::query_as::<_, CropAssignmentRow>(
            r#"
            SELECT id, land_parcel_id, sub_parcel_id, year, turn_order, crop_id, planting_date
            FROM crop_assignments
            WHERE land_parcel_id = $1
            ORDER BY year ASC, turn_order ASC
            "#,
        )
        .bind(parcel_id)
        .fetch_all(&self.db)
        .await?;

        Ok(ParcelWithChildren {
            parcel,
            sub_parcels,
            crops,
        })
    }

    /// Create a parcel aggregate in one transaction
    pub async fn create_parcel(
        &self,
        member_id: Uuid,
        submission: ParcelSubmission,
    ) -> AppResult<ParcelWithChildren> {
        self.validate_submission(&submission)?;

        // Check for duplicate code within the member
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM land_parcels WHERE member_id = $1 AND LOWER(code) = LOWER($2)",
        )
        .bind(member_id)
        .bind(&submission.parcel.code)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "land_parcel".to_string(),
                message: "A parcel with this code already exists".to_string(),
                message_tr: "Bu kodla kayıtlı bir parsel zaten var".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let parcel = &submission.parcel;
        let parcel_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO land_parcels (member_id, code, location, total_area, utilised_area,
                                      ownership_status, cadastral_no, organic_transition_date,
                                      applied_standards, buffer_zone, contract_start, contract_end,
                                      latitude, longitude, map_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(member_id)
        .bind(&parcel.code)
        .bind(&parcel.location)
        .bind(parcel.total_area)
        .bind(parcel.utilised_area)
        .bind(ownership_as_str(parcel.ownership_status))
        .bind(&parcel.cadastral_no)
        .bind(parcel.organic_transition_date)
        .bind(&parcel.applied_standards)
        .bind(&parcel.buffer_zone)
        .bind(parcel.contract_start)
        .bind(parcel.contract_end)
        .bind(parcel.coordinates.map(|c| c.latitude))
        .bind(parcel.coordinates.map(|c| c.longitude))
        .bind(parcel.map_document.as_ref().map(|m| m.url.clone()))
        .fetch_one(&mut *tx)
        .await?;

        insert_children(&mut tx, parcel_id, &submission.sub_parcels, &submission.crops).await?;

        tx.commit().await?;

        self.get_parcel_with_children(member_id, parcel_id).await
    }

    /// Update a parcel aggregate in one transaction, replacing its children
    pub async fn update_parcel(
        &self,
        member_id: Uuid,
        parcel_id: Uuid,
        submission: ParcelSubmission,
    ) -> AppResult<ParcelWithChildren> {
        // Check if parcel exists
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM land_parcels WHERE id = $1 AND member_id = $2",
        )
        .bind(parcel_id)
        .bind(member_id)
        .fetch_one(&self.db)
        .await?;

        if exists == 0 {
            return Err(AppError::NotFound("Land parcel".to_string()));
        }

        self.validate_submission(&submission)?;

        // Check for duplicate code, excluding this parcel
        let duplicate = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM land_parcels WHERE member_id = $1 AND LOWER(code) = LOWER($2) AND id != $3",
        )
        .bind(member_id)
        .bind(&submission.parcel.code)
        .bind(parcel_id)
        .fetch_one(&self.db)
        .await?;

        if duplicate > 0 {
            return Err(AppError::Conflict {
                resource: "land_parcel".to_string(),
                message: "A parcel with this code already exists".to_string(),
                message_tr: "Bu kodla kayıtlı bir parsel zaten var".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let parcel = &submission.parcel;
        sqlx::query(
            r#"
            UPDATE land_parcels
            SET code = $1, location = $2, total_area = $3, utilised_area = $4,
                ownership_status = $5, cadastral_no = $6, organic_transition_date = $7,
                applied_standards = $8, buffer_zone = $9, contract_start = $10,
                contract_end = $11, latitude = $12, longitude = $13, map_url = $14,
                updated_at = NOW()
            WHERE id = $15
            "#,
        )
        .bind(&parcel.code)
        .bind(&parcel.location)
        .bind(parcel.total_area)
        .bind(parcel.utilised_area)
        .bind(ownership_as_str(parcel.ownership_status))
        .bind(&parcel.cadastral_no)
        .bind(parcel.organic_transition_date)
        .bind(&parcel.applied_standards)
        .bind(&parcel.buffer_zone)
        .bind(parcel.contract_start)
        .bind(parcel.contract_end)
        .bind(parcel.coordinates.map(|c| c.latitude))
        .bind(parcel.coordinates.map(|c| c.longitude))
        .bind(parcel.map_document.as_ref().map(|m| m.url.clone()))
        .bind(parcel_id)
        .execute(&mut *tx)
        .await?;

        // Children are replaced wholesale; persisted rows keep their ids
        sqlx::query("DELETE FROM crop_assignments WHERE land_parcel_id = $1")
            .bind(parcel_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sub_parcels WHERE land_parcel_id = $1")
            .bind(parcel_id)
            .execute(&mut *tx)
            .await?;

        insert_children(&mut tx, parcel_id, &submission.sub_parcels, &submission.crops).await?;

        tx.commit().await?;

        self.get_parcel_with_children(member_id, parcel_id).await
    }

    /// Delete a parcel, refusing while admissions still reference it
    pub async fn delete_parcel(&self, member_id: Uuid, parcel_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM land_parcels WHERE id = $1 AND member_id = $2",
        )
        .bind(parcel_id)
        .bind(member_id)
        .fetch_one(&self.db)
        .await?;

        if exists == 0 {
            return Err(AppError::NotFound("Land parcel".to_string()));
        }

        let admission_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM admissions WHERE land_parcel_id = $1",
        )
        .bind(parcel_id)
        .fetch_one(&self.db)
        .await?;

        if admission_count > 0 {
            return Err(AppError::Validation {
                field: "land_parcel_id".to_string(),
                message: format!(
                    "Cannot delete parcel: {} admissions are linked to it",
                    admission_count
                ),
                message_tr: format!(
                    "Parsel silinemez: {} kabul kaydı bu parsele bağlı",
                    admission_count
                ),
            });
        }

        // Cascade removes sub parcels and crop rows
        sqlx::query("DELETE FROM land_parcels WHERE id = $1")
            .bind(parcel_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Field-level checks first, then the structural engine, mirroring the
    /// order the form itself applies
    fn validate_submission(&self, submission: &ParcelSubmission) -> AppResult<()> {
        if let Err(errors) = submission.parcel.validate() {
            let (field, message) = first_field_error(&errors);
            return Err(AppError::Validation {
                field,
                message,
                message_tr: "Geçersiz alan değeri".to_string(),
            });
        }

        if let Err(msg) = validate_parcel_code(&submission.parcel.code) {
            return Err(AppError::Validation {
                field: "code".to_string(),
                message: msg.to_string(),
                message_tr: "Geçersiz parsel kodu".to_string(),
            });
        }

        for row in submission.crops.iter().filter(|row| row.is_active()) {
            validate_turnover_year(row.year)
                .map_err(|msg| AppError::ValidationError(msg.to_string()))?;
            validate_turnover_order(row.order)
                .map_err(|msg| AppError::ValidationError(msg.to_string()))?;
        }

        validate_parcel_aggregate(&submission.parcel, &submission.sub_parcels, &submission.crops)
            .map_err(|msg| AppError::ValidationError(msg.to_string()))
    }
}

/// Insert the submitted children, resolving draft sub-parcel references to
/// their server-assigned ids
async fn insert_children(
    tx: &mut Transaction<'_, Postgres>,
    parcel_id: Uuid,
    sub_parcels: &[SubParcel],
    crops: &[CropAssignment],
) -> AppResult<()> {
    let mut sub_ids: HashMap<RecordId, Uuid> = HashMap::new();

    for sp in sub_parcels.iter().filter(|sp| sp.is_active()) {
        let row_id = sp.id.persisted().unwrap_or_else(Uuid::new_v4);
        sub_ids.insert(sp.id, row_id);

        sqlx::query(
            r#"
            INSERT INTO sub_parcels (id, land_parcel_id, code, area)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(row_id)
        .bind(parcel_id)
        .bind(sp.code as i32)
        .bind(sp.area)
        .execute(&mut **tx)
        .await?;
    }

    for row in crops.iter().filter(|row| row.is_active()) {
        let sub_ref = row.sub_parcel_id.ok_or_else(|| {
            AppError::ValidationError("Select a sub parcel for all crops".to_string())
        })?;
        let sub_uuid = *sub_ids.get(&sub_ref).ok_or_else(|| {
            AppError::ValidationError(
                "Crop assignment references an unknown sub parcel".to_string(),
            )
        })?;

        let row_id = row.id.persisted().unwrap_or_else(Uuid::new_v4);
        sqlx::query(
            r#"
            INSERT INTO crop_assignments (id, land_parcel_id, sub_parcel_id, year,
                                          turn_order, crop_id, planting_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row_id)
        .bind(parcel_id)
        .bind(sub_uuid)
        .bind(row.year)
        .bind(row.order)
        .bind(row.crop_id)
        .bind(row.planting_date)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

fn ownership_as_str(status: OwnershipStatus) -> &'static str {
    match status {
        OwnershipStatus::Owned => "owned",
        OwnershipStatus::Rented => "rented",
    }
}

/// First field violation from the schema validator, for the error response
fn first_field_error(errors: &validator::ValidationErrors) -> (String, String) {
    for (field, field_errors) in errors.field_errors() {
        if let Some(error) = field_errors.first() {
            // cross-field checks surface under "__all__" with the field in the code
            let field = if field == "__all__" {
                error.code.to_string()
            } else {
                field.to_string()
            };
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("invalid value for {}", field));
            return (field, message);
        }
    }
    ("form".to_string(), "invalid form input".to_string())
}
