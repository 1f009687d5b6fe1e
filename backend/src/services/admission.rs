//! Goods admission service
//!
//! Records intake of goods (collection, harvest, purchase) against a land
//! parcel, stamps each record with a generated lot code, and tracks
//! gross/firo/net quantities.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::validate_admission_quantities;

/// Admission service
#[derive(Clone)]
pub struct AdmissionService {
    db: PgPool,
}

/// How the goods entered the cooperative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AdmissionKind {
    Collection,
    Harvest,
    Purchase,
}

/// Stored admission record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdmissionRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub land_parcel_id: Uuid,
    pub harvester_id: Option<Uuid>,
    pub lot_code: String,
    pub kind: AdmissionKind,
    pub gross_kg: Decimal,
    pub firo_kg: Decimal,
    pub net_kg: Decimal,
    pub unit_price: Option<Decimal>,
    pub notes: Option<String>,
    pub admission_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Input for recording an admission
#[derive(Debug, Deserialize)]
pub struct RecordAdmissionInput {
    pub land_parcel_id: Uuid,
    pub harvester_id: Option<Uuid>,
    pub kind: AdmissionKind,
    pub gross_kg: Decimal,
    pub firo_kg: Decimal,
    pub unit_price: Option<Decimal>,
    pub notes: Option<String>,
    pub admission_date: Option<NaiveDate>,
}

/// Admission line as written to the spreadsheet export
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct AdmissionExportRow {
    pub lot_code: String,
    pub admission_date: NaiveDate,
    pub kind: String,
    pub parcel_code: String,
    pub harvester_name: Option<String>,
    pub gross_kg: Decimal,
    pub firo_kg: Decimal,
    pub net_kg: Decimal,
    pub unit_price: Option<Decimal>,
}

impl AdmissionService {
    /// Create a new AdmissionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get all admissions for a member, newest first
    pub async fn get_admissions(&self, member_id: Uuid) -> AppResult<Vec<AdmissionRow>> {
        let admissions = sqlx::query_as::<_, AdmissionRow>(
            r#"
            SELECT id, member_id, land_parcel_id, harvester_id, lot_code, kind,
                   gross_kg, firo_kg, net_kg, unit_price, notes, admission_date, created_at
            FROM admissions
            WHERE member_id = $1
            ORDER BY admission_date DESC, created_at DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.db)
        .await?;

        Ok(admissions)
    }

    /// Get a single admission
    pub async fn get_admission(
        &self,
        member_id: Uuid,
        admission_id: Uuid,
    ) -> AppResult<AdmissionRow> {
        sqlx::query_as::<_, AdmissionRow>(
            r#"
            SELECT id, member_id, land_parcel_id, harvester_id, lot_code, kind,
                   gross_kg, firo_kg, net_kg, unit_price, notes, admission_date, created_at
            FROM admissions
            WHERE id = $1 AND member_id = $2
            "#,
        )
        .bind(admission_id)
        .bind(member_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Admission".to_string()))
    }

    /// Record an admission, deriving the net weight and stamping a lot code
    pub async fn record_admission(
        &self,
        member_id: Uuid,
        input: RecordAdmissionInput,
    ) -> AppResult<AdmissionRow> {
        let net_kg = validate_admission_quantities(input.gross_kg, input.firo_kg).map_err(
            |msg| AppError::Validation {
                field: "gross_kg".to_string(),
                message: msg.to_string(),
                message_tr: "Geçersiz tartım değerleri".to_string(),
            },
        )?;

        // Source parcel must belong to the member
        let parcel_exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM land_parcels WHERE id = $1 AND member_id = $2",
        )
        .bind(input.land_parcel_id)
        .bind(member_id)
        .fetch_one(&self.db)
        .await?;

        if parcel_exists == 0 {
            return Err(AppError::NotFound("Land parcel".to_string()));
        }

        if let Some(harvester_id) = input.harvester_id {
            let harvester_exists = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM harvesters WHERE id = $1 AND member_id = $2",
            )
            .bind(harvester_id)
            .bind(member_id)
            .fetch_one(&self.db)
            .await?;

            if harvester_exists == 0 {
                return Err(AppError::NotFound("Harvester".to_string()));
            }
        }

        let admission_date = input
            .admission_date
            .unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        let member_code =
            sqlx::query_scalar::<_, String>("SELECT member_code FROM members WHERE id = $1")
                .bind(member_id)
                .fetch_one(&mut *tx)
                .await?;

        // Sequence number within the member and year
        let year = admission_date.year();
        let sequence = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM admissions
            WHERE member_id = $1 AND EXTRACT(YEAR FROM admission_date)::int = $2
            "#,
        )
        .bind(member_id)
        .bind(year)
        .fetch_one(&mut *tx)
        .await?;

        let lot_code = generate_lot_code(year, &member_code, sequence + 1);

        let admission = sqlx::query_as::<_, AdmissionRow>(
            r#"
            INSERT INTO admissions (member_id, land_parcel_id, harvester_id, lot_code, kind,
                                    gross_kg, firo_kg, net_kg, unit_price, notes, admission_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, member_id, land_parcel_id, harvester_id, lot_code, kind,
                      gross_kg, firo_kg, net_kg, unit_price, notes, admission_date, created_at
            "#,
        )
        .bind(member_id)
        .bind(input.land_parcel_id)
        .bind(input.harvester_id)
        .bind(&lot_code)
        .bind(input.kind)
        .bind(input.gross_kg)
        .bind(input.firo_kg)
        .bind(net_kg)
        .bind(input.unit_price)
        .bind(&input.notes)
        .bind(admission_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(admission)
    }

    /// Export a member's admissions as CSV for spreadsheet use
    pub async fn export_admissions_csv(&self, member_id: Uuid) -> AppResult<String> {
        let rows = sqlx::query_as::<_, AdmissionExportRow>(
            r#"
            SELECT a.lot_code, a.admission_date, a.kind, p.code AS parcel_code,
                   h.full_name AS harvester_name, a.gross_kg, a.firo_kg, a.net_kg, a.unit_price
            FROM admissions a
            JOIN land_parcels p ON p.id = a.land_parcel_id
            LEFT JOIN harvesters h ON h.id = a.harvester_id
            WHERE a.member_id = $1
            ORDER BY a.admission_date ASC, a.lot_code ASC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.db)
        .await?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &rows {
            writer
                .serialize(row)
                .map_err(|e| AppError::Internal(format!("CSV serialization failed: {}", e)))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("CSV encoding failed: {}", e)))
    }
}

/// Lot code format: OFR-{year}-{member code}-{sequence}
pub fn generate_lot_code(year: i32, member_code: &str, sequence: i64) -> String {
    format!("OFR-{}-{}-{:04}", year, member_code, sequence)
}
