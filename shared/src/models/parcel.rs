//! Land parcel models
//!
//! A land parcel aggregates its named area fragments (sub parcels) and the
//! crop-turnover rows assigned to them. Sub parcels and crop rows are edited
//! in memory and submitted together with the parcel as one aggregate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::types::{GeoPoint, MediaReference};

/// Crop-turnover years the form currently offers
pub const SUPPORTED_TURNOVER_YEARS: &[i32] = &[2023, 2024, 2025, 2026, 2027];

/// Slot positions a crop row may occupy within one sub parcel and year.
/// The two values are opaque slots with no further meaning.
pub const TURNOVER_ORDERS: &[i16] = &[1, 2];

/// Identifier of a row that may not have been persisted yet.
///
/// Rows created in the form carry a client-generated `Draft` token until the
/// first successful save, after which the server-assigned id takes over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RecordId {
    Persisted(Uuid),
    Draft(Uuid),
}

impl RecordId {
    /// Generate a fresh client-side token
    pub fn draft() -> Self {
        RecordId::Draft(Uuid::new_v4())
    }

    /// Server-assigned id, if the row has been persisted
    pub fn persisted(&self) -> Option<Uuid> {
        match self {
            RecordId::Persisted(id) => Some(*id),
            RecordId::Draft(_) => None,
        }
    }
}

/// Editing state of a row held in the form.
///
/// Deletion is not applied immediately: a row marked `PendingDeletion` stays
/// in the set so dependent rows can react, and is dropped only when the
/// aggregate is finalized after a successful save.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RowState {
    #[default]
    Active,
    PendingDeletion,
}

impl RowState {
    pub fn is_active(&self) -> bool {
        matches!(self, RowState::Active)
    }
}

/// Ownership status of a land parcel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipStatus {
    Owned,
    Rented,
}

/// Land parcel fields as edited in the form.
///
/// `id` is absent until the parcel has been persisted. Contract dates are
/// meaningful only while `ownership_status` is `Rented` and are stripped at
/// submission time otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "crate::validation::validate_parcel_form_fields"))]
pub struct LandParcelForm {
    pub id: Option<Uuid>,
    #[validate(length(min = 1, max = 32))]
    pub code: String,
    #[validate(length(min = 1, max = 128))]
    pub location: String,
    pub total_area: Decimal,
    pub utilised_area: Decimal,
    pub ownership_status: OwnershipStatus,
    pub cadastral_no: Option<String>,
    pub organic_transition_date: Option<NaiveDate>,
    pub applied_standards: Option<String>,
    pub buffer_zone: Option<String>,
    pub contract_start: Option<NaiveDate>,
    pub contract_end: Option<NaiveDate>,
    pub coordinates: Option<GeoPoint>,
    pub map_document: Option<MediaReference>,
}

/// A named area fragment of one land parcel.
///
/// `code` is the 1-based position among non-deleted fragments. It is a view
/// of the ordering, recomputed on every structural change, never edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubParcel {
    pub id: RecordId,
    pub code: u32,
    pub area: Decimal,
    pub state: RowState,
}

impl SubParcel {
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// One crop-turnover row: a crop assigned to a sub parcel for a year and slot.
///
/// `sub_parcel_id` may be temporarily unset while editing (a freshly added
/// row, or a row orphaned by a sub parcel deletion); saving requires it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropAssignment {
    pub id: RecordId,
    pub land_parcel_id: Option<Uuid>,
    pub year: i32,
    pub order: i16,
    pub crop_id: Option<Uuid>,
    pub sub_parcel_id: Option<RecordId>,
    pub planting_date: Option<NaiveDate>,
    pub state: RowState,
}

impl CropAssignment {
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}
