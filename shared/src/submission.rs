//! Assembly of the land parcel aggregate for submission
//!
//! The whole aggregate travels as one request; there is no partial or staged
//! submission of sub parcels or crop rows. Soft-deleted rows are filtered
//! out here, since their removal becomes definitive with the save itself.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CropAssignment, LandParcelForm, OwnershipStatus, SubParcel};

/// Wire payload for creating or updating a land parcel aggregate.
/// Nested collections are plain ordered lists of records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelSubmission {
    #[serde(flatten)]
    pub parcel: LandParcelForm,
    pub sub_parcels: Vec<SubParcel>,
    pub crops: Vec<CropAssignment>,
}

/// Assemble the create-variant payload
pub fn assemble_for_create(
    parcel: &LandParcelForm,
    sub_parcels: &[SubParcel],
    assignments: &[CropAssignment],
) -> ParcelSubmission {
    ParcelSubmission {
        parcel: strip_contract_dates(parcel.clone()),
        sub_parcels: surviving_sub_parcels(sub_parcels),
        crops: surviving_assignments(assignments),
    }
}

/// Assemble the update-variant payload: every surviving crop row is
/// re-stamped with the owning parcel id
pub fn assemble_for_update(
    parcel_id: Uuid,
    parcel: &LandParcelForm,
    sub_parcels: &[SubParcel],
    assignments: &[CropAssignment],
) -> ParcelSubmission {
    let mut parcel = strip_contract_dates(parcel.clone());
    parcel.id = Some(parcel_id);

    let crops = surviving_assignments(assignments)
        .into_iter()
        .map(|mut row| {
            row.land_parcel_id = Some(parcel_id);
            row
        })
        .collect();

    ParcelSubmission {
        parcel,
        sub_parcels: surviving_sub_parcels(sub_parcels),
        crops,
    }
}

/// Contract dates carry meaning only for rented parcels
fn strip_contract_dates(mut parcel: LandParcelForm) -> LandParcelForm {
    if parcel.ownership_status == OwnershipStatus::Owned {
        parcel.contract_start = None;
        parcel.contract_end = None;
    }
    parcel
}

fn surviving_sub_parcels(set: &[SubParcel]) -> Vec<SubParcel> {
    set.iter().filter(|sp| sp.is_active()).cloned().collect()
}

fn surviving_assignments(set: &[CropAssignment]) -> Vec<CropAssignment> {
    set.iter().filter(|row| row.is_active()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{add_assignment, add_sub_parcel, mark_sub_parcel_deleted};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn rented_parcel() -> LandParcelForm {
        LandParcelForm {
            id: None,
            code: "P-104".to_string(),
            location: "Kızılcaova".to_string(),
            total_area: Decimal::from(20),
            utilised_area: Decimal::from(10),
            ownership_status: OwnershipStatus::Rented,
            cadastral_no: Some("104/7".to_string()),
            organic_transition_date: None,
            applied_standards: None,
            buffer_zone: None,
            contract_start: NaiveDate::from_ymd_opt(2024, 1, 1),
            contract_end: NaiveDate::from_ymd_opt(2026, 1, 1),
            coordinates: None,
            map_document: None,
        }
    }

    #[test]
    fn create_filters_pending_deletion_rows() {
        let subs = add_sub_parcel(&add_sub_parcel(&[]));
        let doomed = subs[0].id;
        let subs = mark_sub_parcel_deleted(&subs, doomed);
        let crops = add_assignment(&[], 2024);

        let payload = assemble_for_create(&rented_parcel(), &subs, &crops);
        assert_eq!(payload.sub_parcels.len(), 1);
        assert_eq!(payload.crops.len(), 1);
    }

    #[test]
    fn update_restamps_parcel_id_on_crops() {
        let parcel_id = Uuid::new_v4();
        let crops = add_assignment(&add_assignment(&[], 2024), 2025);

        let payload = assemble_for_update(parcel_id, &rented_parcel(), &[], &crops);
        assert_eq!(payload.parcel.id, Some(parcel_id));
        assert!(payload
            .crops
            .iter()
            .all(|row| row.land_parcel_id == Some(parcel_id)));
    }

    #[test]
    fn switching_to_owned_strips_contract_dates() {
        let mut parcel = rented_parcel();
        parcel.ownership_status = OwnershipStatus::Owned;

        let payload = assemble_for_update(Uuid::new_v4(), &parcel, &[], &[]);
        assert!(payload.parcel.contract_start.is_none());
        assert!(payload.parcel.contract_end.is_none());
    }

    #[test]
    fn rented_parcel_keeps_contract_dates() {
        let payload = assemble_for_create(&rented_parcel(), &[], &[]);
        assert_eq!(
            payload.parcel.contract_start,
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            payload.parcel.contract_end,
            NaiveDate::from_ymd_opt(2026, 1, 1)
        );
    }
}
