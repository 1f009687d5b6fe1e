//! In-memory editing reducers for a land parcel's sub parcels and
//! crop-turnover rows.
//!
//! Every operation takes the current set and returns a new one; nothing is
//! mutated in place and nothing touches the network. The caller holds the
//! returned set as the next editing state and decides when to submit the
//! aggregate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CropAssignment, RecordId, RowState, SubParcel};

/// Fields of a sub parcel the user may edit directly.
/// `code` is excluded: it is always derived from position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubParcelPatch {
    pub area: Option<Decimal>,
}

/// Fields of a crop-turnover row the user may edit directly
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CropAssignmentPatch {
    pub year: Option<i32>,
    pub order: Option<i16>,
    pub crop_id: Option<Uuid>,
    pub sub_parcel_id: Option<RecordId>,
    pub planting_date: Option<NaiveDate>,
}

/// Append a new sub parcel with a fresh draft id and zero area.
/// Zero area is allowed while editing; it blocks saving.
pub fn add_sub_parcel(set: &[SubParcel]) -> Vec<SubParcel> {
    let mut next = set.to_vec();
    next.push(SubParcel {
        id: RecordId::draft(),
        code: 0,
        area: Decimal::ZERO,
        state: RowState::Active,
    });
    renumber_sub_parcels(next)
}

/// Merge a patch into the sub parcel matching `id`; other entries unchanged
pub fn update_sub_parcel(set: &[SubParcel], id: RecordId, patch: &SubParcelPatch) -> Vec<SubParcel> {
    set.iter()
        .map(|sp| {
            if sp.id == id {
                let mut updated = sp.clone();
                if let Some(area) = patch.area {
                    updated.area = area;
                }
                updated
            } else {
                sp.clone()
            }
        })
        .collect()
}

/// Flag the matching sub parcel for deletion without removing it, so crop
/// rows referencing it can be reconciled before the deletion is finalized
pub fn mark_sub_parcel_deleted(set: &[SubParcel], id: RecordId) -> Vec<SubParcel> {
    let next = set
        .iter()
        .map(|sp| {
            if sp.id == id {
                let mut updated = sp.clone();
                updated.state = RowState::PendingDeletion;
                updated
            } else {
                sp.clone()
            }
        })
        .collect();
    renumber_sub_parcels(next)
}

/// Physically drop pending-deletion rows. Called only after the aggregate
/// has been accepted by the backend.
pub fn finalize_sub_parcels(set: &[SubParcel]) -> Vec<SubParcel> {
    let next = set.iter().filter(|sp| sp.is_active()).cloned().collect();
    renumber_sub_parcels(next)
}

/// Reset every surviving sub parcel's `code` to its 1-based position among
/// non-deleted entries. Pending-deletion rows keep their stale label.
fn renumber_sub_parcels(mut set: Vec<SubParcel>) -> Vec<SubParcel> {
    let mut position = 0u32;
    for sp in set.iter_mut() {
        if sp.is_active() {
            position += 1;
            sp.code = position;
        }
    }
    set
}

/// Append a new crop row for the given year with a fresh draft id, slot 1,
/// and no crop or sub parcel selected yet
pub fn add_assignment(set: &[CropAssignment], year: i32) -> Vec<CropAssignment> {
    let mut next = set.to_vec();
    next.push(CropAssignment {
        id: RecordId::draft(),
        land_parcel_id: None,
        year,
        order: 1,
        crop_id: None,
        sub_parcel_id: None,
        planting_date: None,
        state: RowState::Active,
    });
    next
}

/// Merge a patch into the crop row matching `id`.
/// Draft and persisted ids are distinct arms, so equality over the sum type
/// resolves whichever of the two the row carries.
pub fn update_assignment(
    set: &[CropAssignment],
    id: RecordId,
    patch: &CropAssignmentPatch,
) -> Vec<CropAssignment> {
    set.iter()
        .map(|row| {
            if row.id == id {
                let mut updated = row.clone();
                if let Some(year) = patch.year {
                    updated.year = year;
                }
                if let Some(order) = patch.order {
                    updated.order = order;
                }
                if let Some(crop_id) = patch.crop_id {
                    updated.crop_id = Some(crop_id);
                }
                if let Some(sub_parcel_id) = patch.sub_parcel_id {
                    updated.sub_parcel_id = Some(sub_parcel_id);
                }
                if let Some(planting_date) = patch.planting_date {
                    updated.planting_date = Some(planting_date);
                }
                updated
            } else {
                row.clone()
            }
        })
        .collect()
}

/// Flag the matching crop row for deletion without removing it
pub fn mark_assignment_deleted(set: &[CropAssignment], id: RecordId) -> Vec<CropAssignment> {
    set.iter()
        .map(|row| {
            if row.id == id {
                let mut updated = row.clone();
                updated.state = RowState::PendingDeletion;
                updated
            } else {
                row.clone()
            }
        })
        .collect()
}

/// Clear the sub-parcel reference on every surviving crop row that points at
/// a deleted sub parcel. The row itself is preserved: removing a sub parcel
/// must never silently destroy a crop-turnover record, only orphan it for
/// manual repair.
pub fn reconcile_sub_parcel_deletion(
    set: &[CropAssignment],
    deleted: &[RecordId],
) -> Vec<CropAssignment> {
    set.iter()
        .map(|row| {
            let orphaned = row.is_active()
                && row
                    .sub_parcel_id
                    .map(|sp| deleted.contains(&sp))
                    .unwrap_or(false);
            if orphaned {
                let mut updated = row.clone();
                updated.sub_parcel_id = None;
                updated
            } else {
                row.clone()
            }
        })
        .collect()
}

/// Display view: the surviving rows of one year tab. The full multi-year set
/// stays in memory and is submitted together.
pub fn assignments_for_year(set: &[CropAssignment], year: i32) -> Vec<CropAssignment> {
    set.iter()
        .filter(|row| row.is_active() && row.year == year)
        .cloned()
        .collect()
}

/// Physically drop pending-deletion crop rows after a successful save
pub fn finalize_assignments(set: &[CropAssignment]) -> Vec<CropAssignment> {
    set.iter().filter(|row| row.is_active()).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn codes(set: &[SubParcel]) -> Vec<u32> {
        set.iter().filter(|sp| sp.is_active()).map(|sp| sp.code).collect()
    }

    #[test]
    fn add_appends_with_next_code_and_zero_area() {
        let set = add_sub_parcel(&[]);
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].code, 1);
        assert_eq!(set[0].area, Decimal::ZERO);
        assert!(set[0].is_active());

        let set = add_sub_parcel(&set);
        assert_eq!(codes(&set), vec![1, 2]);
    }

    #[test]
    fn added_rows_get_distinct_draft_ids() {
        let set = add_sub_parcel(&add_sub_parcel(&[]));
        assert_ne!(set[0].id, set[1].id);
        assert!(set.iter().all(|sp| sp.id.persisted().is_none()));
    }

    #[test]
    fn update_merges_patch_into_matching_entry_only() {
        let set = add_sub_parcel(&add_sub_parcel(&[]));
        let target = set[0].id;
        let patch = SubParcelPatch {
            area: Some(Decimal::new(25, 1)),
        };
        let set = update_sub_parcel(&set, target, &patch);
        assert_eq!(set[0].area, Decimal::new(25, 1));
        assert_eq!(set[1].area, Decimal::ZERO);
        // update does not renumber
        assert_eq!(codes(&set), vec![1, 2]);
    }

    #[test]
    fn mark_deleted_keeps_row_and_renumbers_survivors() {
        let set = add_sub_parcel(&add_sub_parcel(&add_sub_parcel(&[])));
        let middle = set[1].id;
        let set = mark_sub_parcel_deleted(&set, middle);

        assert_eq!(set.len(), 3, "soft delete must not remove the row");
        assert_eq!(set[1].state, RowState::PendingDeletion);
        assert_eq!(codes(&set), vec![1, 2]);
    }

    #[test]
    fn finalize_drops_pending_rows() {
        let set = add_sub_parcel(&add_sub_parcel(&[]));
        let first = set[0].id;
        let set = mark_sub_parcel_deleted(&set, first);
        let set = finalize_sub_parcels(&set);
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].code, 1);
    }

    #[test]
    fn add_assignment_starts_unassigned_in_slot_one() {
        let set = add_assignment(&[], 2024);
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].year, 2024);
        assert_eq!(set[0].order, 1);
        assert!(set[0].crop_id.is_none());
        assert!(set[0].sub_parcel_id.is_none());
    }

    #[test]
    fn update_assignment_matches_draft_and_persisted_ids() {
        let mut set = add_assignment(&[], 2024);
        let persisted = RecordId::Persisted(Uuid::new_v4());
        set.push(CropAssignment {
            id: persisted,
            land_parcel_id: None,
            year: 2024,
            order: 1,
            crop_id: None,
            sub_parcel_id: None,
            planting_date: None,
            state: RowState::Active,
        });

        let patch = CropAssignmentPatch {
            order: Some(2),
            ..Default::default()
        };
        let set = update_assignment(&set, persisted, &patch);
        assert_eq!(set[1].order, 2);
        assert_eq!(set[0].order, 1, "draft row untouched");

        let draft = set[0].id;
        let set = update_assignment(&set, draft, &patch);
        assert_eq!(set[0].order, 2);
    }

    #[test]
    fn orphan_not_delete() {
        let subs = add_sub_parcel(&[]);
        let sub_id = subs[0].id;

        let mut crops = add_assignment(&[], 2024);
        let crop_id = crops[0].id;
        crops = update_assignment(
            &crops,
            crop_id,
            &CropAssignmentPatch {
                sub_parcel_id: Some(sub_id),
                ..Default::default()
            },
        );

        let subs = mark_sub_parcel_deleted(&subs, sub_id);
        let deleted: Vec<RecordId> = subs
            .iter()
            .filter(|sp| !sp.is_active())
            .map(|sp| sp.id)
            .collect();
        let crops = reconcile_sub_parcel_deletion(&crops, &deleted);

        assert_eq!(crops.len(), 1, "reconciliation must not drop the row");
        assert!(crops[0].is_active());
        assert!(crops[0].sub_parcel_id.is_none());
    }

    #[test]
    fn reconcile_leaves_unrelated_rows_alone() {
        let kept = add_sub_parcel(&[]);
        let crops = add_assignment(&[], 2025);
        let crops = update_assignment(
            &crops,
            crops[0].id,
            &CropAssignmentPatch {
                sub_parcel_id: Some(kept[0].id),
                ..Default::default()
            },
        );
        let other = RecordId::draft();
        let crops = reconcile_sub_parcel_deletion(&crops, &[other]);
        assert_eq!(crops[0].sub_parcel_id, Some(kept[0].id));
    }

    #[test]
    fn year_filter_is_a_pure_view() {
        let set = add_assignment(&add_assignment(&add_assignment(&[], 2024), 2025), 2024);
        let deleted = set[0].id;
        let set = mark_assignment_deleted(&set, deleted);

        let visible = assignments_for_year(&set, 2024);
        assert_eq!(visible.len(), 1);
        assert!(visible.iter().all(|r| r.year == 2024 && r.is_active()));
        // the underlying multi-year set is untouched
        assert_eq!(set.len(), 3);
    }
}
