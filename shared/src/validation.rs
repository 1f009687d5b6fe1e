//! Validation rules for the Organic Farm Records system
//!
//! Field-level checks run first (schema validation on the form inputs); the
//! structural engine in [`validate_parcel_aggregate`] runs at save time over
//! the in-memory candidate state.

use std::collections::HashSet;

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::models::{
    CropAssignment, LandParcelForm, SubParcel, SUPPORTED_TURNOVER_YEARS, TURNOVER_ORDERS,
};

/// Structural rule messages, reported one at a time
pub const MSG_SELECT_SUB_PARCEL: &str = "Select a sub parcel for all crops";
pub const MSG_ZERO_SUB_PARCEL_AREA: &str = "Sub parcel area cannot be zero";
pub const MSG_AREA_EXCEEDS_UTILISED: &str = "Sub parcel area cannot exceed utilised area";
pub const MSG_DUPLICATE_ASSIGNMENT: &str =
    "Crop assignments must be unique by year, sub parcel, and order";

// ============================================================================
// Parcel Structural Validation
// ============================================================================

/// Check a candidate parcel aggregate before it may be saved.
///
/// Rules are evaluated in a fixed order and the first violation is returned
/// alone. Pending-deletion rows are ignored throughout: their removal is
/// finalized by the save this call gates.
pub fn validate_parcel_aggregate(
    parcel: &LandParcelForm,
    sub_parcels: &[SubParcel],
    assignments: &[CropAssignment],
) -> Result<(), &'static str> {
    // 1. every surviving crop row must reference a sub parcel
    if assignments
        .iter()
        .filter(|row| row.is_active())
        .any(|row| row.sub_parcel_id.is_none())
    {
        return Err(MSG_SELECT_SUB_PARCEL);
    }

    // 2. a zero area is tolerated while editing, never at save time
    if sub_parcels
        .iter()
        .filter(|sp| sp.is_active())
        .any(|sp| sp.area.is_zero())
    {
        return Err(MSG_ZERO_SUB_PARCEL_AREA);
    }

    // 3. area conservation: a sum equal to the utilised area is still valid
    let total: Decimal = sub_parcels
        .iter()
        .filter(|sp| sp.is_active())
        .map(|sp| sp.area)
        .sum();
    if total > parcel.utilised_area {
        return Err(MSG_AREA_EXCEEDS_UTILISED);
    }

    // 4. (year, sub parcel, order) must be unique among surviving rows
    let mut seen = HashSet::new();
    for row in assignments.iter().filter(|row| row.is_active()) {
        if let Some(sub_parcel_id) = row.sub_parcel_id {
            if !seen.insert((row.year, sub_parcel_id, row.order)) {
                return Err(MSG_DUPLICATE_ASSIGNMENT);
            }
        }
    }

    Ok(())
}

/// Validate that a turnover year is one the form supports
pub fn validate_turnover_year(year: i32) -> Result<(), &'static str> {
    if SUPPORTED_TURNOVER_YEARS.contains(&year) {
        Ok(())
    } else {
        Err("Year is outside the supported crop-turnover range")
    }
}

/// Validate that a slot value is one of the two offered positions
pub fn validate_turnover_order(order: i16) -> Result<(), &'static str> {
    if TURNOVER_ORDERS.contains(&order) {
        Ok(())
    } else {
        Err("Order must be 1 or 2")
    }
}

// ============================================================================
// Parcel Field Validation (schema level)
// ============================================================================

/// Cross-field checks on the parcel form, wired into the `Validate` derive.
/// Runs before the structural engine; failures are reported per field.
pub fn validate_parcel_form_fields(form: &LandParcelForm) -> Result<(), ValidationError> {
    if form.total_area <= Decimal::ZERO {
        return Err(field_error("total_area", "total area must be positive"));
    }
    if form.utilised_area <= Decimal::ZERO {
        return Err(field_error("utilised_area", "utilised area must be positive"));
    }
    if form.utilised_area > form.total_area {
        return Err(field_error(
            "utilised_area",
            "utilised area cannot exceed total area",
        ));
    }
    if let Some(coords) = &form.coordinates {
        if coords.latitude < Decimal::from(-90) || coords.latitude > Decimal::from(90) {
            return Err(field_error("latitude", "latitude must be between -90 and 90"));
        }
        if coords.longitude < Decimal::from(-180) || coords.longitude > Decimal::from(180) {
            return Err(field_error(
                "longitude",
                "longitude must be between -180 and 180",
            ));
        }
    }
    if let (Some(start), Some(end)) = (form.contract_start, form.contract_end) {
        if start > end {
            return Err(field_error(
                "contract_end",
                "contract end cannot precede contract start",
            ));
        }
    }
    Ok(())
}

fn field_error(field: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(field);
    error.message = Some(message.into());
    error
}

/// Validate a parcel code (unique per member at the persistence layer)
pub fn validate_parcel_code(code: &str) -> Result<(), &'static str> {
    if code.trim().is_empty() {
        return Err("Parcel code cannot be empty");
    }
    if code.len() > 32 {
        return Err("Parcel code must be at most 32 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '/' || c == '.')
    {
        return Err("Parcel code may contain letters, digits, '-', '/' and '.' only");
    }
    Ok(())
}

/// Allowed map upload extensions and size ceiling
const MAP_DOCUMENT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf"];
const MAP_DOCUMENT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Validate the optional parcel map upload by file name and size
pub fn validate_map_document(file_name: &str, size_bytes: u64) -> Result<(), &'static str> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension {
        Some(ext) if MAP_DOCUMENT_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => return Err("Map document must be a JPG, PNG or PDF file"),
    }
    if size_bytes > MAP_DOCUMENT_MAX_BYTES {
        return Err("Map document cannot exceed 10 MB");
    }
    Ok(())
}

// ============================================================================
// Admission Validations
// ============================================================================

/// Validate admission quantities and derive the net weight.
/// `firo` is the tare loss subtracted from the gross weight at intake.
pub fn validate_admission_quantities(
    gross_kg: Decimal,
    firo_kg: Decimal,
) -> Result<Decimal, &'static str> {
    if gross_kg <= Decimal::ZERO {
        return Err("Gross weight must be positive");
    }
    if firo_kg < Decimal::ZERO {
        return Err("Firo cannot be negative");
    }
    if firo_kg > gross_kg {
        return Err("Firo cannot exceed gross weight");
    }
    let net = gross_kg - firo_kg;
    if net.is_zero() {
        return Err("Net weight must be positive");
    }
    Ok(net)
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate member code format (3-10 uppercase alphanumeric)
pub fn validate_member_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 3 {
        return Err("Member code must be at least 3 characters");
    }
    if code.len() > 10 {
        return Err("Member code must be at most 10 characters");
    }
    if !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err("Member code must be uppercase alphanumeric only");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{
        add_assignment, add_sub_parcel, mark_sub_parcel_deleted, update_assignment,
        update_sub_parcel, CropAssignmentPatch, SubParcelPatch,
    };
    use crate::models::{OwnershipStatus, RecordId};
    use validator::Validate;

    fn parcel(utilised: i64) -> LandParcelForm {
        LandParcelForm {
            id: None,
            code: "P-001".to_string(),
            location: "Ovakent".to_string(),
            total_area: Decimal::from(utilised * 2),
            utilised_area: Decimal::from(utilised),
            ownership_status: OwnershipStatus::Owned,
            cadastral_no: None,
            organic_transition_date: None,
            applied_standards: None,
            buffer_zone: None,
            contract_start: None,
            contract_end: None,
            coordinates: None,
            map_document: None,
        }
    }

    fn sub_with_area(set: &[SubParcel], area: i64) -> Vec<SubParcel> {
        let set = add_sub_parcel(set);
        let id = set.last().unwrap().id;
        update_sub_parcel(
            &set,
            id,
            &SubParcelPatch {
                area: Some(Decimal::from(area)),
            },
        )
    }

    fn assigned(set: &[CropAssignment], year: i32, sub: RecordId, order: i16) -> Vec<CropAssignment> {
        let set = add_assignment(set, year);
        let id = set.last().unwrap().id;
        update_assignment(
            &set,
            id,
            &CropAssignmentPatch {
                order: Some(order),
                sub_parcel_id: Some(sub),
                ..Default::default()
            },
        )
    }

    // ========================================================================
    // Structural Engine Tests
    // ========================================================================

    #[test]
    fn aggregate_with_exact_area_and_no_crops_is_valid() {
        let subs = sub_with_area(&[], 10);
        assert!(validate_parcel_aggregate(&parcel(10), &subs, &[]).is_ok());
    }

    #[test]
    fn area_sum_over_utilised_fails_conservation() {
        let subs = sub_with_area(&sub_with_area(&[], 6), 5);
        let err = validate_parcel_aggregate(&parcel(10), &subs, &[]).unwrap_err();
        assert_eq!(err, MSG_AREA_EXCEEDS_UTILISED);
    }

    #[test]
    fn unassigned_crop_row_fails_completeness_first() {
        let subs = sub_with_area(&[], 5);
        let crops = add_assignment(&[], 2024);
        let err = validate_parcel_aggregate(&parcel(10), &subs, &crops).unwrap_err();
        assert_eq!(err, MSG_SELECT_SUB_PARCEL);
    }

    #[test]
    fn completeness_reported_even_when_other_rules_hold() {
        // no sub parcels, no area problems: the unassigned row still blocks
        let crops = add_assignment(&[], 2025);
        let err = validate_parcel_aggregate(&parcel(10), &[], &crops).unwrap_err();
        assert_eq!(err, MSG_SELECT_SUB_PARCEL);
    }

    #[test]
    fn zero_area_sub_parcel_blocks_save() {
        let subs = add_sub_parcel(&[]);
        let err = validate_parcel_aggregate(&parcel(10), &subs, &[]).unwrap_err();
        assert_eq!(err, MSG_ZERO_SUB_PARCEL_AREA);
    }

    #[test]
    fn duplicate_triple_fails_uniqueness() {
        let subs = sub_with_area(&[], 5);
        let sub_id = subs[0].id;
        let crops = assigned(&assigned(&[], 2024, sub_id, 1), 2024, sub_id, 1);
        let err = validate_parcel_aggregate(&parcel(10), &subs, &crops).unwrap_err();
        assert_eq!(err, MSG_DUPLICATE_ASSIGNMENT);
    }

    #[test]
    fn distinct_orders_share_year_and_sub_parcel() {
        let subs = sub_with_area(&[], 5);
        let sub_id = subs[0].id;
        let crops = assigned(&assigned(&[], 2024, sub_id, 1), 2024, sub_id, 2);
        assert!(validate_parcel_aggregate(&parcel(10), &subs, &crops).is_ok());
    }

    #[test]
    fn deleted_rows_are_invisible_to_every_rule() {
        // an oversized sub parcel and a duplicate crop pair, all pending
        // deletion, must not block the save
        let subs = sub_with_area(&sub_with_area(&[], 8), 8);
        let doomed = subs[1].id;
        let subs = mark_sub_parcel_deleted(&subs, doomed);

        let keeper = subs[0].id;
        let crops = assigned(&assigned(&[], 2024, keeper, 1), 2024, keeper, 1);
        let duplicate = crops[1].id;
        let crops = crate::editor::mark_assignment_deleted(&crops, duplicate);

        assert!(validate_parcel_aggregate(&parcel(10), &subs, &crops).is_ok());
    }

    #[test]
    fn validation_is_idempotent() {
        let subs = sub_with_area(&sub_with_area(&[], 6), 5);
        let first = validate_parcel_aggregate(&parcel(10), &subs, &[]);
        let second = validate_parcel_aggregate(&parcel(10), &subs, &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn turnover_year_and_order_ranges() {
        assert!(validate_turnover_year(2023).is_ok());
        assert!(validate_turnover_year(2027).is_ok());
        assert!(validate_turnover_year(2022).is_err());
        assert!(validate_turnover_order(1).is_ok());
        assert!(validate_turnover_order(2).is_ok());
        assert!(validate_turnover_order(3).is_err());
    }

    // ========================================================================
    // Field Validation Tests
    // ========================================================================

    #[test]
    fn utilised_area_cannot_exceed_total() {
        let mut form = parcel(10);
        form.utilised_area = form.total_area + Decimal::ONE;
        assert!(form.validate().is_err());
    }

    #[test]
    fn coordinates_out_of_bounds_rejected() {
        let mut form = parcel(10);
        form.coordinates = Some(crate::types::GeoPoint::new(
            Decimal::from(91),
            Decimal::from(30),
        ));
        assert!(form.validate().is_err());

        form.coordinates = Some(crate::types::GeoPoint::new(
            Decimal::from(38),
            Decimal::from(27),
        ));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn contract_dates_must_be_ordered() {
        let mut form = parcel(10);
        form.ownership_status = OwnershipStatus::Rented;
        form.contract_start = Some(chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        form.contract_end = Some(chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert!(form.validate().is_err());
    }

    #[test]
    fn parcel_code_format() {
        assert!(validate_parcel_code("P-001").is_ok());
        assert!(validate_parcel_code("104/7").is_ok());
        assert!(validate_parcel_code("").is_err());
        assert!(validate_parcel_code("code with spaces").is_err());
    }

    #[test]
    fn map_document_type_and_size() {
        assert!(validate_map_document("parcel.pdf", 1024).is_ok());
        assert!(validate_map_document("scan.JPG", 1024).is_ok());
        assert!(validate_map_document("notes.txt", 1024).is_err());
        assert!(validate_map_document("big.png", 11 * 1024 * 1024).is_err());
    }

    // ========================================================================
    // Admission Validation Tests
    // ========================================================================

    #[test]
    fn net_weight_derived_from_gross_and_firo() {
        let net = validate_admission_quantities(Decimal::from(100), Decimal::from(4)).unwrap();
        assert_eq!(net, Decimal::from(96));
    }

    #[test]
    fn admission_quantity_bounds() {
        assert!(validate_admission_quantities(Decimal::ZERO, Decimal::ZERO).is_err());
        assert!(validate_admission_quantities(Decimal::from(10), Decimal::from(-1)).is_err());
        assert!(validate_admission_quantities(Decimal::from(10), Decimal::from(11)).is_err());
        // firo equal to gross leaves nothing to admit
        assert!(validate_admission_quantities(Decimal::from(10), Decimal::from(10)).is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn member_code_format() {
        assert!(validate_member_code("OVA").is_ok());
        assert!(validate_member_code("KOOP12").is_ok());
        assert!(validate_member_code("ab").is_err());
        assert!(validate_member_code("toolongcodex").is_err());
        assert!(validate_member_code("ko-op").is_err());
    }

    #[test]
    fn email_and_password_checks() {
        assert!(validate_email("uye@koop.org.tr").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }
}
