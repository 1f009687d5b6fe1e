//! WebAssembly module for Organic Farm Records
//!
//! Provides client-side computation for the parcel edit form:
//! - sub parcel and crop-turnover editing reducers
//! - save-time validation without a network round-trip
//! - submission payload assembly

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use shared::editor;
use shared::models::{Crop, CropAssignment, LandParcelForm, RecordId, SubParcel};
use shared::submission;
use shared::types::Language;
use shared::validation;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn parse<T: DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Append a new sub parcel to the set
#[wasm_bindgen]
pub fn add_sub_parcel(set_json: &str) -> Result<String, JsValue> {
    let set: Vec<SubParcel> = parse(set_json, "sub parcel set")?;
    to_json(&editor::add_sub_parcel(&set))
}

/// Merge a patch into the sub parcel matching the given id
#[wasm_bindgen]
pub fn update_sub_parcel(set_json: &str, id_json: &str, patch_json: &str) -> Result<String, JsValue> {
    let set: Vec<SubParcel> = parse(set_json, "sub parcel set")?;
    let id: RecordId = parse(id_json, "record id")?;
    let patch: editor::SubParcelPatch = parse(patch_json, "sub parcel patch")?;
    to_json(&editor::update_sub_parcel(&set, id, &patch))
}

/// Flag a sub parcel for deletion and renumber the survivors
#[wasm_bindgen]
pub fn mark_sub_parcel_deleted(set_json: &str, id_json: &str) -> Result<String, JsValue> {
    let set: Vec<SubParcel> = parse(set_json, "sub parcel set")?;
    let id: RecordId = parse(id_json, "record id")?;
    to_json(&editor::mark_sub_parcel_deleted(&set, id))
}

/// Append a new crop-turnover row for the given year
#[wasm_bindgen]
pub fn add_crop_assignment(set_json: &str, year: i32) -> Result<String, JsValue> {
    let set: Vec<CropAssignment> = parse(set_json, "crop assignment set")?;
    to_json(&editor::add_assignment(&set, year))
}

/// Merge a patch into the crop row matching the given id
#[wasm_bindgen]
pub fn update_crop_assignment(
    set_json: &str,
    id_json: &str,
    patch_json: &str,
) -> Result<String, JsValue> {
    let set: Vec<CropAssignment> = parse(set_json, "crop assignment set")?;
    let id: RecordId = parse(id_json, "record id")?;
    let patch: editor::CropAssignmentPatch = parse(patch_json, "crop assignment patch")?;
    to_json(&editor::update_assignment(&set, id, &patch))
}

/// Flag a crop row for deletion
#[wasm_bindgen]
pub fn mark_crop_assignment_deleted(set_json: &str, id_json: &str) -> Result<String, JsValue> {
    let set: Vec<CropAssignment> = parse(set_json, "crop assignment set")?;
    let id: RecordId = parse(id_json, "record id")?;
    to_json(&editor::mark_assignment_deleted(&set, id))
}

/// Clear the sub-parcel reference on crop rows orphaned by a deletion
#[wasm_bindgen]
pub fn reconcile_sub_parcel_deletion(
    set_json: &str,
    deleted_ids_json: &str,
) -> Result<String, JsValue> {
    let set: Vec<CropAssignment> = parse(set_json, "crop assignment set")?;
    let deleted: Vec<RecordId> = parse(deleted_ids_json, "deleted id list")?;
    to_json(&editor::reconcile_sub_parcel_deletion(&set, &deleted))
}

/// Surviving crop rows of one year tab
#[wasm_bindgen]
pub fn assignments_for_year(set_json: &str, year: i32) -> Result<String, JsValue> {
    let set: Vec<CropAssignment> = parse(set_json, "crop assignment set")?;
    to_json(&editor::assignments_for_year(&set, year))
}

/// Run the save-time structural validation.
/// Returns the violation message, or nothing when the aggregate is valid.
#[wasm_bindgen]
pub fn validate_land_parcel(
    parcel_json: &str,
    sub_parcels_json: &str,
    crops_json: &str,
) -> Result<Option<String>, JsValue> {
    let parcel: LandParcelForm = parse(parcel_json, "parcel")?;
    let sub_parcels: Vec<SubParcel> = parse(sub_parcels_json, "sub parcel set")?;
    let crops: Vec<CropAssignment> = parse(crops_json, "crop assignment set")?;

    Ok(validation::validate_parcel_aggregate(&parcel, &sub_parcels, &crops)
        .err()
        .map(|msg| msg.to_string()))
}

/// Assemble the create-variant submission payload
#[wasm_bindgen]
pub fn assemble_create_submission(
    parcel_json: &str,
    sub_parcels_json: &str,
    crops_json: &str,
) -> Result<String, JsValue> {
    let parcel: LandParcelForm = parse(parcel_json, "parcel")?;
    let sub_parcels: Vec<SubParcel> = parse(sub_parcels_json, "sub parcel set")?;
    let crops: Vec<CropAssignment> = parse(crops_json, "crop assignment set")?;

    to_json(&submission::assemble_for_create(&parcel, &sub_parcels, &crops))
}

/// Assemble the update-variant submission payload
#[wasm_bindgen]
pub fn assemble_update_submission(
    parcel_id: &str,
    parcel_json: &str,
    sub_parcels_json: &str,
    crops_json: &str,
) -> Result<String, JsValue> {
    let parcel_id = Uuid::parse_str(parcel_id)
        .map_err(|e| JsValue::from_str(&format!("Invalid parcel id: {}", e)))?;
    let parcel: LandParcelForm = parse(parcel_json, "parcel")?;
    let sub_parcels: Vec<SubParcel> = parse(sub_parcels_json, "sub parcel set")?;
    let crops: Vec<CropAssignment> = parse(crops_json, "crop assignment set")?;

    to_json(&submission::assemble_for_update(
        parcel_id,
        &parcel,
        &sub_parcels,
        &crops,
    ))
}

/// Drop pending-deletion sub parcels after a successful save
#[wasm_bindgen]
pub fn finalize_sub_parcels(set_json: &str) -> Result<String, JsValue> {
    let set: Vec<SubParcel> = parse(set_json, "sub parcel set")?;
    to_json(&editor::finalize_sub_parcels(&set))
}

/// Drop pending-deletion crop rows after a successful save
#[wasm_bindgen]
pub fn finalize_crop_assignments(set_json: &str) -> Result<String, JsValue> {
    let set: Vec<CropAssignment> = parse(set_json, "crop assignment set")?;
    to_json(&editor::finalize_assignments(&set))
}

/// Total area of the surviving sub parcels, shown next to the utilised area
#[wasm_bindgen]
pub fn sub_parcel_area_total(set_json: &str) -> Result<String, JsValue> {
    let set: Vec<SubParcel> = parse(set_json, "sub parcel set")?;
    let total: Decimal = set
        .iter()
        .filter(|sp| sp.is_active())
        .map(|sp| sp.area)
        .sum();
    Ok(total.to_string())
}

/// Crop picker options as (id, label) pairs in the requested language
#[wasm_bindgen]
pub fn crop_picker_options(crops_json: &str, language: &str) -> Result<String, JsValue> {
    let crops: Vec<Crop> = parse(crops_json, "crop list")?;
    let language = match language {
        "en" => Language::English,
        _ => Language::Turkish,
    };

    let options: Vec<serde_json::Value> = crops
        .iter()
        .map(|crop| {
            serde_json::json!({
                "id": crop.id,
                "label": crop.display_name(&language),
            })
        })
        .collect();
    to_json(&options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_parcel_round_trips_json() {
        let set = add_sub_parcel("[]").unwrap();
        let set = add_sub_parcel(&set).unwrap();
        let parsed: Vec<SubParcel> = serde_json::from_str(&set).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].code, 2);
    }

    #[test]
    fn validate_reports_first_violation() {
        let parcel = r#"{
            "id": null,
            "code": "P-1",
            "location": "Ovakent",
            "total_area": "20",
            "utilised_area": "10",
            "ownership_status": "owned",
            "cadastral_no": null,
            "organic_transition_date": null,
            "applied_standards": null,
            "buffer_zone": null,
            "contract_start": null,
            "contract_end": null,
            "coordinates": null,
            "map_document": null
        }"#;
        let subs = add_sub_parcel("[]").unwrap();
        let message = validate_land_parcel(parcel, &subs, "[]").unwrap();
        assert_eq!(
            message.as_deref(),
            Some(validation::MSG_ZERO_SUB_PARCEL_AREA)
        );
    }

    #[test]
    fn area_total_sums_active_rows() {
        let set = editor::add_sub_parcel(&[]);
        let id = set[0].id;
        let set = editor::update_sub_parcel(
            &set,
            id,
            &editor::SubParcelPatch {
                area: Some(Decimal::from(3)),
            },
        );
        let set = editor::mark_sub_parcel_deleted(&editor::add_sub_parcel(&set), set[0].id);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(sub_parcel_area_total(&json).unwrap(), "0");
    }

    #[test]
    fn crop_picker_uses_requested_language() {
        let crops = serde_json::json!([{
            "id": Uuid::new_v4(),
            "code": "WHEAT",
            "name_en": "Wheat",
            "name_tr": "Buğday"
        }])
        .to_string();

        let options = crop_picker_options(&crops, "tr").unwrap();
        assert!(options.contains("Buğday"));
        let options = crop_picker_options(&crops, "en").unwrap();
        assert!(options.contains("Wheat"));
    }
}
