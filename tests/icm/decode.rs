use icm_extract::ExtractError;
use icm_extract::icm;
use serde_json::json;

use crate::common;

#[test]
fn status_labels_keep_only_valid_entries() {
    let labels = icm::status_labels(common::status_list(), "UPP_STATUS").unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels.get("G").map(String::as_str), Some("Good"));
}

#[test]
fn missing_status_list_is_empty() {
    let labels = icm::status_labels(json!({ "OTHER": [] }), "UPP_STATUS").unwrap();
    assert!(labels.is_empty());
}

#[test]
fn column_names_skip_non_string_labels() {
    let names = icm::column_names(common::translations()).unwrap();
    assert_eq!(names.get("partNo").map(String::as_str), Some("Part No."));
    assert!(!names.contains_key("nested"));
    // only the change-element section counts
    assert!(!names.contains_key("uppviewMatSeq"));
}

#[test]
fn column_names_require_the_chgelem_section() {
    let err = icm::column_names(json!({ "columns": {} })).unwrap_err();
    assert!(matches!(err, ExtractError::Data(_)));
}

#[test]
fn attribute_catalog_falls_back_to_long_name() {
    let catalog = icm::attribute_catalog(common::class_filter()).unwrap();
    assert_eq!(catalog.class_param_seqs, vec![10, 11]);
    assert_eq!(catalog.names.get(&10).map(String::as_str), Some("Weight kg"));
    assert_eq!(catalog.names.get(&11).map(String::as_str), Some("Colour"));
    // an empty descText does not fall back
    assert!(!catalog.names.contains_key(&12));
}

#[test]
fn material_index_collects_keys_in_order() {
    let index = icm::material_index(json!([
        { "chgelemChgnoteSeqTech": 5, "uppviewMatSeq": 1, "uppStatus": "G" },
        { "chgelemChgnoteSeqTech": 0, "uppviewMatSeq": 2, "uppStatus": "N" },
        { "chgelemChgnoteSeqTech": 5, "uppviewMatSeq": 3, "uppStatus": "Y" },
        { "uppviewMatSeq": 1 }
    ]))
    .unwrap();

    assert_eq!(index.part_seqs, vec![5, -1]);
    assert_eq!(index.material_seqs, vec![1, 2, 3]);
    // the later row for key 5 wins
    assert_eq!(index.correlation.get(&5), Some(&3));
    assert_eq!(index.status_by_key.get(&5).unwrap().status, json!("Y"));
    assert_eq!(index.status_by_key.get(&0).unwrap().status, json!("N"));
}

#[test]
fn material_data_must_be_a_list() {
    let err = icm::material_index(json!({ "error": "nope" })).unwrap_err();
    assert!(matches!(err, ExtractError::Data(_)));
}

#[test]
fn class_param_values_group_by_material() {
    let grouped = icm::attributes_by_key(json!([
        { "uppviewMatSeq": 7, "classParamSeq": 10, "value": "a" },
        { "uppviewMatSeq": 7, "classParamSeq": 11, "value": "b" },
        { "uppviewMatSeq": 8, "classParamSeq": 10, "value": "c" },
        { "uppviewMatSeq": 7, "classParamSeq": 10, "value": "d" }
    ]))
    .unwrap();

    assert_eq!(
        grouped.get(&7).unwrap(),
        &vec![(10, json!("d")), (11, json!("b"))]
    );
    assert_eq!(grouped.get(&8).unwrap(), &vec![(10, json!("c"))]);
}

#[test]
fn part_records_keep_response_order() {
    let rows = icm::part_records(common::parts()).unwrap();
    let keys: Vec<_> = rows.iter().map(|r| r["chgelemChgnoteSeq"].clone()).collect();
    assert_eq!(keys, vec![json!(100), json!(200), json!(300)]);
}
