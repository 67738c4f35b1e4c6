use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::model::{AttributeCatalog, AttributesByKey, DatasetScope, MaterialIndex};
use super::wire::{
    ClassFilterNode, ClassParamValueNode, ListValueNode, MaterialNode, TranslationsRoot,
};
use crate::core::{ExtractError, Query};
use crate::merge::{ColumnNameMap, MergeKey, RawRecord, StatusLabels, StatusRecord, merge_key};

fn classification_filter(key: &str, value: impl Into<String>) -> Value {
    json!({
        "type": "MsfClassificationFilterSetting",
        "additionalCriteria": null,
        "filterKey": key,
        "filterValue": value.into(),
        "multivalueExactMatch": false,
        "useAndConcatenation": false,
        "useCaseSensitiveComparision": true,
        "useWildCards": false,
    })
}

impl DatasetScope {
    /// Material rows of the scoped view, filtered by status.
    pub fn material_data_query(&self) -> Query {
        let body = json!([
            {
                "additionalCriteria": null,
                "dataProviderName": "DP_UPPVIEWMAT",
                "foreignKeyName": "uppviewMatSeq",
                "dpEntityClass": null,
                "filterValues": [classification_filter("uppStatus", self.status_filter.as_str())],
            },
            {
                "additionalCriteria": null,
                "dataProviderName": "DP_MANDATORY",
                "foreignKeyName": null,
                "dpEntityClass": null,
                "filterValues": [
                    classification_filter(
                        "MANDATORY_FILTER_UPPGENERATION",
                        self.generation_seq.to_string(),
                    ),
                    classification_filter("MANDATORY_FILTER_UPPVIEW", self.view_seq.to_string()),
                    classification_filter("MANDATORY_FILTER_PRODUCT_TYPE", "MOD"),
                    classification_filter("MANDATORY_FILTER_PRODUCT", self.product_seq.to_string()),
                ],
            },
        ]);
        Query::MaterialData { body }
    }

    /// Class parameters defined for the scoped view.
    pub fn class_filter_query(&self) -> Query {
        Query::ClassFilter {
            body: json!({
                "prjstructSeq": 0,
                "prostructSeq": self.product_seq,
                "uppgenerationSeq": self.generation_seq,
                "uppviewSeq": self.view_seq,
            }),
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, ExtractError> {
    serde_json::from_value(value).map_err(|e| ExtractError::Data(format!("{what}: {e}")))
}

/// Valid `data` → `label` entries of list `list_id`. A missing list is empty.
pub fn status_labels(mut value: Value, list_id: &str) -> Result<StatusLabels, ExtractError> {
    let Some(list) = value.get_mut(list_id).map(Value::take) else {
        return Ok(StatusLabels::new());
    };
    if list.is_null() {
        return Ok(StatusLabels::new());
    }

    let nodes: Vec<ListValueNode> = decode(list, "list of values")?;
    Ok(nodes
        .into_iter()
        .filter(|n| n.is_valid)
        .filter_map(|n| {
            let data = match n.data? {
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((data, n.label.unwrap_or_default()))
        })
        .collect())
}

/// Change-element column labels; non-string entries are skipped.
pub fn column_names(value: Value) -> Result<ColumnNameMap, ExtractError> {
    let root: TranslationsRoot = decode(value, "translations")?;
    let chgelem = root
        .columns
        .and_then(|c| c.chgelem)
        .ok_or_else(|| ExtractError::Data("translations: columns.chgelem missing".into()))?;

    Ok(chgelem
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::String(label) => Some((k, label)),
            _ => None,
        })
        .collect())
}

/// Index material rows by change-note key.
///
/// Later rows for the same key replace earlier ones.
pub fn material_index(value: Value) -> Result<MaterialIndex, ExtractError> {
    let nodes: Vec<MaterialNode> = decode(value, "material data")?;

    let mut index = MaterialIndex::default();
    let mut seen_parts = HashSet::new();
    let mut seen_materials = HashSet::new();

    for node in nodes {
        let part = node.chgelem_chgnote_seq_tech.as_ref().and_then(merge_key);
        let material = node.uppview_mat_seq.as_ref().and_then(merge_key);

        // the part endpoint rejects a zero or missing key
        let sent = part.filter(|k| *k != 0).unwrap_or(-1);
        if seen_parts.insert(sent) {
            index.part_seqs.push(sent);
        }
        if let Some(material) = material.filter(|m| seen_materials.insert(*m)) {
            index.material_seqs.push(material);
        }

        if let Some(part) = part {
            if let Some(material) = material {
                index.correlation.insert(part, material);
            }
            index.status_by_key.insert(
                part,
                StatusRecord {
                    status: node.upp_status,
                    status_changed: node.upp_status_chg_date,
                },
            );
        }
    }

    Ok(index)
}

/// Primary rows, in response order.
pub fn part_records(value: Value) -> Result<Vec<RawRecord>, ExtractError> {
    decode(value, "change element parts")
}

/// Class parameters with a usable label (`descText`, else `paramLongName`).
pub fn attribute_catalog(value: Value) -> Result<AttributeCatalog, ExtractError> {
    let nodes: Vec<ClassFilterNode> = decode(value, "class filter")?;

    let mut catalog = AttributeCatalog::default();
    for param in nodes.into_iter().flat_map(|n| n.class_params) {
        let label = param
            .param_seq
            .and_then(|p| p.desc_text.or(p.param_long_name))
            .unwrap_or_default();
        if label.is_empty() {
            continue;
        }
        if catalog.names.insert(param.class_param_seq, label).is_none() {
            catalog.class_param_seqs.push(param.class_param_seq);
        }
    }
    Ok(catalog)
}

/// Group class parameter values by material key, keeping the order in which
/// parameters first appear. A repeated parameter keeps its slot and takes the
/// later value.
pub fn attributes_by_key(value: Value) -> Result<AttributesByKey, ExtractError> {
    let nodes: Vec<ClassParamValueNode> = decode(value, "class parameter data")?;

    let mut grouped = AttributesByKey::new();
    for node in nodes {
        let values: &mut Vec<(MergeKey, Value)> = grouped.entry(node.uppview_mat_seq).or_default();
        match values.iter_mut().find(|(seq, _)| *seq == node.class_param_seq) {
            Some(slot) => slot.1 = node.value,
            None => values.push((node.class_param_seq, node.value)),
        }
    }
    Ok(grouped)
}
