use std::collections::HashMap;

use serde_json::Value;

use crate::merge::{AttributeNameMap, MergeKey, StatusRecord};

/// Product structure the extraction is scoped to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetScope {
    pub product_seq: i64,
    pub generation_seq: i64,
    pub view_seq: i64,
    /// Status codes to include, in the source's `;|;`-separated form.
    pub status_filter: String,
}

impl Default for DatasetScope {
    fn default() -> Self {
        Self {
            product_seq: 3321,
            generation_seq: 1841,
            view_seq: 81,
            status_filter: "N;|;G;|;Z;|;Y".to_string(),
        }
    }
}

/// Material data indexed for the later requests and the merge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialIndex {
    /// Distinct change-note keys in first-seen order, `0` already sent as `-1`.
    pub part_seqs: Vec<MergeKey>,
    /// Distinct material keys in first-seen order.
    pub material_seqs: Vec<MergeKey>,
    /// Change-note key to material key.
    pub correlation: HashMap<MergeKey, MergeKey>,
    pub status_by_key: HashMap<MergeKey, StatusRecord>,
}

/// Labelled class parameters, in the order the filter listed them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeCatalog {
    pub class_param_seqs: Vec<MergeKey>,
    pub names: AttributeNameMap,
}

/// Class parameter values grouped by material key.
pub type AttributesByKey = HashMap<MergeKey, Vec<(MergeKey, Value)>>;
