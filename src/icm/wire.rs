use serde::Deserialize;
use serde_json::Value;

// One entry of a list-of-values table
#[derive(Deserialize)]
pub(crate) struct ListValueNode {
    pub(crate) data: Option<Value>,
    pub(crate) label: Option<String>,
    #[serde(rename = "isValid", default)]
    pub(crate) is_valid: bool,
}

#[derive(Deserialize)]
pub(crate) struct TranslationsRoot {
    pub(crate) columns: Option<TranslationColumns>,
}

#[derive(Deserialize)]
pub(crate) struct TranslationColumns {
    // labels of change-element fields; other sections are ignored
    pub(crate) chgelem: Option<serde_json::Map<String, Value>>,
}

#[derive(Deserialize)]
pub(crate) struct MaterialNode {
    #[serde(rename = "chgelemChgnoteSeqTech")]
    pub(crate) chgelem_chgnote_seq_tech: Option<Value>,
    #[serde(rename = "uppviewMatSeq")]
    pub(crate) uppview_mat_seq: Option<Value>,
    #[serde(rename = "uppStatus", default)]
    pub(crate) upp_status: Value,
    #[serde(rename = "uppStatusChgDate", default)]
    pub(crate) upp_status_chg_date: Value,
}

#[derive(Deserialize)]
pub(crate) struct ClassFilterNode {
    #[serde(rename = "classParams", default)]
    pub(crate) class_params: Vec<ClassParamNode>,
}

#[derive(Deserialize)]
pub(crate) struct ClassParamNode {
    #[serde(rename = "classParamSeq")]
    pub(crate) class_param_seq: i64,
    #[serde(rename = "paramSeq")]
    pub(crate) param_seq: Option<ParamSeqNode>,
}

#[derive(Deserialize)]
pub(crate) struct ParamSeqNode {
    #[serde(rename = "descText")]
    pub(crate) desc_text: Option<String>,
    #[serde(rename = "paramLongName")]
    pub(crate) param_long_name: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ClassParamValueNode {
    #[serde(rename = "uppviewMatSeq")]
    pub(crate) uppview_mat_seq: i64,
    #[serde(rename = "classParamSeq")]
    pub(crate) class_param_seq: i64,
    #[serde(default)]
    pub(crate) value: Value,
}
