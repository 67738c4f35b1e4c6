//! ICM datasets: request bodies for the scoped product view and decoders
//! turning raw responses into the inputs of [`crate::merge`].

mod api;
mod model;
mod wire;

pub use api::{
    attribute_catalog, attributes_by_key, column_names, material_index, part_records,
    status_labels,
};
pub use model::{AttributeCatalog, AttributesByKey, DatasetScope, MaterialIndex};

/// List-of-values id holding the status labels.
pub const STATUS_LIST_ID: &str = "UPP_STATUS";

/// Field of a part record referencing its change note.
pub const PART_KEY_FIELD: &str = "chgelemChgnoteSeq";
