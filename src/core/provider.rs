use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::core::{Credentials, ExtractError};

/// Opaque token returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(Arc<str>);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::from(token.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// One dataset request understood by a [`SourceProvider`].
#[derive(Clone, Debug, PartialEq)]
pub enum Query {
    /// List-of-values table (`data` → `label`) for one list id.
    ListValues { list_id: String },
    /// The i18n document holding human-readable column labels.
    Translations,
    /// Material rows (status, correlation ids) matching a filter body.
    MaterialData { body: Value },
    /// Change-element part records for the given change-note sequences.
    ChangeElementParts { seqs: Vec<i64> },
    /// Material classes filter, used to label class parameters.
    ClassFilter { body: Value },
    /// Class parameter values for the given parameters and materials.
    ClassParamData {
        class_param_seqs: Vec<i64>,
        material_seqs: Vec<i64>,
    },
}

impl Query {
    /// Short name used in logs and retry labels.
    pub fn name(&self) -> &'static str {
        match self {
            Query::ListValues { .. } => "list_values",
            Query::Translations => "translations",
            Query::MaterialData { .. } => "material_data",
            Query::ChangeElementParts { .. } => "change_element_parts",
            Query::ClassFilter { .. } => "class_filter",
            Query::ClassParamData { .. } => "class_param_data",
        }
    }
}

/// Capability of the remote system that serves the raw datasets.
///
/// Implemented by [`crate::core::IcmClient`]; tests substitute in-memory fakes.
/// A request rejected with an expired or invalid token must fail with
/// [`ExtractError::Unauthorized`] so the caller can drop the cached session.
pub trait SourceProvider: Send + Sync {
    /// Perform the login exchange for `credentials`.
    fn authenticate<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<SessionToken, ExtractError>>;

    /// Run one dataset request with an established session.
    fn fetch<'a>(
        &'a self,
        token: &'a SessionToken,
        query: &'a Query,
    ) -> BoxFuture<'a, Result<Value, ExtractError>>;
}
