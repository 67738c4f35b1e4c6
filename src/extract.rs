//! One extraction cycle: fetch every dataset, merge, encode, write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde_json::Value;

use crate::core::{
    Credentials, ExtractError, Query, RetryConfig, SessionCache, SourceProvider, with_retry,
};
use crate::icm::{self, DatasetScope, MaterialIndex, PART_KEY_FIELD, STATUS_LIST_ID};
use crate::merge::{MergeInput, RawRecord, merge_and_infer};
use crate::sink::{Sink, WriteOptions, encode_parquet};

/// Parameters of a single loop iteration.
#[derive(Clone, Debug)]
pub struct ExtractionRun {
    pub extraction_time: DateTime<Utc>,
    pub retry: RetryConfig,
    pub credentials: Credentials,
}

impl ExtractionRun {
    /// A run stamped with the current time.
    pub fn new(credentials: Credentials, retry: RetryConfig) -> Self {
        Self {
            extraction_time: Utc::now(),
            retry,
            credentials,
        }
    }
}

/// What a successful cycle produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub rows: usize,
    pub columns: usize,
    pub bytes: usize,
}

/// A unit of work the run loop drives.
pub trait Cycle: Send + Sync {
    fn run_cycle<'a>(
        &'a self,
        run: &'a ExtractionRun,
    ) -> BoxFuture<'a, Result<CycleReport, ExtractError>>;
}

/// Fetches the ICM datasets, merges them and writes the Parquet table.
pub struct Extractor {
    provider: Arc<dyn SourceProvider>,
    sink: Arc<dyn Sink>,
    sessions: Arc<SessionCache>,
    scope: DatasetScope,
}

impl Extractor {
    pub fn new(provider: Arc<dyn SourceProvider>, sink: Arc<dyn Sink>) -> Self {
        Self {
            provider,
            sink,
            sessions: Arc::new(SessionCache::new()),
            scope: DatasetScope::default(),
        }
    }

    pub fn scope(mut self, scope: DatasetScope) -> Self {
        self.scope = scope;
        self
    }

    /// Share a session cache with other extractors.
    pub fn sessions(mut self, sessions: Arc<SessionCache>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn session_cache(&self) -> &Arc<SessionCache> {
        &self.sessions
    }

    /// One attempt: reuse or establish the session, then run `query`.
    ///
    /// A rejected session is evicted before the error is returned, so the
    /// next attempt logs in again.
    async fn fetch_once(
        &self,
        credentials: &Credentials,
        query: &Query,
    ) -> Result<Value, ExtractError> {
        let session = self
            .sessions
            .get_session(credentials, || self.provider.authenticate(credentials))
            .await?;

        match self.provider.fetch(session.token(), query).await {
            Err(err) if err.is_unauthorized() => {
                self.sessions.invalidate(credentials, &session).await;
                Err(err)
            }
            other => other,
        }
    }

    /// Fetch and decode `query` under its own retry budget.
    async fn fetch<T, D>(
        &self,
        run: &ExtractionRun,
        query: &Query,
        decode: D,
    ) -> Result<T, ExtractError>
    where
        D: Fn(Value) -> Result<T, ExtractError>,
    {
        let decode = &decode;
        let credentials = &run.credentials;
        with_retry(&run.retry, query.name(), move || async move {
            decode(self.fetch_once(credentials, query).await?)
        })
        .await
    }

    async fn materials_and_parts(
        &self,
        run: &ExtractionRun,
    ) -> Result<(MaterialIndex, Vec<RawRecord>), ExtractError> {
        let materials_query = self.scope.material_data_query();
        let materials = self.fetch(run, &materials_query, icm::material_index).await?;

        let parts_query = Query::ChangeElementParts {
            seqs: materials.part_seqs.clone(),
        };
        let parts = self.fetch(run, &parts_query, icm::part_records).await?;
        Ok((materials, parts))
    }

    #[tracing::instrument(skip_all, fields(extraction_time = %run.extraction_time))]
    async fn extract(&self, run: &ExtractionRun) -> Result<CycleReport, ExtractError> {
        let translations_query = Query::Translations;
        let labels_query = Query::ListValues {
            list_id: STATUS_LIST_ID.to_string(),
        };
        let class_filter_query = self.scope.class_filter_query();

        // parts need the material keys; everything else starts right away
        let (column_names, status_labels, catalog, (materials, rows)) = futures::try_join!(
            self.fetch(run, &translations_query, icm::column_names),
            self.fetch(run, &labels_query, |v| icm::status_labels(v, STATUS_LIST_ID)),
            self.fetch(run, &class_filter_query, icm::attribute_catalog),
            self.materials_and_parts(run),
        )?;

        let attributes_query = Query::ClassParamData {
            class_param_seqs: catalog.class_param_seqs.clone(),
            material_seqs: materials.material_seqs.clone(),
        };
        let attributes_by_key = self
            .fetch(run, &attributes_query, icm::attributes_by_key)
            .await?;

        tracing::info!(rows = rows.len(), "data extracted");

        let input = MergeInput {
            rows,
            key_field: PART_KEY_FIELD.to_string(),
            status_by_key: materials.status_by_key,
            correlation: materials.correlation,
            attributes_by_key,
            column_names,
            attribute_names: catalog.names,
            status_labels,
            extraction_time: run.extraction_time,
        };
        let mut frame = merge_and_infer(&input)?;
        let bytes = encode_parquet(&mut frame)?;

        tracing::info!(sink = %self.sink.describe(), bytes = bytes.len(), "writing data");
        let sink = self.sink.as_ref();
        let payload = bytes.as_slice();
        with_retry(&run.retry, "sink_write", move || {
            sink.write(payload, WriteOptions::default())
        })
        .await?;
        tracing::info!("data written");

        Ok(CycleReport {
            rows: frame.height(),
            columns: frame.width(),
            bytes: bytes.len(),
        })
    }
}

impl Cycle for Extractor {
    fn run_cycle<'a>(
        &'a self,
        run: &'a ExtractionRun,
    ) -> BoxFuture<'a, Result<CycleReport, ExtractError>> {
        Box::pin(self.extract(run))
    }
}
