//! icm-extract: scheduled extraction of ICM change-element data.
//!
//! Each cycle pulls the related datasets from the ICM REST API, merges them
//! into one typed table, encodes it as gzip-compressed Parquet and replaces
//! the contents of a storage sink. Failed cycles cool down with an escalating
//! backoff; successful ones repeat on a cron schedule.

pub mod config;
pub mod core;
pub mod extract;
pub mod icm;
pub mod logging;
pub mod merge;
pub mod scheduler;
pub mod sink;

pub use crate::core::{
    Credentials, ExtractError, IcmClient, IcmClientBuilder, PersistentErrorBackoff, Query,
    RetryConfig, RetryPolicy, Session, SessionCache, SessionToken, SourceProvider,
};
pub use extract::{Cycle, CycleReport, ExtractionRun, Extractor};
pub use merge::{MergeError, MergeInput, merge_and_infer};
pub use scheduler::{CronSchedule, RunState, RunSummary, Runner};
pub use sink::{FileSink, HttpSink, Sink, WriteOptions, encode_parquet};
