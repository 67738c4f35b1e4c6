//! Destinations for the encoded table.

mod file;
mod http;

use futures::future::BoxFuture;
use polars::prelude::{DataFrame, ParquetCompression, ParquetWriter};

pub use file::FileSink;
pub use http::HttpSink;

use crate::core::ExtractError;

/// Encoding of the bytes handed to a sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SinkFormat {
    #[default]
    Parquet,
}

/// How a write treats data already at the destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteDisposition {
    /// The new bytes fully replace the previous contents.
    #[default]
    Replace,
}

impl WriteDisposition {
    pub fn as_str(self) -> &'static str {
        match self {
            WriteDisposition::Replace => "replace",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub format: SinkFormat,
    pub disposition: WriteDisposition,
}

/// Storage destination that accepts one complete encoded table per cycle.
pub trait Sink: Send + Sync {
    /// Short description for logs.
    fn describe(&self) -> String;

    fn write<'a>(
        &'a self,
        bytes: &'a [u8],
        options: WriteOptions,
    ) -> BoxFuture<'a, Result<(), ExtractError>>;
}

/// Encode `frame` as gzip-compressed Parquet.
pub fn encode_parquet(frame: &mut DataFrame) -> Result<Vec<u8>, ExtractError> {
    let mut buf = Vec::new();
    ParquetWriter::new(&mut buf)
        .with_compression(ParquetCompression::Gzip(None))
        .finish(frame)?;
    Ok(buf)
}
