use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::{Sink, WriteOptions};
use crate::core::ExtractError;

/// Writes the table to a local file, truncating what was there.
#[derive(Clone, Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_file(&self, bytes: &[u8]) -> Result<(), ExtractError> {
        let mut file = File::create(&self.path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "file written");
        Ok(())
    }
}

impl Sink for FileSink {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn write<'a>(
        &'a self,
        bytes: &'a [u8],
        _options: WriteOptions,
    ) -> BoxFuture<'a, Result<(), ExtractError>> {
        // `File::create` truncates, which is the only disposition there is
        Box::pin(self.write_file(bytes))
    }
}
