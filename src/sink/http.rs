use futures::future::BoxFuture;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use super::{Sink, SinkFormat, WriteOptions};
use crate::core::ExtractError;

const PARQUET_CONTENT_TYPE: &str = "application/vnd.apache.parquet";

/// Uploads the table with an HTTP `PUT`.
#[derive(Clone, Debug)]
pub struct HttpSink {
    http: Client,
    url: Url,
    token: Option<String>,
}

impl HttpSink {
    pub fn new(url: Url) -> Self {
        Self::with_client(Client::new(), url)
    }

    /// Reuse an existing client (proxy, timeouts).
    pub fn with_client(http: Client, url: Url) -> Self {
        Self {
            http,
            url,
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every upload.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    #[tracing::instrument(skip(self, bytes), err, fields(url = %self.url, bytes = bytes.len()))]
    async fn upload(&self, bytes: &[u8], options: WriteOptions) -> Result<(), ExtractError> {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("disposition", options.disposition.as_str());

        let content_type = match options.format {
            SinkFormat::Parquet => PARQUET_CONTENT_TYPE,
        };

        let mut req = self
            .http
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes.to_vec());
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(ExtractError::Status {
                status: resp.status().as_u16(),
                url: resp.url().to_string(),
            });
        }
        Ok(())
    }
}

impl Sink for HttpSink {
    fn describe(&self) -> String {
        format!("http {}", self.url)
    }

    fn write<'a>(
        &'a self,
        bytes: &'a [u8],
        options: WriteOptions,
    ) -> BoxFuture<'a, Result<(), ExtractError>> {
        Box::pin(self.upload(bytes, options))
    }
}
