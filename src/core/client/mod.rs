//! HTTP client for the ICM REST API + builder.
//! Internals are split into `auth` (login) and `constants` (UA + default endpoints).

mod auth;
mod constants;

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::header::{ACCEPT_LANGUAGE, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use url::Url;

use crate::core::provider::{Query, SessionToken, SourceProvider};
use crate::core::{Credentials, ExtractError, net};
use constants::{
    CHANGE_ELEMENT_PART_PATH, CLASS_FILTER_PATH, CLASS_PARAM_DATA_PATH, DEFAULT_BASE_URL,
    DEFAULT_LOGIN_URL, LIST_VALUES_PATH, MATERIAL_DATA_PATH, TRANSLATIONS_PATH, USER_AGENT,
};

/// [`SourceProvider`] talking to the ICM REST endpoints over HTTPS.
#[derive(Debug, Clone)]
pub struct IcmClient {
    http: Client,
    login_url: Url,
    base_url: Url,
}

impl IcmClient {
    /// Create a new builder.
    pub fn builder() -> IcmClientBuilder {
        IcmClientBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ExtractError> {
        Ok(self.base_url.join(path)?)
    }

    fn request_for(&self, query: &Query) -> Result<RequestBuilder, ExtractError> {
        let req = match query {
            Query::ListValues { list_id } => {
                let mut url = self.endpoint(LIST_VALUES_PATH)?;
                url.query_pairs_mut().append_pair("listValIds", list_id);
                self.http.get(url)
            }
            Query::Translations => self.http.get(self.endpoint(TRANSLATIONS_PATH)?),
            Query::MaterialData { body } => {
                self.http.post(self.endpoint(MATERIAL_DATA_PATH)?).json(body)
            }
            Query::ChangeElementParts { seqs } => {
                self.http.post(self.endpoint(CHANGE_ELEMENT_PART_PATH)?).json(seqs)
            }
            Query::ClassFilter { body } => {
                self.http.put(self.endpoint(CLASS_FILTER_PATH)?).json(body)
            }
            Query::ClassParamData {
                class_param_seqs,
                material_seqs,
            } => self
                .http
                .put(self.endpoint(CLASS_PARAM_DATA_PATH)?)
                .json(&json!({
                    "calcPermissions": true,
                    "calcQuality": false,
                    "classParamSeqs": class_param_seqs,
                    "uppviewMatSeqs": material_seqs,
                })),
        };
        Ok(req)
    }

    #[tracing::instrument(skip(self, token, query), err, fields(query = query.name()))]
    async fn run_query(&self, token: &SessionToken, query: &Query) -> Result<Value, ExtractError> {
        let resp = self
            .request_for(query)?
            .header(AUTHORIZATION, token.as_str())
            .header(ACCEPT_LANGUAGE, "EN")
            .send()
            .await?;

        net::read_json(resp, query.name()).await
    }
}

impl SourceProvider for IcmClient {
    fn authenticate<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<SessionToken, ExtractError>> {
        Box::pin(self.login(credentials))
    }

    fn fetch<'a>(
        &'a self,
        token: &'a SessionToken,
        query: &'a Query,
    ) -> BoxFuture<'a, Result<Value, ExtractError>> {
        Box::pin(self.run_query(token, query))
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct IcmClientBuilder {
    user_agent: Option<String>,
    login_url: Option<Url>,
    base_url: Option<Url>,
    https_proxy: Option<Url>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl IcmClientBuilder {
    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the login endpoint (e.g., `https://b2b.example.com/accessmanager-access/jwt/login`).
    pub fn login_url(mut self, url: Url) -> Self {
        self.login_url = Some(url);
        self
    }

    /// Override the API host (e.g., `https://apps01.example.com/`); endpoint paths are joined onto it.
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Route HTTPS traffic through a proxy.
    pub fn https_proxy(mut self, url: Url) -> Self {
        self.https_proxy = Some(url);
        self
    }

    /// Set a per-request timeout. Default: none.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    pub fn build(self) -> Result<IcmClient, ExtractError> {
        let login_url = match self.login_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_LOGIN_URL)?,
        };
        let mut base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };
        // `Url::join` drops the last segment unless the base ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut httpb = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));

        if let Some(proxy) = self.https_proxy {
            httpb = httpb.proxy(reqwest::Proxy::https(proxy.as_str())?);
        }
        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }

        let http = httpb.build()?;

        Ok(IcmClient {
            http,
            login_url,
            base_url,
        })
    }
}
