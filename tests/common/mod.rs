#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use httpmock::MockServer;
use icm_extract::core::{Credentials, ExtractError, IcmClient, Query, SessionToken, SourceProvider};
use icm_extract::sink::{Sink, WriteOptions};
use serde_json::{Value, json};
use url::Url;

pub fn setup_server() -> MockServer {
    MockServer::start()
}

/// Client pointed at `server` for both login and data requests.
pub fn client_for(server: &MockServer) -> IcmClient {
    IcmClient::builder()
        .login_url(Url::parse(&server.url("/jwt/login")).unwrap())
        .base_url(Url::parse(&server.base_url()).unwrap())
        .build()
        .unwrap()
}

/// In-memory provider answering each query kind with a canned document.
#[derive(Default)]
pub struct FakeProvider {
    pub login_delay: Duration,
    logins: AtomicUsize,
    responses: Mutex<HashMap<&'static str, Value>>,
    /// Remaining 401 answers per query name.
    unauthorized: Mutex<HashMap<&'static str, u32>>,
    /// Remaining 500 answers per query name.
    failures: Mutex<HashMap<&'static str, u32>>,
    calls: Mutex<Vec<(Query, String)>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = delay;
        self
    }

    pub fn respond(self, query: &'static str, body: Value) -> Self {
        self.responses.lock().unwrap().insert(query, body);
        self
    }

    pub fn reject_session(self, query: &'static str, times: u32) -> Self {
        self.unauthorized.lock().unwrap().insert(query, times);
        self
    }

    pub fn fail(self, query: &'static str, times: u32) -> Self {
        self.failures.lock().unwrap().insert(query, times);
        self
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    /// Every data request made, with the token it carried.
    pub fn calls(&self) -> Vec<(Query, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, name: &str) -> Vec<Query> {
        self.calls()
            .into_iter()
            .filter(|(q, _)| q.name() == name)
            .map(|(q, _)| q)
            .collect()
    }

    fn take(map: &Mutex<HashMap<&'static str, u32>>, name: &str) -> bool {
        let mut map = map.lock().unwrap();
        match map.get_mut(name) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}

impl SourceProvider for FakeProvider {
    fn authenticate<'a>(
        &'a self,
        _credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<SessionToken, ExtractError>> {
        Box::pin(async move {
            let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.login_delay.is_zero() {
                tokio::time::sleep(self.login_delay).await;
            }
            Ok(SessionToken::new(format!("token-{n}")))
        })
    }

    fn fetch<'a>(
        &'a self,
        token: &'a SessionToken,
        query: &'a Query,
    ) -> BoxFuture<'a, Result<Value, ExtractError>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push((query.clone(), token.as_str().to_string()));

            if Self::take(&self.unauthorized, query.name()) {
                return Err(ExtractError::Unauthorized {
                    url: format!("fake://{}", query.name()),
                });
            }
            if Self::take(&self.failures, query.name()) {
                return Err(ExtractError::Status {
                    status: 500,
                    url: format!("fake://{}", query.name()),
                });
            }

            self.responses
                .lock()
                .unwrap()
                .get(query.name())
                .cloned()
                .ok_or_else(|| {
                    ExtractError::Data(format!("no canned response for {}", query.name()))
                })
        })
    }
}

/// Sink keeping every write in memory.
#[derive(Default)]
pub struct RecordingSink {
    failures: AtomicUsize,
    writes: Mutex<Vec<(Vec<u8>, WriteOptions)>>,
}

impl RecordingSink {
    pub fn failing(times: usize) -> Self {
        Self {
            failures: AtomicUsize::new(times),
            writes: Mutex::default(),
        }
    }

    pub fn writes(&self) -> Vec<(Vec<u8>, WriteOptions)> {
        self.writes.lock().unwrap().clone()
    }
}

impl Sink for RecordingSink {
    fn describe(&self) -> String {
        "memory".into()
    }

    fn write<'a>(
        &'a self,
        bytes: &'a [u8],
        options: WriteOptions,
    ) -> BoxFuture<'a, Result<(), ExtractError>> {
        Box::pin(async move {
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(ExtractError::Io(std::io::Error::other("sink unavailable")));
            }
            self.writes.lock().unwrap().push((bytes.to_vec(), options));
            Ok(())
        })
    }
}

/* ------------------- canned ICM documents ------------------- */

pub fn translations() -> Value {
    json!({
        "columns": {
            "chgelem": {
                "uppStatus": "Status",
                "chgelemChgnoteSeq": "Change Note",
                "partNo": "Part No.",
                "nested": { "ignored": true }
            },
            "uppMaterial": { "uppviewMatSeq": "Material" }
        }
    })
}

pub fn status_list() -> Value {
    json!({
        "UPP_STATUS": [
            { "data": "G", "label": "Good", "isValid": true },
            { "data": "N", "label": "New", "isValid": false }
        ]
    })
}

pub fn class_filter() -> Value {
    json!([
        {
            "classParams": [
                { "classParamSeq": 10, "paramSeq": { "descText": "Weight kg" } },
                { "classParamSeq": 11, "paramSeq": { "descText": null, "paramLongName": "Colour" } },
                { "classParamSeq": 12, "paramSeq": { "descText": "" } }
            ]
        }
    ])
}

pub fn material_data() -> Value {
    json!([
        { "chgelemChgnoteSeqTech": 100, "uppviewMatSeq": 7, "uppStatus": "G", "uppStatusChgDate": "2024-01-05T10:00:00Z" },
        { "chgelemChgnoteSeqTech": 200, "uppviewMatSeq": 8, "uppStatus": "N", "uppStatusChgDate": "2024-02-01" }
    ])
}

pub fn parts() -> Value {
    json!([
        { "chgelemChgnoteSeq": 100, "partNo": "007", "qty": "3" },
        { "chgelemChgnoteSeq": 200, "partNo": "12", "qty": "4.5" },
        { "chgelemChgnoteSeq": 300, "partNo": "A1", "qty": null }
    ])
}

pub fn class_param_data() -> Value {
    json!([
        { "uppviewMatSeq": 7, "classParamSeq": 10, "value": "1.5" },
        { "uppviewMatSeq": 7, "classParamSeq": 11, "value": "red" },
        { "uppviewMatSeq": 8, "classParamSeq": 10, "value": "2" },
        { "uppviewMatSeq": 8, "classParamSeq": 12, "value": "unlabelled" }
    ])
}

/// Provider serving one consistent set of documents.
pub fn icm_provider() -> FakeProvider {
    FakeProvider::new()
        .respond("translations", translations())
        .respond("list_values", status_list())
        .respond("class_filter", class_filter())
        .respond("material_data", material_data())
        .respond("change_element_parts", parts())
        .respond("class_param_data", class_param_data())
}
