//! Identity-keyed cache of authenticated sessions.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{OnceCell, RwLock};

use crate::core::credentials::{Credentials, CredentialsId};
use crate::core::provider::SessionToken;
use crate::core::ExtractError;

/// An authenticated session bound to one credential handle.
#[derive(Clone, Debug)]
pub struct Session {
    token: SessionToken,
    credentials: CredentialsId,
    generation: u64,
}

impl Session {
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn credentials(&self) -> CredentialsId {
        self.credentials
    }

    /// Monotonic number telling sessions of the same cache apart.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

type Slot = Arc<OnceCell<Session>>;

/// Memoizes one session per [`Credentials`] identity.
///
/// Concurrent first callers share a single in-flight login. Entries live until
/// [`SessionCache::invalidate`] removes them.
#[derive(Debug, Default)]
pub struct SessionCache {
    slots: RwLock<HashMap<CredentialsId, Slot>>,
    generation: AtomicU64,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached session for `credentials`, logging in through
    /// `authenticate` when there is none yet.
    ///
    /// Login errors are handed back unchanged and leave the slot empty.
    pub async fn get_session<F, Fut>(
        &self,
        credentials: &Credentials,
        authenticate: F,
    ) -> Result<Session, ExtractError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SessionToken, ExtractError>>,
    {
        let id = credentials.id();
        let slot = self.slot(id).await;

        let session = slot
            .get_or_try_init(move || async move {
                let token = authenticate().await?;
                let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!(credentials = ?id, generation, "session established");
                Ok::<_, ExtractError>(Session {
                    token,
                    credentials: id,
                    generation,
                })
            })
            .await?;

        Ok(session.clone())
    }

    /// Evict `session` so the next caller logs in again.
    ///
    /// Only removes the slot while it still holds that exact session; returns
    /// whether anything was evicted.
    pub async fn invalidate(&self, credentials: &Credentials, session: &Session) -> bool {
        let id = credentials.id();
        let mut slots = self.slots.write().await;

        let current = slots
            .get(&id)
            .and_then(|slot| slot.get())
            .is_some_and(|cached| cached.generation == session.generation);

        if current {
            slots.remove(&id);
            tracing::info!(
                credentials = ?id,
                generation = session.generation,
                "session invalidated"
            );
        }
        current
    }

    /// `true` when a completed session is cached for `credentials`.
    pub async fn contains(&self, credentials: &Credentials) -> bool {
        self.slots
            .read()
            .await
            .get(&credentials.id())
            .is_some_and(|slot| slot.initialized())
    }

    async fn slot(&self, id: CredentialsId) -> Slot {
        // Fast path under the read lock.
        if let Some(slot) = self.slots.read().await.get(&id) {
            return slot.clone();
        }

        let mut slots = self.slots.write().await;
        slots
            .entry(id)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}
