use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CREDENTIALS_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Credentials`] handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CredentialsId(u64);

/// Username/password pair used to log in to the source system.
///
/// Identity, not value, is what the session cache keys on: clones of one
/// `Credentials` share a session, while two values built separately from the
/// same strings each get their own.
#[derive(Clone)]
pub struct Credentials {
    inner: Arc<Inner>,
}

struct Inner {
    id: CredentialsId,
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let id = CredentialsId(NEXT_CREDENTIALS_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Arc::new(Inner {
                id,
                username: username.into(),
                password: password.into(),
            }),
        }
    }

    pub fn id(&self) -> CredentialsId {
        self.inner.id
    }

    pub fn username(&self) -> &str {
        &self.inner.username
    }

    pub fn password(&self) -> &str {
        &self.inner.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.inner.id)
            .field("username", &self.inner.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
