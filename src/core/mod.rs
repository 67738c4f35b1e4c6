//! Core components of the extractor.
//!
//! This module contains the foundational building blocks, including:
//! - The [`SourceProvider`] capability and its HTTP implementation [`IcmClient`].
//! - The primary [`ExtractError`] type.
//! - Credential handles and the single-flight [`SessionCache`].
//! - Retry and persistent-error backoff policies.

/// Persistent-error cooldown between failed cycles.
pub mod backoff;
/// The ICM client (`IcmClient`) and its builder.
pub mod client;
/// Credential handles with process-unique identity.
pub mod credentials;
/// The primary error type (`ExtractError`) for the crate.
pub mod error;
/// The source-provider capability and its query descriptors.
pub mod provider;
/// Bounded retry with a fixed delay.
pub mod retry;
/// Identity-keyed session cache.
pub mod session;

pub(crate) mod net;

// convenient re-exports so most code can just `use crate::core::IcmClient`
pub use backoff::PersistentErrorBackoff;
pub use client::{IcmClient, IcmClientBuilder};
pub use credentials::{Credentials, CredentialsId};
pub use error::ExtractError;
pub use provider::{Query, SessionToken, SourceProvider};
pub use retry::{RetryConfig, RetryPolicy, with_retry};
pub use session::{Session, SessionCache};
