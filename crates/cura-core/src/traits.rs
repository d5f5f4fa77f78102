//! Core trait definitions for the CURA sync pipeline.
//!
//! These three traits define the platform boundary:
//!
//! - `LocalStore`         — durable on-device key-value storage
//! - `RemoteProfileStore` — the hosted profile table (point lookup + upsert)
//! - `AuthProvider`       — session issuance and change notification
//!
//! The loader, gate, and mutators only ever see these traits; concrete
//! implementations (device storage, hosted backend, mocks) are injected by
//! the hosting application at startup. Nothing in the core imports a
//! platform client directly.

use async_trait::async_trait;
use tokio::sync::watch;

use cura_contracts::{
    error::CuraResult,
    keys::StoreKey,
    profile::ProfileRow,
    user::{Session, UserId},
};

/// Durable per-device key-value storage holding serialized JSON blobs.
///
/// Writes are the durability boundary for the whole application: in-memory
/// state is only updated after a `set` succeeds. Every operation may fail
/// and must report it — implementations never swallow errors.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Fetch the raw value under `key`, or `None` if absent.
    async fn get(&self, key: &StoreKey) -> CuraResult<Option<String>>;

    /// Durably store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &StoreKey, value: &str) -> CuraResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &StoreKey) -> CuraResult<()>;
}

/// The hosted profile table, keyed by user id.
///
/// Reads go through the loader's retry policy; write-throughs from the
/// profile mutators are single-attempt and best-effort.
#[async_trait]
pub trait RemoteProfileStore: Send + Sync {
    /// Point lookup of one user's row. `Ok(None)` means the user has never
    /// saved a profile remotely — distinct from a transport failure.
    async fn fetch_by_user_id(&self, user_id: &UserId) -> CuraResult<Option<ProfileRow>>;

    /// Insert or replace the row for `row.user_id`.
    async fn upsert(&self, row: &ProfileRow) -> CuraResult<()>;
}

/// Session issuance and change notification.
///
/// Injected as a capability rather than imported as a module-level client,
/// so the gate can be driven by mocks in tests and by the hosted provider
/// in production.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The current session, if any.
    async fn get_session(&self) -> CuraResult<Option<Session>>;

    /// Subscribe to session changes. The receiver observes every sign-in
    /// and sign-out, including the current value at subscription time.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    async fn sign_in(&self, email: &str, password: &str) -> CuraResult<Session>;

    async fn sign_up(&self, email: &str, password: &str) -> CuraResult<Session>;

    async fn sign_out(&self) -> CuraResult<()>;
}
