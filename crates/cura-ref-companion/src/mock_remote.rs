//! Scriptable in-memory remote profile store.
//!
//! Stands in for the hosted profile table. `fail_next(n)` injects `n`
//! consecutive request failures so scenarios and tests can exercise the
//! retry policy and the offline fallback path deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use cura_contracts::{
    error::{CuraError, CuraResult},
    profile::ProfileRow,
    user::UserId,
};
use cura_core::traits::RemoteProfileStore;

#[derive(Default)]
pub struct MockRemoteStore {
    rows: Mutex<HashMap<String, ProfileRow>>,
    fail_remaining: AtomicU32,
    requests: AtomicU32,
}

impl MockRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` requests (fetches and upserts alike) with a
    /// simulated network outage.
    pub fn fail_next(&self, n: u32) {
        self.fail_remaining.store(n, Ordering::SeqCst);
    }

    /// Total requests seen, including failed ones.
    pub fn request_count(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }

    /// Pre-populate a row, bypassing the failure gate.
    pub fn seed(&self, row: ProfileRow) -> CuraResult<()> {
        self.rows_mut()?.insert(row.user_id.clone(), row);
        Ok(())
    }

    /// The stored row for a user, if any.
    pub fn row_for(&self, user_id: &UserId) -> CuraResult<Option<ProfileRow>> {
        Ok(self.rows_mut()?.get(user_id.as_str()).cloned())
    }

    fn rows_mut(&self) -> CuraResult<std::sync::MutexGuard<'_, HashMap<String, ProfileRow>>> {
        self.rows.lock().map_err(|_| CuraError::RemoteUnavailable {
            reason: "profile table is unavailable".to_string(),
        })
    }

    fn gate(&self) -> CuraResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let mut remaining = self.fail_remaining.load(Ordering::SeqCst);
        while remaining > 0 {
            match self.fail_remaining.compare_exchange(
                remaining,
                remaining - 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => {
                    return Err(CuraError::RemoteUnavailable {
                        reason: "simulated network outage".to_string(),
                    })
                }
                Err(actual) => remaining = actual,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteProfileStore for MockRemoteStore {
    async fn fetch_by_user_id(&self, user_id: &UserId) -> CuraResult<Option<ProfileRow>> {
        self.gate()?;
        self.row_for(user_id)
    }

    async fn upsert(&self, row: &ProfileRow) -> CuraResult<()> {
        self.gate()?;
        self.rows_mut()?.insert(row.user_id.clone(), row.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cura_contracts::profile::Profile;

    fn row(user: &str) -> ProfileRow {
        Profile::default_for(UserId::new(user)).to_row()
    }

    #[tokio::test]
    async fn upsert_then_fetch_round_trip() {
        let remote = MockRemoteStore::new();
        remote.upsert(&row("u1")).await.unwrap();

        let fetched = remote.fetch_by_user_id(&UserId::new("u1")).await.unwrap();
        assert_eq!(fetched.unwrap().user_id, "u1");
        assert!(remote.fetch_by_user_id(&UserId::new("u2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn scripted_failures_burn_down_then_recover() {
        let remote = MockRemoteStore::new();
        remote.seed(row("u1")).unwrap();
        remote.fail_next(2);

        for _ in 0..2 {
            assert!(matches!(
                remote.fetch_by_user_id(&UserId::new("u1")).await,
                Err(CuraError::RemoteUnavailable { .. })
            ));
        }
        assert!(remote.fetch_by_user_id(&UserId::new("u1")).await.unwrap().is_some());
        assert_eq!(remote.request_count(), 3);
    }
}
