//! The Merge/Load Engine.
//!
//! Given a user id, `Loader::load()` produces one unified, fully-defaulted
//! `UserSnapshot` by reading local storage, reconciling the profile with the
//! remote table under the retry policy, and resolving the six per-user
//! collections independently. The engine owns the entire load/merge path;
//! everything else only reads the resulting snapshot or writes through the
//! mutators.
//!
//! Merge rules, in order:
//!
//! 1. At most one load is in flight at a time — an overlapping call gets
//!    `LoadOutcome::Skipped` immediately instead of interleaving.
//! 2. A reachable remote row unconditionally wins over the local candidate
//!    and is written back to local storage as a cache.
//! 3. When the remote is unreachable after all retries, the local candidate
//!    (if any) survives; otherwise defaults, plus a non-fatal error.
//! 4. Corrupted stored values are deleted and replaced with defaults.
//!
//! The function never fails: every problem is folded into the snapshot's
//! `error` string and the best-effort data is returned regardless.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use cura_contracts::{
    keys::{Collection, StoreKey},
    profile::Profile,
    records::{Appointment, HistoryItem, Reminder, SymptomProgressEntry},
    snapshot::{LoadOutcome, UserSnapshot},
    user::UserId,
};

use crate::{
    retry::{retry, RetryPolicy},
    traits::{LocalStore, RemoteProfileStore},
};

/// The engine driving every load. Construct one per application instance
/// and share it behind an `Arc`; the internal guard makes overlapping calls
/// safe.
pub struct Loader {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteProfileStore>,
    policy: RetryPolicy,
    in_flight: AtomicBool,
}

impl Loader {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteProfileStore>,
        policy: RetryPolicy,
    ) -> Self {
        Self { local, remote, policy, in_flight: AtomicBool::new(false) }
    }

    /// Load and reconcile everything for `user_id`.
    ///
    /// Returns `LoadOutcome::Skipped` when another load (for any user) is
    /// already in flight; callers treat that as "a prior call's result is
    /// authoritative and forthcoming". Otherwise returns a snapshot — this
    /// method never returns an error and never panics on bad stored data.
    pub async fn load(&self, user_id: &UserId) -> LoadOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(user_id = %user_id, "load already in flight, skipping");
            return LoadOutcome::Skipped;
        }

        let snapshot = self.load_all(user_id).await;
        self.in_flight.store(false, Ordering::Release);

        LoadOutcome::Loaded(snapshot)
    }

    /// The whole procedure with the guard already held.
    async fn load_all(&self, user_id: &UserId) -> UserSnapshot {
        info!(user_id = %user_id, "loading user data");

        // Profile reconciliation and the six collection reads share no
        // state, so they all run concurrently.
        let (
            (profile, mut problems),
            (history, history_problem),
            (chat_medications, chat_problem),
            (favorite_tips, favorites_problem),
            (reminders, reminders_problem),
            (appointments, appointments_problem),
            (symptom_progress, symptoms_problem),
        ) = tokio::join!(
            self.resolve_profile(user_id),
            self.load_collection::<HistoryItem>(user_id, Collection::History),
            self.load_collection::<String>(user_id, Collection::ChatMedications),
            self.load_collection::<String>(user_id, Collection::FavoriteTips),
            self.load_collection::<Reminder>(user_id, Collection::Reminders),
            self.load_collection::<Appointment>(user_id, Collection::Appointments),
            self.load_collection::<SymptomProgressEntry>(user_id, Collection::SymptomProgress),
        );

        problems.extend(
            [
                history_problem,
                chat_problem,
                favorites_problem,
                reminders_problem,
                appointments_problem,
                symptoms_problem,
            ]
            .into_iter()
            .flatten(),
        );

        let error = if problems.is_empty() {
            None
        } else {
            warn!(user_id = %user_id, problems = problems.len(), "load completed with problems");
            Some(problems.join("; "))
        };

        UserSnapshot {
            profile,
            history,
            chat_medications,
            favorite_tips,
            reminders,
            appointments,
            symptom_progress,
            error,
        }
    }

    /// Resolve the profile: local candidate first, then the remote row under
    /// the retry policy. A reachable remote row is the merge winner and is
    /// cached back to local storage.
    async fn resolve_profile(&self, user_id: &UserId) -> (Profile, Vec<String>) {
        let mut problems = Vec::new();
        let key = StoreKey::per_user(Collection::Profile, user_id);

        let local_candidate = match self.local.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Profile>(&raw) {
                Ok(profile) if profile.user_id == *user_id => Some(profile),
                Ok(profile) => {
                    warn!(
                        key = %key,
                        expected = %user_id,
                        found = %profile.user_id,
                        "stored profile belongs to a different user, discarding"
                    );
                    self.remove_corrupted(&key).await;
                    problems.push("a stale profile record was discarded".to_string());
                    None
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "stored profile corrupted, discarding");
                    self.remove_corrupted(&key).await;
                    problems.push("the saved profile was corrupted and has been reset".to_string());
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "local profile read failed");
                problems.push(format!("could not read the saved profile: {}", e));
                None
            }
        };

        let profile = match retry(&self.policy, "remote profile fetch", || {
            self.remote.fetch_by_user_id(user_id)
        })
        .await
        {
            Ok(Some(row)) => {
                // Remote wins unconditionally when reachable, even over a
                // newer local edit. Known data-loss hazard, kept as-is.
                let profile = Profile::from_row(&row);
                debug!(user_id = %user_id, "remote profile found, caching locally");
                self.cache_profile(&key, &profile).await;
                profile
            }
            Ok(None) => local_candidate.unwrap_or_else(|| {
                debug!(user_id = %user_id, "no profile anywhere, starting from defaults");
                Profile::default_for(user_id.clone())
            }),
            Err(e) => {
                problems.push(format!(
                    "profile could not be refreshed from the server: {}",
                    e
                ));
                match local_candidate {
                    Some(profile) => {
                        info!(user_id = %user_id, "remote unreachable, keeping local profile");
                        profile
                    }
                    None => Profile::default_for(user_id.clone()),
                }
            }
        };

        (profile, problems)
    }

    /// Read one collection. Absent keys yield an empty sequence; corrupted
    /// values are deleted and yield an empty sequence plus a non-fatal
    /// problem string.
    async fn load_collection<T: DeserializeOwned>(
        &self,
        user_id: &UserId,
        collection: Collection,
    ) -> (Vec<T>, Option<String>) {
        let key = StoreKey::per_user(collection, user_id);

        match self.local.get(&key).await {
            Ok(None) => (Vec::new(), None),
            Ok(Some(raw)) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) => (items, None),
                Err(e) => {
                    warn!(key = %key, error = %e, "stored collection corrupted, resetting");
                    self.remove_corrupted(&key).await;
                    (
                        Vec::new(),
                        Some(format!("{} data was corrupted and has been reset", collection.label())),
                    )
                }
            },
            Err(e) => {
                warn!(key = %key, error = %e, "local collection read failed");
                (
                    Vec::new(),
                    Some(format!("could not read {}: {}", collection.label(), e)),
                )
            }
        }
    }

    /// Write the merged profile back as a local cache. A failed cache write
    /// is logged and otherwise ignored — the snapshot already holds the
    /// authoritative data.
    async fn cache_profile(&self, key: &StoreKey, profile: &Profile) {
        match serde_json::to_string(profile) {
            Ok(raw) => {
                if let Err(e) = self.local.set(key, &raw).await {
                    warn!(key = %key, error = %e, "failed to cache merged profile locally");
                }
            }
            Err(e) => warn!(key = %key, error = %e, "failed to serialize merged profile"),
        }
    }

    /// Delete a corrupted key. Deletion failure is logged only — the next
    /// load will simply hit the same corrupt value again.
    async fn remove_corrupted(&self, key: &StoreKey) {
        if let Err(e) = self.local.remove(key).await {
            warn!(key = %key, error = %e, "failed to remove corrupted key");
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
