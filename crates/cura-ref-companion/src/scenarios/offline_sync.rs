//! Scenario 2: Offline Sync
//!
//! A returning user logs in while the profile service is down. The loader
//! retries, gives up, falls back to the locally cached profile, and reports
//! the problem without blocking the app. Once the connection returns, a
//! profile save reconciles the remote row.
//!
//! Walk-through for the demo run:
//!   1. A prior session left a cached profile in local storage
//!   2. The remote is scripted to fail the next 3 requests
//!   3. Login: the loader retries 3 times, then falls back to the cache
//!   4. The snapshot carries a non-fatal warning; the gate still advances
//!   5. The outage ends; a profile save writes the remote row back up

use std::sync::Arc;
use std::time::Duration;

use cura_collections::InMemoryLocalStore;
use cura_contracts::{
    error::{CuraError, CuraResult},
    keys::{Collection, StoreKey},
    profile::Profile,
    user::{Session, UserId},
};
use cura_core::retry::RetryPolicy;
use cura_core::traits::LocalStore;
use cura_session::{LoadCommit, SessionGate};

use crate::MockRemoteStore;

/// Short backoff so the demo's retry burn-down is visible but quick.
fn demo_policy() -> RetryPolicy {
    RetryPolicy { max_attempts: 3, backoff: Duration::from_millis(50) }
}

/// Run Scenario 2: Offline Sync.
pub async fn run_scenario() -> CuraResult<()> {
    println!("=== Scenario 2: Offline Sync ===");
    println!();

    let user_id = UserId::new("returning-user");
    let local = Arc::new(InMemoryLocalStore::new());
    let remote = Arc::new(MockRemoteStore::new());

    // ── Seed the state a prior session left behind ────────────────────────────

    let mut cached = Profile::default_for(user_id.clone());
    cached.name = "Alex".to_string();
    cached.age = "41".to_string();
    let key = StoreKey::per_user(Collection::Profile, &user_id);
    let raw = serde_json::to_string(&cached).map_err(|e| CuraError::StorageFailed {
        key: key.as_str().to_string(),
        reason: e.to_string(),
    })?;
    local.set(&key, &raw).await?;

    // Onboarding was finished long ago.
    for flag in [
        cura_contracts::keys::OnboardingFlag::SeenWarning,
        cura_contracts::keys::OnboardingFlag::SeenIntro,
    ] {
        local.set(&StoreKey::flag(flag), "true").await?;
    }

    remote.fail_next(3);
    println!("  Cached profile:   Alex (age 41)");
    println!("  Remote:           scripted to fail the next 3 requests");
    println!();

    // ── Login during the outage ───────────────────────────────────────────────

    let mut gate = SessionGate::start(local.clone(), remote.clone(), demo_policy()).await;
    let commit = gate
        .apply_session(Some(Session {
            user_id: user_id.clone(),
            email: "alex@example.com".to_string(),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        }))
        .await;

    println!("  Remote requests:  {} (all failed)", remote.request_count());
    match &commit {
        Some(LoadCommit::Committed { warning: Some(problems) }) => {
            println!("  Load warning:     {}", problems);
        }
        other => println!("  Load commit:      {:?}", other),
    }
    println!("  Gate state:       {:?}", gate.state());

    let store = gate.user_data_mut().ok_or_else(|| CuraError::NotFound {
        what: "user data after commit".to_string(),
    })?;
    println!("  Profile in use:   {} (from local cache)", store.profile().name);
    assert_eq!(store.profile().name, "Alex");

    // ── Connection returns; reconcile on the next save ────────────────────────

    println!();
    println!("  Outage over; saving an edit reconciles the remote row.");
    let mut edited = store.profile().clone();
    edited.state = "Oregon".to_string();
    let receipt = store.save_profile(edited).await?;
    println!(
        "  Save receipt:     remote sync {}",
        if receipt.remote_error.is_none() { "ok" } else { "failed" }
    );

    let row = remote.row_for(&user_id)?.ok_or_else(|| CuraError::NotFound {
        what: "reconciled remote row".to_string(),
    })?;
    println!("  Remote row:       {} / {}", row.name, row.state);

    println!();
    println!("  Scenario 2 complete.");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scenario_runs_to_completion() {
        run_scenario().await.unwrap();
    }
}
