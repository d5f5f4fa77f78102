//! Scenario 1: First Login
//!
//! A brand-new user signs up, walks the onboarding gate (disclaimer, then
//! the feature tour), lands on the main application with a fully-defaulted
//! profile, and saves their first edits — which write through to the remote
//! profile table.
//!
//! Walk-through for the demo run:
//!   1. Sign-up validates email and password, broadcasts a session
//!   2. Gate: Authenticating → LoadingUserData → NeedsDisclaimer
//!   3. Disclaimer and tour acknowledgments persist the onboarding flags
//!   4. Profile save persists locally first, then upserts the remote row
//!   5. On the next launch the flags are already set: straight to Ready

use std::sync::Arc;

use cura_collections::InMemoryLocalStore;
use cura_contracts::error::{CuraError, CuraResult};
use cura_core::retry::RetryPolicy;
use cura_core::traits::AuthProvider;
use cura_session::{GateState, Screen, SessionGate};

use crate::{MockAuthProvider, MockRemoteStore};

/// Run Scenario 1: First Login.
pub async fn run_scenario() -> CuraResult<()> {
    println!("=== Scenario 1: First Login ===");
    println!();

    let local = Arc::new(InMemoryLocalStore::new());
    let remote = Arc::new(MockRemoteStore::new());
    let auth = MockAuthProvider::new();

    // ── Sign-up ───────────────────────────────────────────────────────────────

    let session = auth.sign_up("pat@example.com", "hunter22").await?;
    println!("  Signed up:        {} (user {})", session.email, session.user_id);

    // ── Gate walk-through ─────────────────────────────────────────────────────

    let mut gate = SessionGate::start(local.clone(), remote.clone(), RetryPolicy::default()).await;
    println!("  Gate state:       {:?} (screen {:?})", gate.state(), gate.screen());

    let commit = gate.apply_session(auth.get_session().await?).await;
    println!("  Load committed:   {:?}", commit);
    println!("  After load:       {:?} (screen {:?})", gate.state(), gate.screen());

    gate.acknowledge_disclaimer().await?;
    println!("  Disclaimer:       acknowledged → {:?}", gate.state());

    gate.complete_tour().await?;
    println!("  Tour:             completed → {:?}", gate.state());
    assert_eq!(gate.screen(), Screen::MainApplication);

    // ── First profile save ────────────────────────────────────────────────────

    let store = gate.user_data_mut().ok_or_else(|| CuraError::NotFound {
        what: "user data after commit".to_string(),
    })?;

    let mut profile = store.profile().clone();
    profile.name = "Pat".to_string();
    profile.age = "34".to_string();
    let receipt = store.save_profile(profile).await?;
    println!(
        "  Profile saved:    name=Pat age=34 (remote sync: {})",
        match &receipt.remote_error {
            None => "ok".to_string(),
            Some(e) => format!("FAILED: {}", e),
        }
    );

    let remote_row = remote.row_for(&session.user_id)?;
    println!(
        "  Remote row:       {}",
        remote_row.map(|row| row.name).unwrap_or_else(|| "<missing>".to_string())
    );

    // ── Second launch: flags already set ──────────────────────────────────────

    let mut relaunch =
        SessionGate::start(local.clone(), remote.clone(), RetryPolicy::default()).await;
    let _ = relaunch.apply_session(auth.get_session().await?).await;
    println!("  Relaunch:         {:?} (onboarding skipped)", relaunch.state());
    assert_eq!(relaunch.state(), GateState::Ready);

    println!();
    println!("  Scenario 1 complete.");
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
