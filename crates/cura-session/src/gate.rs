//! The session/onboarding gate state machine.
//!
//! States and their screens:
//!
//! | State             | Screen            |
//! |-------------------|-------------------|
//! | `Authenticating`  | `Loading`         |
//! | `LoggedOut`       | `LoginPrompt`     |
//! | `LoadingUserData` | `Loading`         |
//! | `NeedsDisclaimer` | `Disclaimer`      |
//! | `NeedsTour`       | `Tour`            |
//! | `Ready`           | `MainApplication` |
//!
//! Hard guarantee: `MainApplication` is never presented before at least one
//! (possibly fully defaulted) snapshot for the active user has been
//! committed. The split `on_session_change` / `commit_load` API makes the
//! load itself the caller's await point while keeping the stale-result
//! check inside the gate: a snapshot is committed only if its user id still
//! matches the active session, so a logout during a slow load discards the
//! late result instead of resurrecting the previous user.

use std::sync::Arc;

use tracing::{debug, info, warn};

use cura_collections::UserStore;
use cura_contracts::{
    error::{CuraError, CuraResult},
    keys::{OnboardingFlag, StoreKey},
    snapshot::LoadOutcome,
    user::{Session, UserId},
};
use cura_core::{
    retry::RetryPolicy,
    traits::{LocalStore, RemoteProfileStore},
    Loader,
};

/// Where the application is in the login/onboarding flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Startup, before the first auth event has arrived.
    Authenticating,
    LoggedOut,
    LoadingUserData,
    NeedsDisclaimer,
    NeedsTour,
    /// Terminal until logout.
    Ready,
}

/// The screen the UI should present for the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    LoginPrompt,
    Disclaimer,
    Tour,
    MainApplication,
}

/// A pending load issued by `on_session_change`. Hand it back to
/// `commit_load` together with the outcome; the gate uses it to detect
/// results that went stale while the load was in flight.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    session: Session,
}

impl LoadRequest {
    pub fn user_id(&self) -> &UserId {
        &self.session.user_id
    }
}

/// What `commit_load` did with an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadCommit {
    /// The snapshot was adopted. `warning` carries the load's aggregated
    /// non-fatal problems for the UI to surface, if any.
    Committed { warning: Option<String> },
    /// The session changed while the load was in flight; the result was
    /// discarded.
    Stale,
    /// The loader reported an overlapping call; state is untouched and a
    /// prior call's result is authoritative.
    SkippedInFlight,
}

/// The gate itself. Owns the loader and the signed-in user's `UserStore`;
/// single-owner, driven from the application's event loop.
pub struct SessionGate {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteProfileStore>,
    loader: Loader,
    state: GateState,
    session: Option<Session>,
    seen_warning: bool,
    seen_intro: bool,
    user_data: Option<UserStore>,
}

impl SessionGate {
    /// Construct the gate and read the onboarding flags once.
    ///
    /// A flag that cannot be read counts as unseen: the worst case is one
    /// redundant prompt, never a skipped one.
    pub async fn start(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteProfileStore>,
        policy: RetryPolicy,
    ) -> Self {
        let seen_warning = read_flag(local.as_ref(), OnboardingFlag::SeenWarning).await;
        let seen_intro = read_flag(local.as_ref(), OnboardingFlag::SeenIntro).await;
        debug!(seen_warning, seen_intro, "session gate started");

        Self {
            loader: Loader::new(local.clone(), remote.clone(), policy),
            local,
            remote,
            state: GateState::Authenticating,
            session: None,
            seen_warning,
            seen_intro,
            user_data: None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn screen(&self) -> Screen {
        match self.state {
            GateState::Authenticating | GateState::LoadingUserData => Screen::Loading,
            GateState::LoggedOut => Screen::LoginPrompt,
            GateState::NeedsDisclaimer => Screen::Disclaimer,
            GateState::NeedsTour => Screen::Tour,
            GateState::Ready => Screen::MainApplication,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The signed-in user's data, once a snapshot has been committed.
    pub fn user_data(&self) -> Option<&UserStore> {
        self.user_data.as_ref()
    }

    pub fn user_data_mut(&mut self) -> Option<&mut UserStore> {
        self.user_data.as_mut()
    }

    // ── Session changes ──────────────────────────────────────────────────────

    /// Feed an auth event into the gate.
    ///
    /// Returns a `LoadRequest` when the event requires (re)loading user
    /// data — a new session, or a session for a different user. A refreshed
    /// session for the already-loaded user only updates the stored tokens.
    /// No session collapses every state to `LoggedOut` and drops all
    /// in-memory user data.
    pub fn on_session_change(&mut self, session: Option<Session>) -> Option<LoadRequest> {
        match session {
            None => {
                if self.session.is_some() || self.state == GateState::Authenticating {
                    info!("signed out, clearing user state");
                }
                self.session = None;
                self.user_data = None;
                self.state = GateState::LoggedOut;
                None
            }
            Some(next) => {
                let same_user = self
                    .session
                    .as_ref()
                    .is_some_and(|current| current.user_id == next.user_id);
                if same_user && self.state != GateState::LoadingUserData {
                    debug!(user_id = %next.user_id, "session refreshed for the active user");
                    self.session = Some(next);
                    return None;
                }

                info!(user_id = %next.user_id, "session established, loading user data");
                self.session = Some(next.clone());
                self.user_data = None;
                self.state = GateState::LoadingUserData;
                Some(LoadRequest { session: next })
            }
        }
    }

    /// Run the load for a pending request. Exposed separately from
    /// `commit_load` so callers that race loads against further auth events
    /// can await this without holding the gate mutably.
    pub async fn run_load(&self, request: &LoadRequest) -> LoadOutcome {
        self.loader.load(request.user_id()).await
    }

    /// Adopt (or discard) the outcome of a pending load.
    pub fn commit_load(&mut self, request: &LoadRequest, outcome: LoadOutcome) -> LoadCommit {
        let snapshot = match outcome {
            LoadOutcome::Skipped => return LoadCommit::SkippedInFlight,
            LoadOutcome::Loaded(snapshot) => snapshot,
        };

        let still_active = self
            .session
            .as_ref()
            .is_some_and(|current| &current.user_id == request.user_id());
        if !still_active {
            info!(
                user_id = %request.user_id(),
                "discarding load result for a session that is no longer active"
            );
            return LoadCommit::Stale;
        }

        let warning = snapshot.error.clone();
        if let Some(problems) = &warning {
            warn!(user_id = %request.user_id(), problems = %problems, "load completed with problems");
        }

        self.user_data = Some(UserStore::from_snapshot(
            snapshot,
            self.local.clone(),
            self.remote.clone(),
        ));
        self.state = self.post_load_state();
        LoadCommit::Committed { warning }
    }

    /// Convenience wrapper: session change, load, and commit in one call.
    pub async fn apply_session(&mut self, session: Option<Session>) -> Option<LoadCommit> {
        let request = self.on_session_change(session)?;
        let outcome = self.run_load(&request).await;
        Some(self.commit_load(&request, outcome))
    }

    // ── Onboarding ───────────────────────────────────────────────────────────

    /// Acknowledge the medical disclaimer.
    ///
    /// The flag write is best-effort: a storage failure is logged and the
    /// state still advances, so the user is at worst re-prompted on the
    /// next launch.
    pub async fn acknowledge_disclaimer(&mut self) -> CuraResult<()> {
        if self.state != GateState::NeedsDisclaimer {
            return Err(CuraError::Validation {
                reason: "the disclaimer is not currently presented".to_string(),
            });
        }

        self.persist_flag(OnboardingFlag::SeenWarning).await;
        self.seen_warning = true;
        self.state = self.post_load_state();
        Ok(())
    }

    /// Finish the feature tour.
    pub async fn complete_tour(&mut self) -> CuraResult<()> {
        if self.state != GateState::NeedsTour {
            return Err(CuraError::Validation {
                reason: "the tour is not currently presented".to_string(),
            });
        }

        self.persist_flag(OnboardingFlag::SeenIntro).await;
        self.seen_intro = true;
        self.state = GateState::Ready;
        Ok(())
    }

    /// Skipping the tour counts as completing it.
    pub async fn skip_tour(&mut self) -> CuraResult<()> {
        self.complete_tour().await
    }

    /// The state a freshly committed snapshot lands in, given the
    /// onboarding flags.
    fn post_load_state(&self) -> GateState {
        if !self.seen_warning {
            GateState::NeedsDisclaimer
        } else if !self.seen_intro {
            GateState::NeedsTour
        } else {
            GateState::Ready
        }
    }

    async fn persist_flag(&self, flag: OnboardingFlag) {
        let key = StoreKey::flag(flag);
        if let Err(e) = self.local.set(&key, "true").await {
            warn!(key = %key, error = %e, "onboarding flag could not be persisted");
        }
    }
}

async fn read_flag(local: &dyn LocalStore, flag: OnboardingFlag) -> bool {
    match local.get(&StoreKey::flag(flag)).await {
        Ok(value) => value.as_deref() == Some("true"),
        Err(e) => {
            warn!(key = %StoreKey::flag(flag), error = %e, "onboarding flag could not be read");
            false
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use cura_collections::InMemoryLocalStore;
    use cura_contracts::profile::ProfileRow;

    use super::*;

    /// A remote with no rows that accepts every write.
    struct EmptyRemote;

    #[async_trait]
    impl RemoteProfileStore for EmptyRemote {
        async fn fetch_by_user_id(&self, _user_id: &UserId) -> CuraResult<Option<ProfileRow>> {
            Ok(None)
        }
        async fn upsert(&self, _row: &ProfileRow) -> CuraResult<()> {
            Ok(())
        }
    }

    /// A local store whose writes always fail.
    struct ReadOnlyStore;

    #[async_trait]
    impl LocalStore for ReadOnlyStore {
        async fn get(&self, _key: &StoreKey) -> CuraResult<Option<String>> {
            Ok(None)
        }
        async fn set(&self, key: &StoreKey, _value: &str) -> CuraResult<()> {
            Err(CuraError::StorageFailed {
                key: key.as_str().to_string(),
                reason: "store is full".to_string(),
            })
        }
        async fn remove(&self, _key: &StoreKey) -> CuraResult<()> {
            Ok(())
        }
    }

    fn session_for(user: &str) -> Session {
        Session {
            user_id: UserId::new(user),
            email: format!("{}@example.com", user),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        }
    }

    async fn gate_over(local: Arc<dyn LocalStore>) -> SessionGate {
        SessionGate::start(local, Arc::new(EmptyRemote), RetryPolicy::default()).await
    }

    #[tokio::test]
    async fn starts_authenticating_behind_the_loading_screen() {
        let gate = gate_over(Arc::new(InMemoryLocalStore::new())).await;
        assert_eq!(gate.state(), GateState::Authenticating);
        assert_eq!(gate.screen(), Screen::Loading);
        assert!(gate.user_data().is_none());
    }

    #[tokio::test]
    async fn no_session_collapses_to_logged_out() {
        let mut gate = gate_over(Arc::new(InMemoryLocalStore::new())).await;
        assert!(gate.apply_session(None).await.is_none());
        assert_eq!(gate.state(), GateState::LoggedOut);
        assert_eq!(gate.screen(), Screen::LoginPrompt);
    }

    /// A first-time user walks disclaimer → tour → main application, and
    /// the main screen is never shown before a snapshot is committed.
    #[tokio::test]
    async fn first_login_walks_the_full_onboarding_flow() {
        let local = Arc::new(InMemoryLocalStore::new());
        let mut gate = gate_over(local.clone()).await;

        let commit = gate.apply_session(Some(session_for("u1"))).await.unwrap();
        assert_eq!(commit, LoadCommit::Committed { warning: None });
        assert_eq!(gate.state(), GateState::NeedsDisclaimer);
        assert!(gate.user_data().is_some(), "snapshot committed before any screen past loading");

        gate.acknowledge_disclaimer().await.unwrap();
        assert_eq!(gate.state(), GateState::NeedsTour);

        gate.complete_tour().await.unwrap();
        assert_eq!(gate.state(), GateState::Ready);
        assert_eq!(gate.screen(), Screen::MainApplication);

        // Both flags are now durable.
        assert_eq!(
            local.raw_value(&StoreKey::flag(OnboardingFlag::SeenWarning)).as_deref(),
            Some("true")
        );
        assert_eq!(
            local.raw_value(&StoreKey::flag(OnboardingFlag::SeenIntro)).as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn returning_user_lands_straight_on_the_main_screen() {
        let local = Arc::new(InMemoryLocalStore::new());
        local
            .set(&StoreKey::flag(OnboardingFlag::SeenWarning), "true")
            .await
            .unwrap();
        local
            .set(&StoreKey::flag(OnboardingFlag::SeenIntro), "true")
            .await
            .unwrap();

        let mut gate = gate_over(local).await;
        gate.apply_session(Some(session_for("u1"))).await.unwrap();
        assert_eq!(gate.state(), GateState::Ready);
    }

    #[tokio::test]
    async fn skipping_the_tour_counts_as_completing_it() {
        let mut gate = gate_over(Arc::new(InMemoryLocalStore::new())).await;
        gate.apply_session(Some(session_for("u1"))).await.unwrap();
        gate.acknowledge_disclaimer().await.unwrap();
        gate.skip_tour().await.unwrap();
        assert_eq!(gate.state(), GateState::Ready);
    }

    /// Logout during a slow load: the late snapshot must be discarded, not
    /// resurrected into a logged-out gate.
    #[tokio::test]
    async fn stale_load_result_is_discarded_after_logout() {
        let mut gate = gate_over(Arc::new(InMemoryLocalStore::new())).await;

        let request = gate.on_session_change(Some(session_for("u1"))).unwrap();
        let outcome = gate.run_load(&request).await;

        gate.on_session_change(None);
        assert_eq!(gate.commit_load(&request, outcome), LoadCommit::Stale);
        assert_eq!(gate.state(), GateState::LoggedOut);
        assert!(gate.user_data().is_none());
    }

    /// Switching users mid-load likewise discards the first user's result.
    #[tokio::test]
    async fn load_result_for_a_replaced_user_is_discarded() {
        let mut gate = gate_over(Arc::new(InMemoryLocalStore::new())).await;

        let first = gate.on_session_change(Some(session_for("u1"))).unwrap();
        let outcome = gate.run_load(&first).await;

        let second = gate.on_session_change(Some(session_for("u2"))).unwrap();
        assert_eq!(gate.commit_load(&first, outcome), LoadCommit::Stale);
        assert_eq!(gate.state(), GateState::LoadingUserData);

        let outcome = gate.run_load(&second).await;
        assert!(matches!(
            gate.commit_load(&second, outcome),
            LoadCommit::Committed { .. }
        ));
        assert_eq!(gate.user_data().unwrap().user_id().as_str(), "u2");
    }

    #[tokio::test]
    async fn skipped_outcome_leaves_state_untouched() {
        let mut gate = gate_over(Arc::new(InMemoryLocalStore::new())).await;
        let request = gate.on_session_change(Some(session_for("u1"))).unwrap();
        assert_eq!(
            gate.commit_load(&request, LoadOutcome::Skipped),
            LoadCommit::SkippedInFlight
        );
        assert_eq!(gate.state(), GateState::LoadingUserData);
    }

    #[tokio::test]
    async fn refreshed_session_for_the_active_user_does_not_reload() {
        let mut gate = gate_over(Arc::new(InMemoryLocalStore::new())).await;
        gate.apply_session(Some(session_for("u1"))).await.unwrap();

        let mut refreshed = session_for("u1");
        refreshed.access_token = "rotated".to_string();
        assert!(gate.on_session_change(Some(refreshed)).is_none());
        assert_eq!(gate.session().unwrap().access_token, "rotated");
        assert_ne!(gate.state(), GateState::LoadingUserData);
    }

    /// Flag persistence failure is non-fatal: the state still advances and
    /// the user is merely re-prompted next launch.
    #[tokio::test]
    async fn flag_write_failure_still_advances_onboarding() {
        let mut gate = gate_over(Arc::new(ReadOnlyStore)).await;
        gate.apply_session(Some(session_for("u1"))).await.unwrap();
        assert_eq!(gate.state(), GateState::NeedsDisclaimer);

        gate.acknowledge_disclaimer().await.unwrap();
        assert_eq!(gate.state(), GateState::NeedsTour);
        gate.complete_tour().await.unwrap();
        assert_eq!(gate.state(), GateState::Ready);
    }

    #[tokio::test]
    async fn onboarding_acknowledgements_require_the_matching_state() {
        let mut gate = gate_over(Arc::new(InMemoryLocalStore::new())).await;
        assert!(matches!(
            gate.acknowledge_disclaimer().await,
            Err(CuraError::Validation { .. })
        ));
        assert!(matches!(gate.complete_tour().await, Err(CuraError::Validation { .. })));
    }
}
