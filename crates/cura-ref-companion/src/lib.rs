//! # cura-ref-companion
//!
//! Reference companion runtime for the CURA sync core.
//!
//! Demonstrates three end-to-end app-lifecycle scenarios using mock
//! infrastructure:
//!
//! 1. **First Login** — sign-up, onboarding gate walk-through, first
//!    profile save with remote write-through.
//! 2. **Offline Sync** — remote outage during login: retries, local
//!    fallback, and reconciliation once the connection returns.
//! 3. **Daily Use** — a returning user's day: symptom analysis into
//!    history, medication absorption, reminders, appointments, and the
//!    symptom progress log.
//!
//! All data is hardcoded and fictional. No external API calls are made.

pub mod mock_analysis;
pub mod mock_auth;
pub mod mock_remote;
pub mod scenarios;

pub use mock_auth::MockAuthProvider;
pub use mock_remote::MockRemoteStore;
