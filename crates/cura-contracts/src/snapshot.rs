//! The loader's result types.
//!
//! A `UserSnapshot` is the complete set of loaded (or defaulted) user data
//! produced by one Merge/Load Engine invocation. `LoadOutcome::Skipped` is
//! the at-most-one-concurrent-load sentinel: it signals that a prior call's
//! result is authoritative and forthcoming, not that anything failed.

use serde::{Deserialize, Serialize};

use crate::{
    profile::Profile,
    records::{Appointment, HistoryItem, Reminder, SymptomProgressEntry},
    user::UserId,
};

/// Everything one load produces for one user.
///
/// `error`, when set, aggregates the non-fatal problems encountered along
/// the way (corrupted keys reset, remote unreachable). A populated `error`
/// never means the rest of the snapshot is unusable — every field holds the
/// best-effort data gathered, defaulted where necessary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub profile: Profile,
    pub history: Vec<HistoryItem>,
    pub chat_medications: Vec<String>,
    pub favorite_tips: Vec<String>,
    pub reminders: Vec<Reminder>,
    pub appointments: Vec<Appointment>,
    pub symptom_progress: Vec<SymptomProgressEntry>,
    pub error: Option<String>,
}

impl UserSnapshot {
    /// A fully-defaulted snapshot stamped with the user id.
    pub fn defaulted(user_id: UserId) -> Self {
        Self {
            profile: Profile::default_for(user_id),
            history: Vec::new(),
            chat_medications: Vec::new(),
            favorite_tips: Vec::new(),
            reminders: Vec::new(),
            appointments: Vec::new(),
            symptom_progress: Vec::new(),
            error: None,
        }
    }

    /// The user this snapshot belongs to.
    pub fn user_id(&self) -> &UserId {
        &self.profile.user_id
    }
}

/// What one `Loader::load()` call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The load ran to completion (possibly with non-fatal problems).
    Loaded(UserSnapshot),
    /// Another load was already in flight; this call did nothing.
    Skipped,
}
