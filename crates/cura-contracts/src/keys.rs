//! Typed storage-key construction.
//!
//! Persisted local keys follow the legacy string templates
//! (`profile_<userId>`, `history_<userId>`, …) but are only ever built
//! through this module — call sites name a `Collection` and a `UserId`
//! instead of formatting strings, which removes the typo-induced
//! key-collision class entirely.

use crate::user::UserId;

/// The per-user collections held in the local key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Profile,
    History,
    ChatMedications,
    FavoriteTips,
    Reminders,
    Appointments,
    SymptomProgress,
}

impl Collection {
    /// The key prefix used in the stored template `<prefix>_<userId>`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Collection::Profile => "profile",
            Collection::History => "history",
            Collection::ChatMedications => "chatMedications",
            Collection::FavoriteTips => "favoriteTips",
            Collection::Reminders => "reminders",
            Collection::Appointments => "appointments",
            Collection::SymptomProgress => "symptomProgress",
        }
    }

    /// A short human label used in load-problem messages.
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Profile => "profile",
            Collection::History => "analysis history",
            Collection::ChatMedications => "chat medications",
            Collection::FavoriteTips => "favorite tips",
            Collection::Reminders => "reminders",
            Collection::Appointments => "appointments",
            Collection::SymptomProgress => "symptom log",
        }
    }
}

/// Process-wide onboarding flags, persisted once acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingFlag {
    /// The medical disclaimer has been acknowledged.
    SeenWarning,
    /// The feature tour has been completed or skipped.
    SeenIntro,
}

/// A fully-resolved local storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey(String);

impl StoreKey {
    /// Key for one user's copy of a collection.
    pub fn per_user(collection: Collection, user_id: &UserId) -> Self {
        Self(format!("{}_{}", collection.prefix(), user_id.as_str()))
    }

    /// Key for a process-wide onboarding flag.
    pub fn flag(flag: OnboardingFlag) -> Self {
        let key = match flag {
            OnboardingFlag::SeenWarning => "hasSeenWarning",
            OnboardingFlag::SeenIntro => "hasSeenIntro",
        };
        Self(key.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
