//! One user's in-memory state and the per-collection mutators.
//!
//! Every feature area mutates persisted state through the methods here, and
//! only here — the loader populates the initial state, `UserStore` owns all
//! writes afterwards. Each mutator follows the same contract:
//!
//! 1. validate the input (synchronously, before anything is written);
//! 2. compute the next value of the collection;
//! 3. persist it to the local store;
//! 4. only if persistence succeeded, commit the in-memory update.
//!
//! A failed local write therefore leaves the in-memory state exactly where
//! it was: in-memory data is always a subset of what is durably stored.
//! Profile mutations additionally write through to the remote table after
//! the local write; a remote failure is reported on the save receipt but
//! never rolls back the local write (local-first semantics).

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use cura_contracts::{
    error::{CuraError, CuraResult},
    keys::{Collection, StoreKey},
    profile::Profile,
    records::{
        Appointment, HistoryItem, Reminder, SymptomProgressEntry, SymptomStatus,
        APPOINTMENT_DATE_FORMAT,
    },
    snapshot::UserSnapshot,
    user::UserId,
};
use cura_core::traits::{LocalStore, RemoteProfileStore};

/// The list-valued profile fields that share insert/remove semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileListField {
    Conditions,
    Allergies,
    Medications,
    MedicalHistory,
    FamilyHistory,
}

impl ProfileListField {
    fn get(self, profile: &Profile) -> &Vec<String> {
        match self {
            ProfileListField::Conditions => &profile.conditions,
            ProfileListField::Allergies => &profile.allergies,
            ProfileListField::Medications => &profile.medications,
            ProfileListField::MedicalHistory => &profile.medical_history,
            ProfileListField::FamilyHistory => &profile.family_history,
        }
    }

    fn get_mut(self, profile: &mut Profile) -> &mut Vec<String> {
        match self {
            ProfileListField::Conditions => &mut profile.conditions,
            ProfileListField::Allergies => &mut profile.allergies,
            ProfileListField::Medications => &mut profile.medications,
            ProfileListField::MedicalHistory => &mut profile.medical_history,
            ProfileListField::FamilyHistory => &mut profile.family_history,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ProfileListField::Conditions => "conditions",
            ProfileListField::Allergies => "allergies",
            ProfileListField::Medications => "medications",
            ProfileListField::MedicalHistory => "medical history",
            ProfileListField::FamilyHistory => "family history",
        }
    }
}

/// Receipt for a profile save: the local write succeeded (or the call
/// returned `Err`); `remote_error` reports a best-effort sync failure the
/// UI should surface as a dismissable warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSaved {
    pub remote_error: Option<String>,
}

/// One signed-in user's live data plus the write path for all of it.
pub struct UserStore {
    user_id: UserId,
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteProfileStore>,
    profile: Profile,
    history: Vec<HistoryItem>,
    chat_medications: Vec<String>,
    favorite_tips: Vec<String>,
    reminders: Vec<Reminder>,
    appointments: Vec<Appointment>,
    symptom_progress: Vec<SymptomProgressEntry>,
}

impl UserStore {
    /// Adopt a loader snapshot as the live state.
    pub fn from_snapshot(
        snapshot: UserSnapshot,
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteProfileStore>,
    ) -> Self {
        Self {
            user_id: snapshot.profile.user_id.clone(),
            local,
            remote,
            profile: snapshot.profile,
            history: snapshot.history,
            chat_medications: snapshot.chat_medications,
            favorite_tips: snapshot.favorite_tips,
            reminders: snapshot.reminders,
            appointments: snapshot.appointments,
            symptom_progress: snapshot.symptom_progress,
        }
    }

    // ── Read access ──────────────────────────────────────────────────────────

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    pub fn chat_medications(&self) -> &[String] {
        &self.chat_medications
    }

    pub fn favorite_tips(&self) -> &[String] {
        &self.favorite_tips
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn symptom_progress(&self) -> &[SymptomProgressEntry] {
        &self.symptom_progress
    }

    // ── Profile ──────────────────────────────────────────────────────────────

    /// Save a full edited profile: validate, persist locally, commit, then
    /// write through to the remote table.
    ///
    /// The profile is stamped with this store's user id regardless of what
    /// the edit screen passed in.
    pub async fn save_profile(&mut self, mut profile: Profile) -> CuraResult<ProfileSaved> {
        validate_age(&profile.age)?;
        profile.user_id = self.user_id.clone();
        self.persist_profile(profile).await
    }

    /// Insert one trimmed entry into a list-valued profile field.
    ///
    /// Rejects values equal (after trimming) to an existing entry with
    /// `DuplicateEntry` — a distinct outcome, not a silent no-op.
    pub async fn add_profile_list_entry(
        &mut self,
        field: ProfileListField,
        value: &str,
    ) -> CuraResult<ProfileSaved> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CuraError::Validation {
                reason: format!("a {} entry cannot be empty", field.label()),
            });
        }
        if field.get(&self.profile).iter().any(|existing| existing == trimmed) {
            return Err(CuraError::DuplicateEntry { value: trimmed.to_string() });
        }

        let mut next = self.profile.clone();
        field.get_mut(&mut next).push(trimmed.to_string());
        self.persist_profile(next).await
    }

    /// Remove a list entry by positional index. The index must currently
    /// exist.
    pub async fn remove_profile_list_entry(
        &mut self,
        field: ProfileListField,
        index: usize,
    ) -> CuraResult<ProfileSaved> {
        if index >= field.get(&self.profile).len() {
            return Err(CuraError::NotFound {
                what: format!("{} entry at position {}", field.label(), index),
            });
        }

        let mut next = self.profile.clone();
        field.get_mut(&mut next).remove(index);
        self.persist_profile(next).await
    }

    /// Local write, in-memory commit, then best-effort remote write-through.
    async fn persist_profile(&mut self, next: Profile) -> CuraResult<ProfileSaved> {
        self.persist(Collection::Profile, &next).await?;
        self.profile = next;

        let remote_error = match self.remote.upsert(&self.profile.to_row()).await {
            Ok(()) => {
                debug!(user_id = %self.user_id, "profile synced to remote");
                None
            }
            Err(e) => {
                warn!(
                    user_id = %self.user_id,
                    error = %e,
                    "remote profile sync failed, local copy is saved"
                );
                Some(e.to_string())
            }
        };

        Ok(ProfileSaved { remote_error })
    }

    // ── Analysis history ─────────────────────────────────────────────────────

    /// Prepend an analysis result (newest first).
    pub async fn push_history(&mut self, item: HistoryItem) -> CuraResult<()> {
        let mut next = self.history.clone();
        next.insert(0, item);
        self.persist(Collection::History, &next).await?;
        self.history = next;
        Ok(())
    }

    /// Delete one history item by id. Reports `NotFound` without touching
    /// storage when the id is absent.
    pub async fn delete_history(&mut self, id: &str) -> CuraResult<()> {
        let position = self
            .history
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| CuraError::NotFound { what: format!("history item '{}'", id) })?;

        let mut next = self.history.clone();
        next.remove(position);
        self.persist(Collection::History, &next).await?;
        self.history = next;
        Ok(())
    }

    /// Remove every history item.
    pub async fn clear_history(&mut self) -> CuraResult<()> {
        let next: Vec<HistoryItem> = Vec::new();
        self.persist(Collection::History, &next).await?;
        self.history = next;
        Ok(())
    }

    /// Accumulate medication names mentioned by an analysis response.
    ///
    /// De-duplicated case-insensitively after trimming (the source is
    /// free-text model output). Returns how many new entries were added;
    /// zero additions skips the write entirely.
    pub async fn absorb_medications(&mut self, medications: &[String]) -> CuraResult<usize> {
        let mut next = self.chat_medications.clone();
        for medication in medications {
            let trimmed = medication.trim();
            if trimmed.is_empty() {
                continue;
            }
            let already_known = next
                .iter()
                .any(|existing| existing.eq_ignore_ascii_case(trimmed));
            if !already_known {
                next.push(trimmed.to_string());
            }
        }

        let added = next.len() - self.chat_medications.len();
        if added == 0 {
            return Ok(0);
        }

        self.persist(Collection::ChatMedications, &next).await?;
        self.chat_medications = next;
        Ok(added)
    }

    // ── Favorite tips ────────────────────────────────────────────────────────

    /// Toggle membership of a tip id; returns whether the tip is a favorite
    /// after the call.
    pub async fn toggle_favorite(&mut self, tip_id: &str) -> CuraResult<bool> {
        let mut next = self.favorite_tips.clone();
        let now_member = match next.iter().position(|id| id == tip_id) {
            Some(position) => {
                next.remove(position);
                false
            }
            None => {
                next.push(tip_id.to_string());
                true
            }
        };

        self.persist(Collection::FavoriteTips, &next).await?;
        self.favorite_tips = next;
        Ok(now_member)
    }

    // ── Reminders ────────────────────────────────────────────────────────────

    /// Set the reminder for a medication, replacing any existing one in
    /// place. When no new scheduler handle is supplied, the existing handle
    /// is preserved so the platform notification stays linked.
    pub async fn upsert_reminder(
        &mut self,
        medication: &str,
        time: &str,
        notification_id: Option<String>,
    ) -> CuraResult<()> {
        let medication = medication.trim();
        if medication.is_empty() {
            return Err(CuraError::Validation {
                reason: "a reminder needs a medication name".to_string(),
            });
        }
        if Reminder::parse_time(time).is_none() {
            return Err(CuraError::Validation {
                reason: format!("'{}' is not a valid HH:MM time", time),
            });
        }

        let mut next = self.reminders.clone();
        match next.iter_mut().find(|r| r.medication == medication) {
            Some(existing) => {
                existing.time = time.to_string();
                if notification_id.is_some() {
                    existing.notification_id = notification_id;
                }
            }
            None => next.push(Reminder {
                medication: medication.to_string(),
                time: time.to_string(),
                notification_id,
            }),
        }

        self.persist(Collection::Reminders, &next).await?;
        self.reminders = next;
        Ok(())
    }

    /// Cancel the reminder for a medication, returning the removed record
    /// so the caller can release its scheduler handle.
    pub async fn cancel_reminder(&mut self, medication: &str) -> CuraResult<Reminder> {
        let medication = medication.trim();
        let position = self
            .reminders
            .iter()
            .position(|r| r.medication == medication)
            .ok_or_else(|| CuraError::NotFound {
                what: format!("reminder for '{}'", medication),
            })?;

        let mut next = self.reminders.clone();
        let removed = next.remove(position);
        self.persist(Collection::Reminders, &next).await?;
        self.reminders = next;
        Ok(removed)
    }

    // ── Appointments ─────────────────────────────────────────────────────────

    /// Book an appointment; the collection stays sorted ascending by parsed
    /// date. Returns the generated appointment id.
    pub async fn add_appointment(
        &mut self,
        title: &str,
        date: &str,
        notification_id: Option<String>,
    ) -> CuraResult<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CuraError::Validation {
                reason: "an appointment needs a title".to_string(),
            });
        }
        if NaiveDateTime::parse_from_str(date, APPOINTMENT_DATE_FORMAT).is_err() {
            return Err(CuraError::Validation {
                reason: format!("'{}' is not a valid MM/DD/YYYY HH:MM date", date),
            });
        }

        let appointment = Appointment {
            id: cura_contracts::records::new_record_id(),
            title: title.to_string(),
            date: date.to_string(),
            notification_id,
        };
        let id = appointment.id.clone();

        let mut next = self.appointments.clone();
        next.push(appointment);
        // Validated dates always parse; anything unparseable from older
        // stored data sorts to the end rather than failing the insert.
        next.sort_by_key(|a| a.parsed_date().unwrap_or(NaiveDateTime::MAX));

        self.persist(Collection::Appointments, &next).await?;
        self.appointments = next;
        Ok(id)
    }

    /// Cancel an appointment by id, returning the removed record.
    pub async fn cancel_appointment(&mut self, id: &str) -> CuraResult<Appointment> {
        let position = self
            .appointments
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| CuraError::NotFound { what: format!("appointment '{}'", id) })?;

        let mut next = self.appointments.clone();
        let removed = next.remove(position);
        self.persist(Collection::Appointments, &next).await?;
        self.appointments = next;
        Ok(removed)
    }

    // ── Symptom progress log ─────────────────────────────────────────────────

    /// Log a symptom progress entry; the collection stays sorted descending
    /// by timestamp (newest first).
    pub async fn log_symptom_progress(
        &mut self,
        symptoms: &str,
        notes: &str,
        status: SymptomStatus,
    ) -> CuraResult<String> {
        let symptoms = symptoms.trim();
        if symptoms.is_empty() {
            return Err(CuraError::Validation {
                reason: "a symptom entry needs a description".to_string(),
            });
        }

        let entry = SymptomProgressEntry::new(symptoms, notes.trim(), status);
        let id = entry.id.clone();

        let mut next = self.symptom_progress.clone();
        next.push(entry);
        next.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        self.persist(Collection::SymptomProgress, &next).await?;
        self.symptom_progress = next;
        Ok(id)
    }

    // ── Shared persistence step ──────────────────────────────────────────────

    /// Serialize and durably store the next value of a collection under
    /// this user's key. Callers commit the in-memory update only after this
    /// returns `Ok`.
    async fn persist<T: Serialize>(&self, collection: Collection, value: &T) -> CuraResult<()> {
        let key = StoreKey::per_user(collection, &self.user_id);
        let raw = serde_json::to_string(value).map_err(|e| CuraError::StorageFailed {
            key: key.as_str().to_string(),
            reason: format!("serialization failed: {}", e),
        })?;
        self.local.set(&key, &raw).await
    }
}

fn validate_age(age: &str) -> CuraResult<()> {
    if age.is_empty() || age.parse::<u32>().is_ok() {
        Ok(())
    } else {
        Err(CuraError::Validation {
            reason: format!("'{}' is not a valid age", age),
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
