//! # cura-contracts
//!
//! Shared types, records, and error contracts for the CURA health-companion
//! sync core.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions, storage-key construction, and the
//! flat remote-row mapping.

pub mod error;
pub mod keys;
pub mod profile;
pub mod records;
pub mod snapshot;
pub mod user;

#[cfg(test)]
mod tests {
    use super::*;
    use error::CuraError;
    use keys::{Collection, OnboardingFlag, StoreKey};
    use profile::{AlcoholUse, ExerciseLevel, Gender, Profile};
    use records::{
        Appointment, HistoryItem, HistoryKind, Reminder, SymptomProgressEntry, SymptomStatus,
    };
    use snapshot::UserSnapshot;
    use user::UserId;

    // ── Storage keys ─────────────────────────────────────────────────────────

    #[test]
    fn per_user_keys_render_the_legacy_templates() {
        let uid = UserId::new("u1");
        assert_eq!(StoreKey::per_user(Collection::Profile, &uid).as_str(), "profile_u1");
        assert_eq!(StoreKey::per_user(Collection::History, &uid).as_str(), "history_u1");
        assert_eq!(
            StoreKey::per_user(Collection::ChatMedications, &uid).as_str(),
            "chatMedications_u1"
        );
        assert_eq!(
            StoreKey::per_user(Collection::FavoriteTips, &uid).as_str(),
            "favoriteTips_u1"
        );
        assert_eq!(StoreKey::per_user(Collection::Reminders, &uid).as_str(), "reminders_u1");
        assert_eq!(
            StoreKey::per_user(Collection::Appointments, &uid).as_str(),
            "appointments_u1"
        );
        assert_eq!(
            StoreKey::per_user(Collection::SymptomProgress, &uid).as_str(),
            "symptomProgress_u1"
        );
    }

    #[test]
    fn flag_keys_are_process_wide() {
        assert_eq!(StoreKey::flag(OnboardingFlag::SeenWarning).as_str(), "hasSeenWarning");
        assert_eq!(StoreKey::flag(OnboardingFlag::SeenIntro).as_str(), "hasSeenIntro");
    }

    #[test]
    fn keys_for_different_users_never_collide() {
        let a = StoreKey::per_user(Collection::History, &UserId::new("alice"));
        let b = StoreKey::per_user(Collection::History, &UserId::new("bob"));
        assert_ne!(a.as_str(), b.as_str());
    }

    // ── Profile defaults and partial deserialization ─────────────────────────

    #[test]
    fn default_profile_is_fully_defined() {
        let p = Profile::default_for(UserId::new("u1"));
        assert_eq!(p.user_id.as_str(), "u1");
        assert_eq!(p.name, "");
        assert!(p.dob.is_none());
        assert_eq!(p.gender, Gender::Unspecified);
        assert!(p.conditions.is_empty());
        assert!(!p.lifestyle.smoker);
        assert_eq!(p.lifestyle.alcohol, AlcoholUse::Never);
        assert_eq!(p.lifestyle.exercise, ExerciseLevel::Sedentary);
        assert_eq!(p.biometrics.height, "");
        assert_eq!(p.emergency_contact.phone, "");
    }

    /// A partial/legacy stored record must still deserialize, with every
    /// missing field (including nested objects and lists) defaulted.
    #[test]
    fn partial_profile_json_deserializes_with_defaults() {
        let raw = r#"{"user_id":"u1","name":"Alex"}"#;
        let p: Profile = serde_json::from_str(raw).unwrap();
        assert_eq!(p.user_id.as_str(), "u1");
        assert_eq!(p.name, "Alex");
        assert!(p.allergies.is_empty());
        assert_eq!(p.lifestyle.dietary_notes, "");
        assert_eq!(p.emergency_contact.name, "");
    }

    #[test]
    fn fully_populated_profile_round_trips() {
        let mut p = Profile::default_for(UserId::new("u2"));
        p.name = "Sam Okafor".to_string();
        p.dob = Some("1987-03-14".to_string());
        p.gender = Gender::Male;
        p.age = "38".to_string();
        p.blood_type = "O+".to_string();
        p.state = "Lagos".to_string();
        p.conditions = vec!["hypertension".to_string(), "type 2 diabetes".to_string()];
        p.allergies = vec!["penicillin".to_string()];
        p.medications = vec!["metformin".to_string(), "lisinopril".to_string()];
        p.medical_history = vec!["appendectomy 2011".to_string()];
        p.family_history = vec!["cardiac disease".to_string()];
        p.vaccination_history = "routine vaccinations up to date".to_string();
        p.lifestyle.smoker = true;
        p.lifestyle.alcohol = AlcoholUse::Occasional;
        p.lifestyle.exercise = ExerciseLevel::Moderate;
        p.lifestyle.dietary_notes = "low salt".to_string();
        p.biometrics.height = "178 cm".to_string();
        p.biometrics.weight = "84 kg".to_string();
        p.emergency_contact.name = "Ada Okafor".to_string();
        p.emergency_contact.relationship = "spouse".to_string();
        p.emergency_contact.phone = "+2348012345678".to_string();

        let json = serde_json::to_string(&p).unwrap();
        let decoded: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(p, decoded);
    }

    // ── Remote row mapping ───────────────────────────────────────────────────

    #[test]
    fn profile_row_mapping_round_trips() {
        let mut p = Profile::default_for(UserId::new("u3"));
        p.name = "Mina".to_string();
        p.conditions = vec!["asthma".to_string(), "eczema".to_string()];
        p.medications = vec!["salbutamol".to_string()];
        p.lifestyle.smoker = true;
        p.lifestyle.alcohol = AlcoholUse::Regular;
        p.emergency_contact.phone = "555-0101".to_string();

        let row = p.to_row();
        assert_eq!(row.conditions, "asthma, eczema");
        assert_eq!(row.lifestyle_smoker, true);

        let back = Profile::from_row(&row);
        assert_eq!(p, back);
    }

    #[test]
    fn empty_list_columns_map_to_empty_lists() {
        let p = Profile::default_for(UserId::new("u4"));
        let row = p.to_row();
        assert_eq!(row.conditions, "");
        let back = Profile::from_row(&row);
        assert!(back.conditions.is_empty());
    }

    #[test]
    fn unknown_enum_labels_in_row_fall_back_to_defaults() {
        let mut row = Profile::default_for(UserId::new("u5")).to_row();
        row.gender = "???".to_string();
        row.lifestyle_alcohol = "daily".to_string();
        row.lifestyle_exercise = "".to_string();
        let p = Profile::from_row(&row);
        assert_eq!(p.gender, Gender::Unspecified);
        assert_eq!(p.lifestyle.alcohol, AlcoholUse::Never);
        assert_eq!(p.lifestyle.exercise, ExerciseLevel::Sedentary);
    }

    // ── Collection record serde round-trips ──────────────────────────────────

    #[test]
    fn history_item_round_trips_with_type_tag() {
        let item = HistoryItem::new(
            "persistent headache",
            "Tension headache",
            serde_json::json!({ "urgency": "low" }),
            HistoryKind::SymptomAnalysis,
        );
        let json = serde_json::to_string(&item).unwrap();
        // The wire field is `type`, matching the stored legacy records.
        assert!(json.contains("\"type\":\"symptom_analysis\""));
        let decoded: HistoryItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, decoded);
    }

    #[test]
    fn reminder_round_trips_including_absent_handle() {
        let r = Reminder {
            medication: "Aspirin".to_string(),
            time: "08:00".to_string(),
            notification_id: None,
        };
        let json = serde_json::to_string(&vec![r.clone()]).unwrap();
        let decoded: Vec<Reminder> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, vec![r]);
    }

    #[test]
    fn empty_collections_round_trip() {
        let empty: Vec<Appointment> = vec![];
        let json = serde_json::to_string(&empty).unwrap();
        let decoded: Vec<Appointment> = serde_json::from_str(&json).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn symptom_entry_round_trips() {
        let e = SymptomProgressEntry::new("sore throat", "worse at night", SymptomStatus::Ongoing);
        let json = serde_json::to_string(&e).unwrap();
        let decoded: SymptomProgressEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(e, decoded);
    }

    // ── Record ids and date parsing ──────────────────────────────────────────

    #[test]
    fn record_ids_are_unique_under_rapid_generation() {
        let ids: std::collections::HashSet<String> =
            (0..200).map(|_| records::new_record_id()).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn appointment_date_parses_the_documented_format() {
        let appt = Appointment {
            id: records::new_record_id(),
            title: "Dr. Rivera follow-up".to_string(),
            date: "03/14/2026 09:30".to_string(),
            notification_id: None,
        };
        let parsed = appt.parsed_date().unwrap();
        assert_eq!(parsed.format("%m/%d/%Y %H:%M").to_string(), "03/14/2026 09:30");

        let bad = Appointment { date: "2026-03-14".to_string(), ..appt };
        assert!(bad.parsed_date().is_none());
    }

    #[test]
    fn reminder_time_parses_only_hh_mm() {
        assert!(Reminder::parse_time("08:00").is_some());
        assert!(Reminder::parse_time("23:59").is_some());
        assert!(Reminder::parse_time("8am").is_none());
        assert!(Reminder::parse_time("25:00").is_none());
    }

    // ── Snapshot defaults ────────────────────────────────────────────────────

    #[test]
    fn defaulted_snapshot_is_empty_and_stamped() {
        let snap = UserSnapshot::defaulted(UserId::new("u9"));
        assert_eq!(snap.profile.user_id.as_str(), "u9");
        assert!(snap.history.is_empty());
        assert!(snap.reminders.is_empty());
        assert!(snap.error.is_none());
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn error_corrupted_record_display() {
        let err = CuraError::CorruptedRecord {
            key: "history_u1".to_string(),
            reason: "expected a JSON array".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("history_u1"));
        assert!(msg.contains("expected a JSON array"));
    }

    #[test]
    fn error_duplicate_entry_display() {
        let err = CuraError::DuplicateEntry { value: "penicillin".to_string() };
        assert!(err.to_string().contains("penicillin"));
    }

    #[test]
    fn error_remote_unavailable_display() {
        let err = CuraError::RemoteUnavailable { reason: "connection refused".to_string() };
        let msg = err.to_string();
        assert!(msg.contains("profile service"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn error_not_found_display() {
        let err = CuraError::NotFound { what: "reminder for 'Aspirin'".to_string() };
        assert!(err.to_string().contains("reminder for 'Aspirin'"));
    }
}
