//! Scenario 3: Daily Use
//!
//! A fully onboarded user goes through a typical day: runs a symptom
//! analysis that lands in history, absorbs the suggested medications, sets
//! a reminder, books appointments (kept date-sorted), logs symptom
//! progress, and favorites a health tip.
//!
//! Walk-through for the demo run:
//!   1. Symptom analysis → history entry (newest first) + absorbed meds
//!   2. Reminder upsert: a second set for the same medication replaces it
//!   3. Appointments booked out of order come back date-sorted
//!   4. Symptom progress log, newest first
//!   5. A favorite tip toggled on, then a history entry deleted

use std::sync::Arc;

use cura_collections::InMemoryLocalStore;
use cura_contracts::{
    error::{CuraError, CuraResult},
    keys::{OnboardingFlag, StoreKey},
    records::{HistoryItem, HistoryKind, SymptomStatus},
    user::{Session, UserId},
};
use cura_core::retry::RetryPolicy;
use cura_core::traits::LocalStore;
use cura_session::SessionGate;

use crate::mock_analysis::{analyze_symptoms, medicines_in, summary_of};
use crate::MockRemoteStore;

/// Run Scenario 3: Daily Use.
pub async fn run_scenario() -> CuraResult<()> {
    println!("=== Scenario 3: Daily Use ===");
    println!();

    let user_id = UserId::new("daily-user");
    let local = Arc::new(InMemoryLocalStore::new());
    let remote = Arc::new(MockRemoteStore::new());

    for flag in [OnboardingFlag::SeenWarning, OnboardingFlag::SeenIntro] {
        local.set(&StoreKey::flag(flag), "true").await?;
    }

    let mut gate = SessionGate::start(local.clone(), remote.clone(), RetryPolicy::default()).await;
    let _ = gate
        .apply_session(Some(Session {
            user_id: user_id.clone(),
            email: "daily@example.com".to_string(),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
        }))
        .await;

    let store = gate.user_data_mut().ok_or_else(|| CuraError::NotFound {
        what: "user data after commit".to_string(),
    })?;

    // ── Symptom analysis into history ─────────────────────────────────────────

    let query = "fever and sore throat since last night";
    let response = analyze_symptoms(query);
    println!("  Analysis:         {} (urgency {})", summary_of(&response), response["urgency"]);

    let medicines = medicines_in(&response);
    let item = HistoryItem::new(query, summary_of(&response), response, HistoryKind::SymptomAnalysis);
    let first_entry_id = item.id.clone();
    store.push_history(item).await?;

    let absorbed = store.absorb_medications(&medicines).await?;
    println!("  History entries:  {}", store.history().len());
    println!("  Medications:      absorbed {} ({:?})", absorbed, store.chat_medications());

    // ── Reminder upsert ───────────────────────────────────────────────────────

    store.upsert_reminder("Paracetamol", "08:00", Some("sched-1".to_string())).await?;
    store.upsert_reminder("Paracetamol", "09:30", None).await?;
    let reminder = &store.reminders()[0];
    println!(
        "  Reminder:         {} at {} (handle {:?}, {} total)",
        reminder.medication,
        reminder.time,
        reminder.notification_id,
        store.reminders().len()
    );

    // ── Appointments, booked out of order ─────────────────────────────────────

    store.add_appointment("Dentist", "11/02/2026 15:00", None).await?;
    store.add_appointment("GP follow-up", "09/14/2026 10:30", None).await?;
    let titles: Vec<&str> = store.appointments().iter().map(|a| a.title.as_str()).collect();
    println!("  Appointments:     {:?} (date-sorted)", titles);

    // ── Symptom progress log ──────────────────────────────────────────────────

    store.log_symptom_progress("sore throat", "worse in the morning", SymptomStatus::Ongoing).await?;
    store.log_symptom_progress("sore throat", "salt gargles helping", SymptomStatus::Improving).await?;
    println!(
        "  Progress log:     {} entries, latest {:?}",
        store.symptom_progress().len(),
        store.symptom_progress()[0].status
    );

    // ── Favorites and history cleanup ─────────────────────────────────────────

    let favorited = store.toggle_favorite("hydration-101").await?;
    println!("  Favorite tip:     hydration-101 (now favorite: {})", favorited);

    store.delete_history(&first_entry_id).await?;
    println!("  History deleted:  {} entries remain", store.history().len());

    println!();
    println!("  Scenario 3 complete.");
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
