//! Per-user collection record types.
//!
//! Sorting and de-duplication rules for these collections are enforced by
//! the mutators in `cura-collections`; this module only defines the shapes,
//! the id scheme, and the date/time format accessors.

use chrono::{NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Appointment dates are stored as `"MM/DD/YYYY HH:MM"`.
pub const APPOINTMENT_DATE_FORMAT: &str = "%m/%d/%Y %H:%M";

/// Reminder times are stored as `"HH:MM"` (24-hour).
pub const REMINDER_TIME_FORMAT: &str = "%H:%M";

/// Generate a collection-unique record id.
///
/// Epoch milliseconds plus a random suffix, so rapid successive writes in
/// the same millisecond cannot collide.
pub fn new_record_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}

// ── Analysis history ──────────────────────────────────────────────────────────

/// What kind of analysis produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    SymptomAnalysis,
    LabReport,
}

/// One analysis result in the user's history.
///
/// Append-only from the user's perspective (prepended, newest first);
/// individually deletable and bulk-clearable. The `response` payload is
/// opaque to the core — it is whatever the analysis backend returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    /// The query text the user submitted.
    pub text: String,
    /// Short display summary (e.g. the detected condition).
    pub summary: String,
    /// Display timestamp, RFC 3339.
    pub time: String,
    /// Opaque analysis payload.
    pub response: serde_json::Value,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
}

impl HistoryItem {
    pub fn new(
        text: impl Into<String>,
        summary: impl Into<String>,
        response: serde_json::Value,
        kind: HistoryKind,
    ) -> Self {
        Self {
            id: new_record_id(),
            text: text.into(),
            summary: summary.into(),
            time: Utc::now().to_rfc3339(),
            response,
            kind,
        }
    }
}

// ── Reminders ─────────────────────────────────────────────────────────────────

/// A medication reminder. At most one per distinct medication name per user;
/// the medication name is the upsert key, not a separate id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub medication: String,
    /// `"HH:MM"`, 24-hour.
    pub time: String,
    /// Opaque handle into the platform notification scheduler.
    pub notification_id: Option<String>,
}

impl Reminder {
    /// Parse an `"HH:MM"` string, `None` if malformed.
    pub fn parse_time(time: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(time, REMINDER_TIME_FORMAT).ok()
    }
}

// ── Appointments ──────────────────────────────────────────────────────────────

/// A booked appointment. The collection is kept sorted ascending by parsed
/// date on every insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub title: String,
    /// `"MM/DD/YYYY HH:MM"`.
    pub date: String,
    /// Opaque handle into the platform notification scheduler.
    pub notification_id: Option<String>,
}

impl Appointment {
    /// Parse the stored date string, `None` if malformed.
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, APPOINTMENT_DATE_FORMAT).ok()
    }
}

// ── Symptom progress log ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymptomStatus {
    Ongoing,
    Improving,
    Recovered,
    Escalate,
}

/// One entry in the symptom progress log. The collection is kept sorted
/// descending by `timestamp` on every insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomProgressEntry {
    pub id: String,
    /// Display date, `"MM/DD/YYYY"`.
    pub date: String,
    /// Display time, `"HH:MM"`.
    pub time: String,
    pub symptoms: String,
    pub notes: String,
    pub status: SymptomStatus,
    /// Sortable ISO timestamp (RFC 3339).
    pub timestamp: String,
}

impl SymptomProgressEntry {
    pub fn new(symptoms: impl Into<String>, notes: impl Into<String>, status: SymptomStatus) -> Self {
        let now = Utc::now();
        Self {
            id: new_record_id(),
            date: now.format("%m/%d/%Y").to_string(),
            time: now.format("%H:%M").to_string(),
            symptoms: symptoms.into(),
            notes: notes.into(),
            status,
            timestamp: now.to_rfc3339(),
        }
    }
}
