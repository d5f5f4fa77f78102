//! The user profile and its flat remote representation.
//!
//! `Profile` is the nested, fully-defaulted local shape; `ProfileRow` is the
//! flattened row stored in the remote profile table (list fields are
//! comma-joined strings). Every `Profile` field carries `#[serde(default)]`
//! so partial or legacy stored records still deserialize — each nested
//! object and list is individually defaulted, never replaced wholesale.

use serde::{Deserialize, Serialize};

use crate::user::UserId;

// ── Enumerated fields ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Unspecified,
    Female,
    Male,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Unspecified => "unspecified",
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::Other => "other",
        }
    }

    /// Parse a stored label, falling back to the default on anything
    /// unrecognized so the row mapping stays total.
    pub fn parse_or_default(label: &str) -> Self {
        match label {
            "female" => Gender::Female,
            "male" => Gender::Male,
            "other" => Gender::Other,
            _ => Gender::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlcoholUse {
    #[default]
    Never,
    Occasional,
    Regular,
}

impl AlcoholUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlcoholUse::Never => "never",
            AlcoholUse::Occasional => "occasional",
            AlcoholUse::Regular => "regular",
        }
    }

    pub fn parse_or_default(label: &str) -> Self {
        match label {
            "occasional" => AlcoholUse::Occasional,
            "regular" => AlcoholUse::Regular,
            _ => AlcoholUse::Never,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    Active,
}

impl ExerciseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseLevel::Sedentary => "sedentary",
            ExerciseLevel::Light => "light",
            ExerciseLevel::Moderate => "moderate",
            ExerciseLevel::Active => "active",
        }
    }

    pub fn parse_or_default(label: &str) -> Self {
        match label {
            "light" => ExerciseLevel::Light,
            "moderate" => ExerciseLevel::Moderate,
            "active" => ExerciseLevel::Active,
            _ => ExerciseLevel::Sedentary,
        }
    }
}

// ── Nested value objects ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifestyle {
    #[serde(default)]
    pub smoker: bool,
    #[serde(default)]
    pub alcohol: AlcoholUse,
    #[serde(default)]
    pub exercise: ExerciseLevel,
    #[serde(default)]
    pub dietary_notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Biometrics {
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub weight: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub phone: String,
}

// ── Profile ───────────────────────────────────────────────────────────────────

/// One record per user; created with defaults on first successful
/// authentication, mutated through the edit screens, persisted to both the
/// local store and the remote table on save. Never hard-deleted — fields are
/// only ever cleared back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    /// Kept as a string for the edit screens; numeric-validated on save.
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub blood_type: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub medical_history: Vec<String>,
    #[serde(default)]
    pub family_history: Vec<String>,
    #[serde(default)]
    pub vaccination_history: String,
    #[serde(default)]
    pub lifestyle: Lifestyle,
    #[serde(default)]
    pub biometrics: Biometrics,
    #[serde(default)]
    pub emergency_contact: EmergencyContact,
}

impl Profile {
    /// The zero-value "empty profile" stamped with a user id.
    pub fn default_for(user_id: UserId) -> Self {
        Self { user_id, ..Self::default() }
    }

    /// Flatten into the remote row representation.
    pub fn to_row(&self) -> ProfileRow {
        ProfileRow {
            user_id: self.user_id.as_str().to_string(),
            name: self.name.clone(),
            dob: self.dob.clone(),
            gender: self.gender.as_str().to_string(),
            age: self.age.clone(),
            conditions: join_list(&self.conditions),
            allergies: join_list(&self.allergies),
            medications: join_list(&self.medications),
            medical_history: join_list(&self.medical_history),
            family_history: join_list(&self.family_history),
            vaccination_history: self.vaccination_history.clone(),
            blood_type: self.blood_type.clone(),
            lifestyle_smoker: self.lifestyle.smoker,
            lifestyle_alcohol: self.lifestyle.alcohol.as_str().to_string(),
            lifestyle_exercise: self.lifestyle.exercise.as_str().to_string(),
            lifestyle_dietary_notes: self.lifestyle.dietary_notes.clone(),
            biometrics_height: self.biometrics.height.clone(),
            biometrics_weight: self.biometrics.weight.clone(),
            emergency_contact_name: self.emergency_contact.name.clone(),
            emergency_contact_relationship: self.emergency_contact.relationship.clone(),
            emergency_contact_phone: self.emergency_contact.phone.clone(),
            state: self.state.clone(),
        }
    }

    /// Map a remote row back into the nested shape.
    ///
    /// Total by construction: unknown enum labels fall back to their
    /// defaults rather than failing the load.
    pub fn from_row(row: &ProfileRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id.clone()),
            name: row.name.clone(),
            dob: row.dob.clone(),
            gender: Gender::parse_or_default(&row.gender),
            age: row.age.clone(),
            blood_type: row.blood_type.clone(),
            state: row.state.clone(),
            conditions: split_list(&row.conditions),
            allergies: split_list(&row.allergies),
            medications: split_list(&row.medications),
            medical_history: split_list(&row.medical_history),
            family_history: split_list(&row.family_history),
            vaccination_history: row.vaccination_history.clone(),
            lifestyle: Lifestyle {
                smoker: row.lifestyle_smoker,
                alcohol: AlcoholUse::parse_or_default(&row.lifestyle_alcohol),
                exercise: ExerciseLevel::parse_or_default(&row.lifestyle_exercise),
                dietary_notes: row.lifestyle_dietary_notes.clone(),
            },
            biometrics: Biometrics {
                height: row.biometrics_height.clone(),
                weight: row.biometrics_weight.clone(),
            },
            emergency_contact: EmergencyContact {
                name: row.emergency_contact_name.clone(),
                relationship: row.emergency_contact_relationship.clone(),
                phone: row.emergency_contact_phone.clone(),
            },
        }
    }
}

// ── Remote row ────────────────────────────────────────────────────────────────

/// The flat record stored in the remote profile table, one row per user id.
///
/// List-valued profile fields are comma-joined strings in the table; the
/// mapping back tolerates arbitrary whitespace around the commas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub medications: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub family_history: String,
    #[serde(default)]
    pub vaccination_history: String,
    #[serde(default)]
    pub blood_type: String,
    #[serde(default)]
    pub lifestyle_smoker: bool,
    #[serde(default)]
    pub lifestyle_alcohol: String,
    #[serde(default)]
    pub lifestyle_exercise: String,
    #[serde(default)]
    pub lifestyle_dietary_notes: String,
    #[serde(default)]
    pub biometrics_height: String,
    #[serde(default)]
    pub biometrics_weight: String,
    #[serde(default)]
    pub emergency_contact_name: String,
    #[serde(default)]
    pub emergency_contact_relationship: String,
    #[serde(default)]
    pub emergency_contact_phone: String,
    #[serde(default)]
    pub state: String,
}

fn join_list(items: &[String]) -> String {
    items.join(", ")
}

fn split_list(column: &str) -> Vec<String> {
    column
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
