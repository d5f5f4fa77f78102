//! Simulated analysis backend for the CURA reference runtime.
//!
//! All data in this module is hardcoded and fictional. No external systems
//! are contacted. This module acts as a stand-in for the real analysis
//! service in a production deployment, returning payloads in the same shape
//! the app consumes.

use serde_json::{json, Value};

// ── Symptom analysis (mock) ───────────────────────────────────────────────────

/// Analyze a free-text symptom description.
///
/// Known keywords (case-insensitive):
/// - "headache"            → Tension headache, LOW urgency
/// - "fever", "sore throat"→ Viral pharyngitis, MEDIUM urgency
/// - "chest pain"          → Possible angina, HIGH urgency
///
/// Anything else gets a generic consultation recommendation.
pub fn analyze_symptoms(query: &str) -> Value {
    let q = query.to_lowercase();

    let (condition, analysis, root_cause, remedies, urgency, doctor, medicines) = if q
        .contains("chest pain")
    {
        (
            "Possible angina",
            "Chest pain with exertion can indicate reduced blood flow to the heart muscle and should be assessed promptly",
            "Narrowing of the coronary arteries is the most common underlying cause in adults",
            "Stop activity and rest immediately; seek urgent care if the pain lasts more than a few minutes or radiates to the arm or jaw",
            "high",
            "Cardiologist",
            vec!["Aspirin"],
        )
    } else if q.contains("fever") || q.contains("sore throat") {
        (
            "Viral pharyngitis",
            "Fever with a sore throat most often indicates a self-limiting viral infection of the upper airway",
            "Common respiratory viruses inflame the pharyngeal lining",
            "Rest, fluids, warm salt-water gargles; reassess if symptoms persist beyond 5 days",
            "medium",
            "General Practitioner",
            vec!["Paracetamol", "Ibuprofen"],
        )
    } else if q.contains("headache") {
        (
            "Tension headache",
            "A band-like pressure headache without neurological signs is most consistent with muscle tension",
            "Sustained contraction of scalp and neck muscles, often triggered by stress or poor posture",
            "Hydration, regular breaks from screens, gentle neck stretches, and over-the-counter analgesia as needed",
            "low",
            "General Practitioner",
            vec!["Paracetamol"],
        )
    } else {
        (
            "Needs in-person assessment",
            "The described symptoms do not match a recognizable pattern in the reference data",
            "Unknown",
            "Keep a symptom diary noting onset, duration, and triggers, and book a routine appointment",
            "low",
            "General Practitioner",
            vec![],
        )
    };

    json!({
        "detected_condition": condition,
        "medical_analysis": analysis,
        "root_cause": root_cause,
        "remedies": remedies,
        "urgency": urgency,
        "suggested_doctor": doctor,
        "medicines": medicines,
    })
}

// ── Lab report analysis (mock) ────────────────────────────────────────────────

/// Analyze extracted lab report text. Flags an elevated glucose reading
/// when the text mentions glucose; otherwise everything reads normal.
pub fn analyze_lab_report(text: &str) -> Value {
    let flagged = text.to_lowercase().contains("glucose");

    let (bad_results, advice, urgency, specialist, summary) = if flagged {
        (
            vec!["Fasting glucose 132 mg/dL (reference 70\u{2013}99)"],
            "Repeat the fasting glucose test and discuss an HbA1c check with your doctor",
            "medium",
            "Endocrinologist",
            "One result outside the reference range; follow-up testing recommended",
        )
    } else {
        (
            vec![],
            "No action needed; repeat routine screening at the usual interval",
            "low",
            "General Practitioner",
            "All reported values fall within their reference ranges",
        )
    };

    json!({
        "overview": "Routine metabolic panel",
        "good_results": ["Hemoglobin 14.1 g/dL", "Creatinine 0.9 mg/dL"],
        "bad_results": bad_results,
        "actionable_advice": advice,
        "urgency": urgency,
        "suggested_specialist": specialist,
        "summary": summary,
    })
}

// ── Response helpers ──────────────────────────────────────────────────────────

/// Medication names mentioned by an analysis response, ready for
/// `UserStore::absorb_medications`.
pub fn medicines_in(response: &Value) -> Vec<String> {
    response["medicines"]
        .as_array()
        .map(|names| {
            names
                .iter()
                .filter_map(|name| name.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// The short display summary for a history entry.
pub fn summary_of(response: &Value) -> String {
    response["detected_condition"]
        .as_str()
        .or_else(|| response["summary"].as_str())
        .unwrap_or("Analysis result")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_routing_matches_the_reference_data() {
        let response = analyze_symptoms("I've had a headache since yesterday");
        assert_eq!(response["detected_condition"], "Tension headache");
        assert_eq!(response["urgency"], "low");

        let response = analyze_symptoms("sudden CHEST PAIN when climbing stairs");
        assert_eq!(response["urgency"], "high");
        assert_eq!(response["suggested_doctor"], "Cardiologist");
    }

    #[test]
    fn unknown_symptoms_get_a_generic_recommendation() {
        let response = analyze_symptoms("my elbow glows in the dark");
        assert_eq!(response["detected_condition"], "Needs in-person assessment");
        assert!(medicines_in(&response).is_empty());
    }

    #[test]
    fn medicines_are_extracted_as_plain_strings() {
        let response = analyze_symptoms("fever and sore throat");
        assert_eq!(medicines_in(&response), vec!["Paracetamol", "Ibuprofen"]);
    }

    #[test]
    fn lab_summary_feeds_the_history_entry() {
        let response = analyze_lab_report("fasting glucose looks high");
        assert!(!response["bad_results"].as_array().unwrap().is_empty());
        assert_eq!(
            summary_of(&response),
            "One result outside the reference range; follow-up testing recommended"
        );
    }
}
