//! Static text pools used as categorical sampling sources.
//!
//! Every string here is fictional. Pools are disjoint per event kind so that
//! the kind of an event can be read off its content.

use crate::types::EventKind;

/// Role a speaker plays in a consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerRole {
    Doctor,
    Patient,
}

/// A named participant template.
#[derive(Debug, Clone, Copy)]
pub struct SpeakerTemplate {
    pub name: &'static str,
    pub role: SpeakerRole,
}

pub const SPEAKERS: &[SpeakerTemplate] = &[
    SpeakerTemplate { name: "Dra. Elena Morales", role: SpeakerRole::Doctor },
    SpeakerTemplate { name: "Dr. Andrés Castillo", role: SpeakerRole::Doctor },
    SpeakerTemplate { name: "Dra. Lucía Herrera", role: SpeakerRole::Doctor },
    SpeakerTemplate { name: "Dr. Tomás Rivera", role: SpeakerRole::Doctor },
    SpeakerTemplate { name: "Paciente María G.", role: SpeakerRole::Patient },
    SpeakerTemplate { name: "Paciente José L.", role: SpeakerRole::Patient },
    SpeakerTemplate { name: "Paciente Ana P.", role: SpeakerRole::Patient },
    SpeakerTemplate { name: "Paciente Carlos R.", role: SpeakerRole::Patient },
    SpeakerTemplate { name: "Paciente Sofía M.", role: SpeakerRole::Patient },
];

/// Names of all speakers with the given role, in pool order.
pub fn speakers_with_role(role: SpeakerRole) -> Vec<&'static str> {
    SPEAKERS
        .iter()
        .filter(|s| s.role == role)
        .map(|s| s.name)
        .collect()
}

pub const SYMPTOMS: &[&str] = &[
    "Intermittent chest tightness after climbing stairs",
    "Persistent dry cough for three weeks",
    "Throbbing headache behind the left eye since yesterday",
    "Lower back pain radiating to the right leg",
    "Fatigue and shortness of breath on exertion",
    "Burning sensation when urinating for two days",
    "Dizziness when standing up quickly",
    "Low-grade fever with night sweats",
    "Swelling in both ankles by the end of the day",
    "Heartburn that worsens when lying down",
    "Numbness and tingling in the fingertips",
    "Itchy rash on the forearms after gardening",
];

pub const QUESTIONS: &[&str] = &[
    "When did you first notice the symptoms?",
    "Does anything make the pain better or worse?",
    "Are you currently taking any medication?",
    "Have you had any recent travel or sick contacts?",
    "How would you rate the pain from one to ten?",
    "Is there any family history of heart disease?",
    "Have you noticed any changes in appetite or weight?",
    "Do the symptoms wake you up at night?",
];

/// Prompts a clinician types to the assistant.
pub const CLINICIAN_PROMPTS: &[&str] = &[
    "Summarize the history of present illness",
    "List differential diagnoses for these findings",
    "Draft a SOAP note from the conversation so far",
    "Which labs should I order next?",
    "Check interactions with the current medication list",
    "Translate the discharge instructions into plain language",
];

pub const RESPONSES: &[&str] = &[
    "It started about a week ago, mostly in the mornings.",
    "Resting helps a little, but it comes back.",
    "Only an over-the-counter antacid now and then.",
    "My sister had something similar last year.",
    "I would say a six, sometimes a seven.",
    "No travel, but my coworker has been sick.",
    "I have lost a bit of weight without trying.",
    "Yes, I wake up around three most nights.",
];

pub const DIAGNOSES: &[&str] = &[
    "Suspected stable angina, rule out acute coronary syndrome",
    "Post-viral reactive airway cough",
    "Migraine without aura",
    "Lumbar radiculopathy, likely L5",
    "Iron deficiency anemia under evaluation",
    "Uncomplicated lower urinary tract infection",
    "Orthostatic hypotension",
    "Gastroesophageal reflux disease",
    "Peripheral neuropathy of unclear etiology",
    "Contact dermatitis",
];

pub const TREATMENTS: &[&str] = &[
    "Order ECG and troponin; start low-dose aspirin pending results",
    "Inhaled corticosteroid for two weeks and reassess",
    "Trial of triptan at onset; keep a headache diary",
    "Physical therapy referral and short NSAID course",
    "Complete blood count and ferritin; oral iron supplement",
    "Nitrofurantoin for five days; increase fluid intake",
    "Increase salt and fluid intake; review antihypertensives",
    "Proton pump inhibitor before breakfast for eight weeks",
    "Check B12 and HbA1c; follow up in four weeks",
    "Topical corticosteroid cream twice daily",
];

pub const TRIAGE_NOTES: &[&str] = &[
    "Triage level 3: urgent, stable vital signs",
    "Triage level 4: semi-urgent, no red flags",
    "Triage level 2: emergent, escalate to attending",
    "Triage level 5: non-urgent, schedule routine visit",
    "Vital signs within normal limits, SpO2 98%",
    "Blood pressure 148/92, recheck in 15 minutes",
];

pub const EXPORT_FORMATS: &[&str] = &[
    "SOAP note exported to PDF",
    "Visit summary exported as FHIR bundle",
    "Referral letter exported to DOCX",
    "Prescription draft exported to PDF",
    "Patient instructions exported as plain text",
];

pub const TAGS: &[&str] = &[
    "cardiology",
    "respiratory",
    "neurology",
    "musculoskeletal",
    "follow-up",
    "lab-order",
    "medication",
    "urgent",
    "routine",
    "telehealth",
];

// Actors for machine-generated events
pub const ACTOR_LLM: &str = "system:llm";
pub const ACTOR_TRIAGE: &str = "system:triage";
pub const ACTOR_EXPORT: &str = "system:export";

/// All event kinds in enumeration order.
pub const EVENT_KINDS: &[EventKind] = &[
    EventKind::AsrTranscribed,
    EventKind::UserQuestionAsked,
    EventKind::LlmResponseGenerated,
    EventKind::TriageAssessed,
    EventKind::NoteExported,
];

/// Illustrative share (percent) of each event kind, used by the stats
/// approximation. Sums to 100.
pub const EVENT_KIND_WEIGHTS: &[(EventKind, u64)] = &[
    (EventKind::AsrTranscribed, 35),
    (EventKind::UserQuestionAsked, 20),
    (EventKind::LlmResponseGenerated, 25),
    (EventKind::TriageAssessed, 12),
    (EventKind::NoteExported, 8),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_weights_cover_all_kinds_and_sum_to_100() {
        let total: u64 = EVENT_KIND_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert_eq!(total, 100);
        let kinds: HashSet<_> = EVENT_KIND_WEIGHTS.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds.len(), EVENT_KINDS.len());
    }

    #[test]
    fn test_both_roles_available() {
        assert!(!speakers_with_role(SpeakerRole::Doctor).is_empty());
        assert!(!speakers_with_role(SpeakerRole::Patient).is_empty());
    }

    #[test]
    fn test_content_pools_are_disjoint() {
        let pools: [&[&str]; 8] = [
            SYMPTOMS,
            QUESTIONS,
            CLINICIAN_PROMPTS,
            RESPONSES,
            DIAGNOSES,
            TREATMENTS,
            TRIAGE_NOTES,
            EXPORT_FORMATS,
        ];
        let mut seen = HashSet::new();
        for pool in pools {
            assert!(!pool.is_empty());
            for entry in pool {
                assert!(seen.insert(*entry), "duplicate corpus entry: {entry}");
            }
        }
    }
}
