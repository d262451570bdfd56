//! Core domain types for fidemo
//!
//! These types mirror the response shapes of the live Timeline API so that
//! the demo adapter can stand in for it transparently. Field names serialize
//! as snake_case JSON, enum tags as the backend spells them.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Session** | One recorded consultation, summarized by [`SessionSummary`] |
//! | **Event** | A single timeline entry within a session (transcription, LLM reply, ...) |
//! | **Detail** | A summary plus its fully materialized events ([`SessionDetail`]) |
//! | **Manifest** | Fingerprint of a generated dataset ([`DemoManifest`]) |
//! | **Profile** | The event volume policy used when generating sessions ([`EventsProfile`]) |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================
// Events
// ============================================

/// Kind of a timeline event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Speech segment transcribed from the consultation audio
    AsrTranscribed,
    /// Question typed or dictated by the clinician
    UserQuestionAsked,
    /// Reply produced by the language model
    LlmResponseGenerated,
    /// Automated triage assessment
    TriageAssessed,
    /// Document exported from the session
    NoteExported,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AsrTranscribed => "ASR_TRANSCRIBED",
            EventKind::UserQuestionAsked => "USER_QUESTION_ASKED",
            EventKind::LlmResponseGenerated => "LLM_RESPONSE_GENERATED",
            EventKind::TriageAssessed => "TRIAGE_ASSESSED",
            EventKind::NoteExported => "NOTE_EXPORTED",
        }
    }

    /// Whether events of this kind are always produced by a machine.
    pub fn is_machine(&self) -> bool {
        matches!(
            self,
            EventKind::LlmResponseGenerated | EventKind::TriageAssessed | EventKind::NoteExported
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASR_TRANSCRIBED" => Ok(EventKind::AsrTranscribed),
            "USER_QUESTION_ASKED" => Ok(EventKind::UserQuestionAsked),
            "LLM_RESPONSE_GENERATED" => Ok(EventKind::LlmResponseGenerated),
            "TRIAGE_ASSESSED" => Ok(EventKind::TriageAssessed),
            "NOTE_EXPORTED" => Ok(EventKind::NoteExported),
            _ => Err(format!("unknown event kind: {}", s)),
        }
    }
}

/// Redaction policy applied to an event's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionPolicy {
    None,
    Pii,
    Phi,
    Full,
}

impl RedactionPolicy {
    pub const ALL: [RedactionPolicy; 4] = [
        RedactionPolicy::None,
        RedactionPolicy::Pii,
        RedactionPolicy::Phi,
        RedactionPolicy::Full,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RedactionPolicy::None => "none",
            RedactionPolicy::Pii => "pii",
            RedactionPolicy::Phi => "phi",
            RedactionPolicy::Full => "full",
        }
    }
}

/// How content came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Produced by a machine (ASR, LLM, exporter)
    Auto,
    /// Entered by a person
    Manual,
    /// Session containing both kinds of events
    Mixed,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Auto => "auto",
            GenerationMode::Manual => "manual",
            GenerationMode::Mixed => "mixed",
        }
    }

    /// Classify a session from its auto/manual event counts.
    pub fn classify(auto_events: u64, manual_events: u64) -> Self {
        match (auto_events, manual_events) {
            (_, 0) => GenerationMode::Auto,
            (0, _) => GenerationMode::Manual,
            _ => GenerationMode::Mixed,
        }
    }
}

/// A single entry on a session timeline. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Stable, sortable identifier (`<fragment>-evt-<index>`)
    pub id: String,
    /// Kind of event
    pub event_type: EventKind,
    /// When the event happened
    pub timestamp: DateTime<Utc>,
    /// Actor that produced the event
    pub who: String,
    /// Event content
    pub what: String,
    /// Optional human-readable summary
    pub summary: Option<String>,
    /// SHA-256 of `what`, hex encoded
    pub content_hash: String,
    /// Redaction policy tag
    pub redaction_policy: RedactionPolicy,
    /// Causality links to earlier events (always empty in demo data)
    pub causality: Vec<String>,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Whether a machine produced this event
    pub auto_generated: bool,
    /// Generation mode (matches `auto_generated`)
    pub generation_mode: GenerationMode,
    /// Confidence score in `[0.7, 1.0]`
    pub confidence: f64,
}

// ============================================
// Sessions
// ============================================

/// Identity and ownership of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub session_id: String,
    pub thread_id: Option<String>,
    pub owner_hash: String,
    /// Doctor first, patient second
    pub participants: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// When a session took place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timespan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_ms: i64,
}

/// Coarse size bucket of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
        }
    }

    /// Bucket by interaction count.
    pub fn from_interactions(count: u64) -> Self {
        if count <= 100 {
            SizeClass::Small
        } else if count <= 500 {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }
}

/// Volume metrics of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSize {
    /// Number of events in the session
    pub interaction_count: u64,
    pub total_tokens: u64,
    pub user_tokens: u64,
    pub assistant_tokens: u64,
    pub total_chars: u64,
    pub size_class: SizeClass,
    /// e.g. "42.7 KB"
    pub size_human: String,
}

/// Status shown on a policy badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl BadgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeStatus::Ok => "OK",
            BadgeStatus::NotApplicable => "N/A",
        }
    }
}

/// Governance badges. Synthetic in demo data; nothing is verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyBadges {
    pub hash_status: BadgeStatus,
    pub policy_status: BadgeStatus,
    pub redaction_status: BadgeStatus,
    pub audit_status: BadgeStatus,
}

/// List-view record of a session. Never mutated after generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub metadata: SessionMetadata,
    pub timespan: Timespan,
    pub size: SessionSize,
    pub policy_badges: PolicyBadges,
    pub preview: String,
}

impl SessionSummary {
    pub fn id(&self) -> &str {
        &self.metadata.session_id
    }
}

/// A session summary together with its materialized events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub events: Vec<Event>,
    pub generation_mode: GenerationMode,
    pub auto_events: u64,
    pub manual_events: u64,
    /// Event count per redaction policy (every policy present, zero allowed)
    pub redaction_stats: BTreeMap<RedactionPolicy, u64>,
}

// ============================================
// Dataset
// ============================================

/// Event volume policy for generated sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventsProfile {
    /// 30 to 80 events per session
    Small,
    /// 400 to 2000 events per session
    Large,
    /// Mostly small; session 0 and ~20% of the rest are large
    #[default]
    Mix,
}

impl EventsProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventsProfile::Small => "small",
            EventsProfile::Large => "large",
            EventsProfile::Mix => "mix",
        }
    }
}

impl std::fmt::Display for EventsProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventsProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(EventsProfile::Small),
            "large" => Ok(EventsProfile::Large),
            "mix" | "mixed" => Ok(EventsProfile::Mix),
            _ => Err(format!("unknown events profile: {}", s)),
        }
    }
}

/// Fingerprint of a generated dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoManifest {
    pub version: String,
    pub seed: String,
    pub sessions: usize,
    pub events_profile: EventsProfile,
    /// Reference instant the timestamps were back-dated from
    pub anchor: DateTime<Utc>,
    /// Rolling hash of all session ids, 8 hex characters
    pub ids_digest: String,
}

/// Generated summaries plus their manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoDataset {
    pub summaries: Vec<SessionSummary>,
    pub manifest: DemoManifest,
}

// ============================================
// Queries and aggregates
// ============================================

/// Sort policy for session listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Newest `created_at` first
    #[default]
    Recent,
    /// Oldest `created_at` first
    Oldest,
    /// Most events first
    EventsDesc,
    /// Fewest events first
    EventsAsc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Recent => "recent",
            SortOrder::Oldest => "oldest",
            SortOrder::EventsDesc => "events_desc",
            SortOrder::EventsAsc => "events_asc",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(SortOrder::Recent),
            "oldest" => Ok(SortOrder::Oldest),
            "events_desc" | "events-desc" => Ok(SortOrder::EventsDesc),
            "events_asc" | "events-asc" => Ok(SortOrder::EventsAsc),
            _ => Err(format!("unknown sort order: {}", s)),
        }
    }
}

/// Pagination and ordering for session listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryQuery {
    pub limit: usize,
    pub offset: usize,
    pub sort: SortOrder,
}

impl Default for SummaryQuery {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            sort: SortOrder::Recent,
        }
    }
}

/// Approximate auto/manual event split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSplit {
    pub auto: u64,
    pub manual: u64,
}

/// Earliest session start and latest session end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}

/// Aggregate statistics over the whole timeline.
///
/// In demo mode `event_types` and `generation_modes` are illustrative splits
/// of the exact event total, not counts over materialized events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineStats {
    pub total_sessions: u64,
    pub total_events: u64,
    pub total_tokens: u64,
    pub avg_events_per_session: f64,
    pub event_types: BTreeMap<EventKind, u64>,
    pub generation_modes: ModeSplit,
    /// Exact earliest start and latest end across all summaries; `None` when
    /// there are no sessions.
    pub date_range: Option<DateRange>,
}
