//! Deterministic demo dataset generation
//!
//! Pure functions over a [`SeededRng`]. Nothing here caches or shares state;
//! the only mutation is the draw counter inside the generator passed in.
//!
//! ## Streams
//!
//! - Session ids and owner hashes come from a per-index child stream
//!   (`"<seed>:session:<index>"`), so a session's identity does not depend on
//!   how many draws happened before it.
//! - Everything else in a summary comes from the shared dataset stream, which
//!   is why [`generate_demo_dataset`] must iterate sessions in order.
//! - Session details are expanded from `"<seed>:detail:<session_id>"` by the
//!   caller, so one session can be regenerated without replaying the rest.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::config::DemoConfig;
use crate::corpus::{self, SpeakerRole};
use crate::error::Result;
use crate::format::{format_bytes, truncate};
use crate::prng::{rolling_hash, SeededRng};
use crate::types::*;

/// Manifest schema version
pub const MANIFEST_VERSION: &str = "1.0.0";

/// Inclusive event count range of a small session
pub const SMALL_EVENTS: (i64, i64) = (30, 80);

/// Inclusive event count range of a large session
pub const LARGE_EVENTS: (i64, i64) = (400, 2000);

/// Probability that a non-first session is large under the mix profile
const MIX_LARGE_PROBABILITY: f64 = 0.2;

/// Probability that a generated session carries a thread id
const THREAD_PROBABILITY: f64 = 0.7;

/// Probability that the redaction badge reads "N/A"
const REDACTION_NA_PROBABILITY: f64 = 0.25;

/// Probability that a human-kind event is marked auto-generated
const HUMAN_AUTO_PROBABILITY: f64 = 0.3;

/// Share of tokens attributed to the user side, in percent
const USER_TOKEN_PCT: u64 = 45;

/// Characters per token used for size estimates
const CHARS_PER_TOKEN: u64 = 4;

const PREVIEW_PART_CHARS: usize = 48;

/// Seed of the child stream used for a session's detail.
pub fn detail_seed(seed: &str, session_id: &str) -> String {
    format!("{}:detail:{}", seed, session_id)
}

/// Draw the event count of session `index` under `profile`.
///
/// Under [`EventsProfile::Mix`], session 0 is always large so every dataset
/// contains at least one large session.
pub fn event_count(rng: &mut SeededRng, profile: EventsProfile, index: usize) -> u64 {
    let large = match profile {
        EventsProfile::Small => false,
        EventsProfile::Large => true,
        EventsProfile::Mix => index == 0 || rng.chance(MIX_LARGE_PROBABILITY),
    };
    let (min, max) = if large { LARGE_EVENTS } else { SMALL_EVENTS };
    rng.int(min, max) as u64
}

/// Generate the summary of session `index`, back-dated from `anchor`.
pub fn generate_session_summary(
    rng: &mut SeededRng,
    config: &DemoConfig,
    index: usize,
    anchor: DateTime<Utc>,
) -> Result<SessionSummary> {
    let mut identity = rng.child(&format!("session:{}", index));
    let session_id = identity.uuid("session");
    let owner_hash = identity.hex(16);

    let thread_id = if rng.chance(THREAD_PROBABILITY) {
        Some(rng.uuid("thread"))
    } else {
        None
    };

    let interaction_count = event_count(rng, config.events_profile, index);

    let days_back = index as i64 * rng.int(1, 7);
    let start = anchor - Duration::days(days_back);
    let duration = Duration::seconds(rng.int(5 * 60, 2 * 60 * 60));
    let end = start + duration;

    // Token totals derive from the count so the numbers stay consistent.
    let avg_tokens = rng.int(40, 180) as u64;
    let total_tokens = interaction_count * avg_tokens;
    let user_tokens = total_tokens * USER_TOKEN_PCT / 100;
    let total_chars = total_tokens * CHARS_PER_TOKEN;

    let doctor = *rng.pick(&corpus::speakers_with_role(SpeakerRole::Doctor))?;
    let patient = *rng.pick(&corpus::speakers_with_role(SpeakerRole::Patient))?;

    let symptom = rng.pick(corpus::SYMPTOMS)?;
    let diagnosis = rng.pick(corpus::DIAGNOSES)?;
    let preview = format!(
        "{} / {}",
        truncate(symptom, PREVIEW_PART_CHARS),
        truncate(diagnosis, PREVIEW_PART_CHARS)
    );

    let redaction_status = if rng.chance(REDACTION_NA_PROBABILITY) {
        BadgeStatus::NotApplicable
    } else {
        BadgeStatus::Ok
    };

    Ok(SessionSummary {
        metadata: SessionMetadata {
            session_id,
            thread_id,
            owner_hash,
            participants: vec![doctor.to_string(), patient.to_string()],
            created_at: start,
            updated_at: end,
        },
        timespan: Timespan {
            start,
            end,
            duration_ms: duration.num_milliseconds(),
        },
        size: SessionSize {
            interaction_count,
            total_tokens,
            user_tokens,
            assistant_tokens: total_tokens - user_tokens,
            total_chars,
            size_class: SizeClass::from_interactions(interaction_count),
            size_human: format_bytes(total_chars),
        },
        policy_badges: PolicyBadges {
            hash_status: BadgeStatus::Ok,
            policy_status: BadgeStatus::Ok,
            redaction_status,
            audit_status: BadgeStatus::Ok,
        },
        preview,
    })
}

/// Stable, sortable event id: `<first 8 id chars>-evt-<index:05>`.
pub fn event_id(session_id: &str, event_index: u64) -> String {
    let fragment: String = session_id
        .strip_prefix("session-")
        .unwrap_or(session_id)
        .chars()
        .take(8)
        .collect();
    format!("{}-evt-{:05}", fragment, event_index)
}

/// Generate one event occurring 10 to 300 seconds after `base`.
pub fn generate_event(
    rng: &mut SeededRng,
    session_id: &str,
    event_index: u64,
    base: DateTime<Utc>,
) -> Result<Event> {
    let timestamp = base + Duration::seconds(rng.int(10, 300));
    let kind = *rng.pick(corpus::EVENT_KINDS)?;

    let (who, what, summary) = match kind {
        EventKind::AsrTranscribed => {
            let speaker = rng.pick(corpus::SPEAKERS)?;
            let pool = match speaker.role {
                SpeakerRole::Doctor => corpus::QUESTIONS,
                SpeakerRole::Patient => {
                    if rng.chance(0.5) {
                        corpus::SYMPTOMS
                    } else {
                        corpus::RESPONSES
                    }
                }
            };
            let text = rng.pick(pool)?;
            (speaker.name.to_string(), text.to_string(), None)
        }
        EventKind::UserQuestionAsked => {
            let doctor = *rng.pick(&corpus::speakers_with_role(SpeakerRole::Doctor))?;
            let prompt = rng.pick(corpus::CLINICIAN_PROMPTS)?;
            (doctor.to_string(), prompt.to_string(), None)
        }
        EventKind::LlmResponseGenerated => {
            let diagnosis = rng.pick(corpus::DIAGNOSES)?;
            let treatment = rng.pick(corpus::TREATMENTS)?;
            (
                corpus::ACTOR_LLM.to_string(),
                format!("{}. Plan: {}", diagnosis, treatment),
                Some(truncate(diagnosis, 60)),
            )
        }
        EventKind::TriageAssessed => {
            let note = rng.pick(corpus::TRIAGE_NOTES)?;
            (corpus::ACTOR_TRIAGE.to_string(), note.to_string(), None)
        }
        EventKind::NoteExported => {
            let export = rng.pick(corpus::EXPORT_FORMATS)?;
            (
                corpus::ACTOR_EXPORT.to_string(),
                export.to_string(),
                Some(format!("Export #{}", event_index + 1)),
            )
        }
    };

    let auto_generated = kind.is_machine() || rng.chance(HUMAN_AUTO_PROBABILITY);
    let redaction_policy = *rng.pick(&RedactionPolicy::ALL)?;
    let tag_count = rng.int(1, 2) as usize;
    let tags = rng
        .shuffle(corpus::TAGS)
        .into_iter()
        .take(tag_count)
        .map(str::to_string)
        .collect();
    let confidence = 0.7 + rng.next_f64() * 0.3;

    let content_hash = hex::encode(Sha256::digest(what.as_bytes()));

    Ok(Event {
        id: event_id(session_id, event_index),
        event_type: kind,
        timestamp,
        who,
        what,
        summary,
        content_hash,
        redaction_policy,
        causality: Vec::new(),
        tags,
        auto_generated,
        generation_mode: if auto_generated {
            GenerationMode::Auto
        } else {
            GenerationMode::Manual
        },
        confidence,
    })
}

/// Expand a summary into `interaction_count` events starting at the
/// session's start. Computed fresh on every call.
pub fn generate_session_detail(
    rng: &mut SeededRng,
    summary: &SessionSummary,
) -> Result<SessionDetail> {
    let count = summary.size.interaction_count;
    let session_id = summary.id();

    let mut events = Vec::with_capacity(count as usize);
    let mut cursor = summary.timespan.start;
    for index in 0..count {
        let event = generate_event(rng, session_id, index, cursor)?;
        cursor = event.timestamp;
        events.push(event);
    }

    let auto_events = events.iter().filter(|e| e.auto_generated).count() as u64;
    let manual_events = count - auto_events;

    let mut redaction_stats: BTreeMap<RedactionPolicy, u64> =
        RedactionPolicy::ALL.iter().map(|p| (*p, 0)).collect();
    for event in &events {
        *redaction_stats.entry(event.redaction_policy).or_default() += 1;
    }

    Ok(SessionDetail {
        summary: summary.clone(),
        events,
        generation_mode: GenerationMode::classify(auto_events, manual_events),
        auto_events,
        manual_events,
        redaction_stats,
    })
}

/// Fingerprint of the generated id set: rolling hash over the concatenated
/// ids as 8 lowercase hex characters. Change detection only.
pub fn ids_digest<S: AsRef<str>>(session_ids: &[S]) -> String {
    let joined: String = session_ids.iter().map(AsRef::as_ref).collect();
    format!("{:08x}", rolling_hash(&joined))
}

/// Build the manifest describing a dataset.
pub fn generate_manifest<S: AsRef<str>>(
    config: &DemoConfig,
    anchor: DateTime<Utc>,
    session_ids: &[S],
) -> DemoManifest {
    DemoManifest {
        version: MANIFEST_VERSION.to_string(),
        seed: config.seed.clone(),
        sessions: session_ids.len(),
        events_profile: config.events_profile,
        anchor,
        ids_digest: ids_digest(session_ids),
    }
}

/// Generate `config.sessions` summaries from one shared stream, in order,
/// and their manifest.
pub fn generate_demo_dataset(config: &DemoConfig) -> Result<DemoDataset> {
    let anchor = config.resolved_anchor();
    let mut rng = SeededRng::new(config.seed.clone());

    let mut summaries = Vec::with_capacity(config.sessions);
    for index in 0..config.sessions {
        summaries.push(generate_session_summary(&mut rng, config, index, anchor)?);
    }

    let ids: Vec<&str> = summaries.iter().map(SessionSummary::id).collect();
    let manifest = generate_manifest(config, anchor, &ids);

    tracing::info!(
        seed = %config.seed,
        sessions = summaries.len(),
        profile = %config.events_profile,
        ids_digest = %manifest.ids_digest,
        "Generated demo dataset"
    );

    Ok(DemoDataset {
        summaries,
        manifest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_anchor() -> DateTime<Utc> {
        "2025-06-01T00:00:00Z".parse().unwrap()
    }

    fn config(seed: &str, sessions: usize, profile: EventsProfile) -> DemoConfig {
        DemoConfig {
            seed: seed.to_string(),
            sessions,
            events_profile: profile,
            anchor: Some(fixed_anchor()),
            ..Default::default()
        }
    }

    fn in_range(value: u64, (min, max): (i64, i64)) -> bool {
        (min as u64..=max as u64).contains(&value)
    }

    #[test]
    fn test_dataset_is_deterministic() {
        let cfg = config("fi-2025", 24, EventsProfile::Mix);
        let a = generate_demo_dataset(&cfg).unwrap();
        let b = generate_demo_dataset(&cfg).unwrap();

        assert_eq!(
            serde_json::to_string(&a.summaries).unwrap(),
            serde_json::to_string(&b.summaries).unwrap()
        );
        assert_eq!(a.manifest, b.manifest);
    }

    #[test]
    fn test_different_seeds_produce_different_datasets() {
        let a = generate_demo_dataset(&config("A", 8, EventsProfile::Mix)).unwrap();
        let b = generate_demo_dataset(&config("B", 8, EventsProfile::Mix)).unwrap();
        assert_ne!(a.manifest.ids_digest, b.manifest.ids_digest);
        assert_ne!(a.summaries[0].id(), b.summaries[0].id());
    }

    #[test]
    fn test_mix_profile_forces_first_session_large() {
        for seed in ["fi-2025", "a", "b", "clinic", "zzz", "42"] {
            let dataset = generate_demo_dataset(&config(seed, 1, EventsProfile::Mix)).unwrap();
            let count = dataset.summaries[0].size.interaction_count;
            assert!(in_range(count, LARGE_EVENTS), "{seed}: {count}");
        }
    }

    #[test]
    fn test_profiles_bound_event_counts() {
        let small = generate_demo_dataset(&config("s", 20, EventsProfile::Small)).unwrap();
        assert!(small
            .summaries
            .iter()
            .all(|s| in_range(s.size.interaction_count, SMALL_EVENTS)));

        let large = generate_demo_dataset(&config("l", 20, EventsProfile::Large)).unwrap();
        assert!(large
            .summaries
            .iter()
            .all(|s| in_range(s.size.interaction_count, LARGE_EVENTS)));

        let mix = generate_demo_dataset(&config("m", 40, EventsProfile::Mix)).unwrap();
        assert!(mix.summaries.iter().all(|s| {
            in_range(s.size.interaction_count, SMALL_EVENTS)
                || in_range(s.size.interaction_count, LARGE_EVENTS)
        }));
    }

    #[test]
    fn test_session_ids_do_not_depend_on_shared_stream() {
        let cfg = config("isolation", 5, EventsProfile::Small);
        let anchor = fixed_anchor();

        let mut fresh = SeededRng::new("isolation");
        let direct = generate_session_summary(&mut fresh, &cfg, 3, anchor).unwrap();

        let mut used = SeededRng::new("isolation");
        for _ in 0..97 {
            used.next_f64();
        }
        let after_draws = generate_session_summary(&mut used, &cfg, 3, anchor).unwrap();

        assert_eq!(direct.id(), after_draws.id());
        assert_eq!(direct.metadata.owner_hash, after_draws.metadata.owner_hash);
    }

    #[test]
    fn test_summary_metrics_are_consistent() {
        let dataset = generate_demo_dataset(&config("metrics", 12, EventsProfile::Mix)).unwrap();
        let anchor = fixed_anchor();

        for (index, s) in dataset.summaries.iter().enumerate() {
            assert_eq!(s.size.user_tokens + s.size.assistant_tokens, s.size.total_tokens);
            assert_eq!(s.size.total_tokens % s.size.interaction_count, 0);
            assert_eq!(s.size.total_chars, s.size.total_tokens * CHARS_PER_TOKEN);

            let minutes = s.timespan.duration_ms / 60_000;
            assert!((5..=120).contains(&minutes));
            assert_eq!(s.timespan.end - s.timespan.start, Duration::milliseconds(s.timespan.duration_ms));

            let days_back = (anchor - s.timespan.start).num_days();
            assert!(days_back >= index as i64 && days_back <= 7 * index as i64);

            assert_eq!(s.metadata.participants.len(), 2);
            assert!(s.metadata.participants[0].starts_with("Dr"));
            assert!(s.metadata.participants[1].starts_with("Paciente"));
            assert_eq!(s.policy_badges.hash_status, BadgeStatus::Ok);
            assert!(s.preview.contains(" / "));
        }
    }

    #[test]
    fn test_detail_is_reproducible_from_child_seed() {
        let dataset = generate_demo_dataset(&config("detail", 3, EventsProfile::Small)).unwrap();
        let summary = &dataset.summaries[1];
        let seed = detail_seed("detail", summary.id());

        let a = generate_session_detail(&mut SeededRng::new(seed.clone()), summary).unwrap();
        let b = generate_session_detail(&mut SeededRng::new(seed), summary).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.events.len() as u64, summary.size.interaction_count);
    }

    #[test]
    fn test_detail_events_are_well_formed() {
        let dataset = generate_demo_dataset(&config("events", 1, EventsProfile::Mix)).unwrap();
        let summary = &dataset.summaries[0];
        let mut rng = SeededRng::new(detail_seed("events", summary.id()));
        let detail = generate_session_detail(&mut rng, summary).unwrap();

        let mut previous = summary.timespan.start;
        for (index, event) in detail.events.iter().enumerate() {
            let gap = (event.timestamp - previous).num_seconds();
            assert!((10..=300).contains(&gap), "gap {gap}");
            previous = event.timestamp;

            assert!(event.id.ends_with(&format!("-evt-{:05}", index)));
            assert!((0.7..=1.0).contains(&event.confidence));
            assert!(event.causality.is_empty());
            assert!((1..=2).contains(&event.tags.len()));
            assert_eq!(
                event.content_hash,
                hex::encode(Sha256::digest(event.what.as_bytes()))
            );
            if event.event_type.is_machine() {
                assert!(event.auto_generated);
            }
            assert_eq!(
                event.generation_mode == GenerationMode::Auto,
                event.auto_generated
            );
        }

        let histogram_total: u64 = detail.redaction_stats.values().sum();
        assert_eq!(histogram_total, summary.size.interaction_count);
        assert_eq!(detail.redaction_stats.len(), RedactionPolicy::ALL.len());
        assert_eq!(
            detail.auto_events + detail.manual_events,
            summary.size.interaction_count
        );
        assert_eq!(detail.generation_mode, GenerationMode::Mixed);
    }

    #[test]
    fn test_event_content_comes_from_kind_pools() {
        let mut rng = SeededRng::new("pools");
        let base = fixed_anchor();
        for index in 0..500 {
            let event = generate_event(&mut rng, "session-abc", index, base).unwrap();
            let what = event.what.as_str();
            match event.event_type {
                EventKind::AsrTranscribed => assert!(
                    corpus::SYMPTOMS.contains(&what)
                        || corpus::QUESTIONS.contains(&what)
                        || corpus::RESPONSES.contains(&what)
                ),
                EventKind::UserQuestionAsked => {
                    assert!(corpus::CLINICIAN_PROMPTS.contains(&what))
                }
                EventKind::LlmResponseGenerated => assert!(what.contains(". Plan: ")),
                EventKind::TriageAssessed => assert!(corpus::TRIAGE_NOTES.contains(&what)),
                EventKind::NoteExported => assert!(corpus::EXPORT_FORMATS.contains(&what)),
            }
        }
    }

    #[test]
    fn test_event_id_format() {
        assert_eq!(event_id("session-1a2b3c4d-ffff", 7), "1a2b3c4d-evt-00007");
        assert_eq!(event_id("abc", 12345), "abc-evt-12345");
    }

    #[test]
    fn test_manifest_digest() {
        let cfg = config("manifest", 0, EventsProfile::Mix);
        let empty = generate_manifest(&cfg, fixed_anchor(), &[] as &[&str]);
        assert_eq!(empty.ids_digest, "00000000");
        assert_eq!(empty.sessions, 0);
        assert_eq!(empty.version, MANIFEST_VERSION);

        assert_eq!(ids_digest(&["a"]), "00000061");
        assert_ne!(ids_digest(&["ab", "c"]), ids_digest(&["ba", "c"]));
        assert_eq!(ids_digest(&["ab", "c"]), ids_digest(&["a", "bc"]));
    }
}
