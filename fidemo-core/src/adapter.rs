//! Demo Timeline API adapter
//!
//! [`DemoAdapter`] serves the Timeline API read surface from a generated,
//! seed-keyed dataset. It owns the cached summaries and manifest, persists
//! them through a [`KeyValueStore`], and simulates a remote service by
//! sleeping for a random latency and failing a configurable share of reads.
//!
//! ## Lifecycle
//!
//! ```text
//! new() ──> uninitialized ──initialize()──> loading ──┬─ cache hit (same seed) ──┐
//!                                                     └─ miss / seed mismatch ───┴─> ready
//! ```
//!
//! One seed always maps to one dataset: on startup a cached dataset is reused
//! only when its manifest seed equals the configured seed and the cached
//! summaries reproduce the manifest's id digest. `update_config` and
//! `clear_cache` always regenerate.
//!
//! ## Concurrency
//!
//! Reads suspend at exactly one point, the latency sleep. The dataset is held
//! behind an `Arc` that regeneration replaces and never mutates, and every
//! read looks it up after the sleep, so a read always serves the dataset that
//! is current when it resumes. No lock is held across an await.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard};
use std::time::Duration;

use crate::config::{DemoConfig, DemoConfigPatch};
use crate::corpus::EVENT_KIND_WEIGHTS;
use crate::error::{Error, Result};
use crate::generator::{detail_seed, generate_demo_dataset, generate_session_detail, ids_digest};
use crate::prng::SeededRng;
use crate::storage::{KeyValueStore, StorageKeys};
use crate::types::*;

/// Status codes used for injected failures
const SIMULATED_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Approximate share of auto-generated events, in percent
const AUTO_EVENT_PCT: u64 = 65;

fn adapter_seed(seed: &str) -> String {
    format!("{}:adapter", seed)
}

struct AdapterState {
    config: DemoConfig,
    dataset: Option<Arc<DemoDataset>>,
}

/// Drop-in stand-in for the live Timeline API.
pub struct DemoAdapter<S: KeyValueStore> {
    store: S,
    keys: StorageKeys,
    state: RwLock<AdapterState>,
    /// Latency and error-injection draws; separate from generation streams
    rng: Mutex<SeededRng>,
}

impl<S: KeyValueStore> DemoAdapter<S> {
    /// Create an uninitialized adapter. Reads fail with
    /// [`Error::NotLoaded`] until [`DemoAdapter::initialize`] runs.
    pub fn new(config: DemoConfig, store: S) -> Self {
        let config = config.normalized();
        let rng = SeededRng::new(adapter_seed(&config.seed));
        Self {
            store,
            keys: StorageKeys::default(),
            state: RwLock::new(AdapterState {
                config,
                dataset: None,
            }),
            rng: Mutex::new(rng),
        }
    }

    /// Use a different pair of storage keys.
    pub fn with_keys(mut self, keys: StorageKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Create and initialize an adapter.
    pub fn open(config: DemoConfig, store: S) -> Result<Self> {
        let adapter = Self::new(config, store);
        adapter.initialize()?;
        Ok(adapter)
    }

    /// Create and initialize an adapter configured from the environment.
    pub fn from_env(store: S) -> Result<Self> {
        Self::open(DemoConfig::from_env(), store)
    }

    /// Load the cached dataset if its seed matches, otherwise generate and
    /// cache a new one.
    pub fn initialize(&self) -> Result<()> {
        let config = self.read_state().config.clone();

        let dataset = match self.load_cached(&config.seed) {
            Some(dataset) => {
                tracing::info!(
                    seed = %config.seed,
                    sessions = dataset.summaries.len(),
                    ids_digest = %dataset.manifest.ids_digest,
                    "Loaded demo dataset from cache"
                );
                Arc::new(dataset)
            }
            None => self.regenerate(&config)?,
        };

        self.install_initial(&config, dataset);
        Ok(())
    }

    /// Install the dataset produced by `initialize` unless the config changed
    /// while it was being loaded. Returns whether it was installed.
    fn install_initial(&self, loaded_for: &DemoConfig, dataset: Arc<DemoDataset>) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if state.config != *loaded_for {
            tracing::debug!(
                seed = %state.config.seed,
                "Configuration changed during initialize, keeping newer dataset"
            );
            return false;
        }
        state.dataset = Some(dataset);
        true
    }

    /// Whether a dataset is loaded.
    pub fn is_ready(&self) -> bool {
        self.read_state().dataset.is_some()
    }

    /// List sessions, sorted by `query.sort`, sliced to
    /// `[offset, offset + limit)`.
    pub async fn get_session_summaries(&self, query: SummaryQuery) -> Result<Vec<SessionSummary>> {
        self.simulate_request("list_sessions").await?;
        let dataset = self.dataset()?;

        let mut ordered: Vec<&SessionSummary> = dataset.summaries.iter().collect();
        sort_summaries(&mut ordered, query.sort);

        Ok(ordered
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    /// Materialize one session's events.
    ///
    /// Details are never cached: every call re-derives the events from
    /// `"<seed>:detail:<session_id>"`, which yields identical output for the
    /// same seed and id.
    pub async fn get_session_detail(&self, session_id: &str) -> Result<SessionDetail> {
        self.simulate_request("get_session_detail").await?;
        let (seed, dataset) = {
            let state = self.read_state();
            let dataset = state.dataset.clone().ok_or(Error::NotLoaded)?;
            (state.config.seed.clone(), dataset)
        };

        let summary = dataset
            .summaries
            .iter()
            .find(|s| s.id() == session_id)
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))?;

        let mut rng = SeededRng::new(detail_seed(&seed, session_id));
        let detail = generate_session_detail(&mut rng, summary)?;

        tracing::debug!(
            session_id,
            events = detail.events.len(),
            "Generated session detail"
        );
        Ok(detail)
    }

    /// Aggregate statistics over the cached summaries.
    ///
    /// Totals are exact; the event-type and generation-mode breakdowns are
    /// fixed-percentage approximations of the event total.
    pub async fn get_timeline_stats(&self) -> Result<TimelineStats> {
        self.simulate_request("get_timeline_stats").await?;
        let dataset = self.dataset()?;
        Ok(approximate_stats(&dataset.summaries))
    }

    /// Manifest of the current dataset.
    pub fn get_manifest(&self) -> Result<DemoManifest> {
        Ok(self.dataset()?.manifest.clone())
    }

    /// Current configuration.
    pub fn get_config(&self) -> DemoConfig {
        self.read_state().config.clone()
    }

    /// Merge `patch` into the configuration, re-seed the injection stream and
    /// regenerate the dataset, even when the seed is unchanged.
    pub fn update_config(&self, patch: &DemoConfigPatch) -> Result<()> {
        let mut config = self.get_config();
        config.apply(patch);

        tracing::info!(
            seed = %config.seed,
            sessions = config.sessions,
            profile = %config.events_profile,
            "Demo configuration updated"
        );

        let dataset = self.regenerate(&config)?;
        *self.lock_rng() = SeededRng::new(adapter_seed(&config.seed));
        self.write_state(config, dataset);
        Ok(())
    }

    /// Remove both cache keys and regenerate immediately.
    pub fn clear_cache(&self) -> Result<()> {
        for key in [&self.keys.manifest, &self.keys.summaries] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key = %key, error = %e, "Failed to remove cache key");
            }
        }
        tracing::info!("Demo cache cleared");

        let config = self.get_config();
        let dataset = self.regenerate(&config)?;
        self.write_state(config, dataset);
        Ok(())
    }

    /// Sleep for a drawn latency, then fail with the configured probability.
    async fn simulate_request(&self, operation: &'static str) -> Result<()> {
        let latency = self.read_state().config.latency_ms;
        let delay_ms = self.lock_rng().int(latency.min as i64, latency.max as i64) as u64;

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        let error_rate_pct = self.read_state().config.error_rate_pct;
        let failure = {
            let mut rng = self.lock_rng();
            if rng.next_f64() * 100.0 < f64::from(error_rate_pct) {
                Some(*rng.pick(&SIMULATED_STATUSES)?)
            } else {
                None
            }
        };

        match failure {
            Some(status) => {
                tracing::warn!(operation, status, delay_ms, "Injected simulated failure");
                Err(Error::SimulatedFailure(format!(
                    "{} returned HTTP {} after {}ms",
                    operation, status, delay_ms
                )))
            }
            None => Ok(()),
        }
    }

    fn regenerate(&self, config: &DemoConfig) -> Result<Arc<DemoDataset>> {
        let dataset = generate_demo_dataset(config)?;
        self.persist(&dataset);
        Ok(Arc::new(dataset))
    }

    /// Read the cached dataset; `None` on miss, seed mismatch or corruption.
    ///
    /// The summaries must reproduce the manifest's `ids_digest`, so summaries
    /// left over from another seed are never paired with this manifest.
    fn load_cached(&self, seed: &str) -> Option<DemoDataset> {
        let manifest: DemoManifest = self.read_json(&self.keys.manifest)?;
        if manifest.seed != seed {
            tracing::info!(
                cached_seed = %manifest.seed,
                seed,
                "Cached demo dataset has a different seed, regenerating"
            );
            return None;
        }

        let summaries: Vec<SessionSummary> = self.read_json(&self.keys.summaries)?;
        if summaries.len() != manifest.sessions {
            tracing::warn!(
                expected = manifest.sessions,
                found = summaries.len(),
                "Cached summaries do not match manifest, regenerating"
            );
            return None;
        }

        let ids: Vec<&str> = summaries.iter().map(SessionSummary::id).collect();
        let digest = ids_digest(&ids);
        if digest != manifest.ids_digest {
            tracing::warn!(
                expected = %manifest.ids_digest,
                found = %digest,
                "Cached summaries do not match manifest digest, regenerating"
            );
            return None;
        }

        Some(DemoDataset {
            summaries,
            manifest,
        })
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "No cached entry");
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read cache");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable cache entry");
                None
            }
        }
    }

    /// Drop the manifest, write summaries, then write the manifest. A write
    /// that stops part way leaves no manifest, which reads as a cache miss.
    /// Failures are logged; the in-memory dataset is served regardless.
    fn persist(&self, dataset: &DemoDataset) {
        if let Err(e) = self.store.remove(&self.keys.manifest) {
            tracing::warn!(key = %self.keys.manifest, error = %e, "Failed to invalidate cached manifest");
            return;
        }

        let writes = [
            (&self.keys.summaries, serde_json::to_string(&dataset.summaries)),
            (&self.keys.manifest, serde_json::to_string(&dataset.manifest)),
        ];

        for (key, payload) in writes {
            let result = payload
                .map_err(Error::from)
                .and_then(|json| self.store.set(key, &json));
            if let Err(e) = result {
                tracing::warn!(key = %key, error = %e, "Failed to persist demo dataset");
                return;
            }
        }
    }

    fn dataset(&self) -> Result<Arc<DemoDataset>> {
        self.read_state().dataset.clone().ok_or(Error::NotLoaded)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, AdapterState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self, config: DemoConfig, dataset: Arc<DemoDataset>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.config = config;
        state.dataset = Some(dataset);
    }

    fn lock_rng(&self) -> MutexGuard<'_, SeededRng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Total orders over summaries; ties fall back to session id.
fn sort_summaries(summaries: &mut [&SessionSummary], order: SortOrder) {
    match order {
        SortOrder::Recent => summaries.sort_by(|a, b| {
            b.metadata
                .created_at
                .cmp(&a.metadata.created_at)
                .then_with(|| a.id().cmp(b.id()))
        }),
        SortOrder::Oldest => summaries.sort_by(|a, b| {
            a.metadata
                .created_at
                .cmp(&b.metadata.created_at)
                .then_with(|| a.id().cmp(b.id()))
        }),
        SortOrder::EventsDesc => summaries.sort_by(|a, b| {
            b.size
                .interaction_count
                .cmp(&a.size.interaction_count)
                .then_with(|| a.id().cmp(b.id()))
        }),
        SortOrder::EventsAsc => summaries.sort_by(|a, b| {
            a.size
                .interaction_count
                .cmp(&b.size.interaction_count)
                .then_with(|| a.id().cmp(b.id()))
        }),
    }
}

/// Exact totals plus illustrative breakdowns; no events are materialized.
fn approximate_stats(summaries: &[SessionSummary]) -> TimelineStats {
    let total_sessions = summaries.len() as u64;
    let total_events: u64 = summaries.iter().map(|s| s.size.interaction_count).sum();
    let total_tokens: u64 = summaries.iter().map(|s| s.size.total_tokens).sum();

    let mut event_types: std::collections::BTreeMap<EventKind, u64> = EVENT_KIND_WEIGHTS
        .iter()
        .map(|(kind, pct)| (*kind, total_events * pct / 100))
        .collect();
    // Rounding remainder goes to the most common kind so the split sums up.
    let assigned: u64 = event_types.values().sum();
    if let Some((kind, _)) = EVENT_KIND_WEIGHTS.iter().max_by_key(|(_, pct)| *pct) {
        *event_types.entry(*kind).or_default() += total_events - assigned;
    }

    let auto = total_events * AUTO_EVENT_PCT / 100;

    let date_range = summaries
        .iter()
        .map(|s| s.timespan.start)
        .min()
        .zip(summaries.iter().map(|s| s.timespan.end).max())
        .map(|(earliest, latest)| DateRange { earliest, latest });

    TimelineStats {
        total_sessions,
        total_events,
        total_tokens,
        avg_events_per_session: if total_sessions == 0 {
            0.0
        } else {
            total_events as f64 / total_sessions as f64
        },
        event_types,
        generation_modes: ModeSplit {
            auto,
            manual: total_events - auto,
        },
        date_range,
    }
}
