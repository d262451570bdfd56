//! The Timeline API read surface
//!
//! [`TimelineApi`] is the seam front ends program against. Two
//! implementations exist: [`DemoAdapter`] serves a generated dataset and
//! [`HttpTimelineClient`] talks to a live backend. [`connect`] picks one from
//! configuration, so switching to demo mode is a config change.

mod http;

pub use http::HttpTimelineClient;

use async_trait::async_trait;

use crate::adapter::DemoAdapter;
use crate::config::Config;
use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::types::{SessionDetail, SessionSummary, SummaryQuery, TimelineStats};

/// Read operations of the Timeline API.
#[async_trait]
pub trait TimelineApi: Send + Sync {
    /// Sorted, paginated session listing.
    async fn get_session_summaries(&self, query: SummaryQuery) -> Result<Vec<SessionSummary>>;

    /// One session with its events.
    async fn get_session_detail(&self, session_id: &str) -> Result<SessionDetail>;

    /// Aggregate statistics across all sessions.
    async fn get_timeline_stats(&self) -> Result<TimelineStats>;

    /// Short label for logs and diagnostics.
    fn source(&self) -> &'static str;
}

#[async_trait]
impl<S: KeyValueStore + 'static> TimelineApi for DemoAdapter<S> {
    async fn get_session_summaries(&self, query: SummaryQuery) -> Result<Vec<SessionSummary>> {
        DemoAdapter::get_session_summaries(self, query).await
    }

    async fn get_session_detail(&self, session_id: &str) -> Result<SessionDetail> {
        DemoAdapter::get_session_detail(self, session_id).await
    }

    async fn get_timeline_stats(&self) -> Result<TimelineStats> {
        DemoAdapter::get_timeline_stats(self).await
    }

    fn source(&self) -> &'static str {
        "demo"
    }
}

/// Build the Timeline API implementation selected by `config`.
///
/// With `demo.enabled` the returned adapter is already initialized against
/// `store`; otherwise `store` is unused and `backend.url` must be valid.
pub fn connect<S>(config: &Config, store: S) -> Result<Box<dyn TimelineApi>>
where
    S: KeyValueStore + 'static,
{
    if config.demo.enabled {
        tracing::info!(seed = %config.demo.seed, "Using demo Timeline API");
        let adapter = DemoAdapter::open(config.demo.clone(), store)?;
        Ok(Box::new(adapter))
    } else {
        let client = HttpTimelineClient::new(&config.backend)?;
        tracing::info!(url = %client.base_url(), "Using live Timeline API");
        Ok(Box::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LatencyRange;
    use crate::storage::MemoryStore;

    fn demo_config() -> Config {
        let mut config = Config::default();
        config.demo.enabled = true;
        config.demo.sessions = 4;
        config.demo.latency_ms = LatencyRange::fixed(0);
        config
    }

    #[tokio::test]
    async fn test_connect_demo_serves_reads() {
        let api = connect(&demo_config(), MemoryStore::new()).unwrap();
        assert_eq!(api.source(), "demo");

        let sessions = api
            .get_session_summaries(SummaryQuery::default())
            .await
            .unwrap();
        assert_eq!(sessions.len(), 4);

        let detail = api.get_session_detail(sessions[0].id()).await.unwrap();
        assert_eq!(detail.summary.id(), sessions[0].id());

        let stats = api.get_timeline_stats().await.unwrap();
        assert_eq!(stats.total_sessions, 4);
    }

    #[test]
    fn test_connect_live_requires_url() {
        let config = Config::default();
        assert!(!config.demo.enabled);
        assert!(connect(&config, MemoryStore::new()).is_err());
    }

    #[test]
    fn test_connect_live_with_url() {
        let mut config = Config::default();
        config.backend.url = Some("http://localhost:8000/".to_string());
        let api = connect(&config, MemoryStore::new()).unwrap();
        assert_eq!(api.source(), "live");
    }
}
