//! # fidemo-core
//!
//! Deterministic demo backend for a clinical timeline front end.
//!
//! This library provides:
//! - A seedable PRNG and a static text corpus
//! - Pure generators for session summaries, session details and a manifest
//! - A stateful [`DemoAdapter`] that serves the Timeline API read surface with
//!   simulated latency and error injection
//! - Key-value caching in memory or SQLite
//! - Configuration and logging infrastructure
//!
//! ## Architecture
//!
//! One seed always yields the same dataset:
//! - **Summaries:** generated eagerly, cached under the seed's manifest
//! - **Details:** regenerated on demand from `"<seed>:detail:<session_id>"`
//! - **Stats:** computed from the cached summaries
//!
//! ## Example
//!
//! ```rust,no_run
//! use fidemo_core::{DemoAdapter, DemoConfig, MemoryStore, SummaryQuery};
//!
//! # async fn run() -> fidemo_core::Result<()> {
//! let adapter = DemoAdapter::open(DemoConfig::from_env(), MemoryStore::new())?;
//! let sessions = adapter.get_session_summaries(SummaryQuery::default()).await?;
//! let detail = adapter.get_session_detail(sessions[0].id()).await?;
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use adapter::DemoAdapter;
pub use config::{Config, DemoConfig, DemoConfigPatch, LatencyRange};
pub use db::SqliteStore;
pub use error::{Error, Result};
pub use prng::SeededRng;
pub use storage::{KeyValueStore, MemoryStore, StorageKeys};
pub use timeline::{connect, HttpTimelineClient, TimelineApi};
pub use types::*;

// Public modules
pub mod adapter;
pub mod config;
pub mod corpus;
pub mod db;
pub mod error;
pub mod format;
pub mod generator;
pub mod logging;
pub mod prng;
pub mod storage;
pub mod timeline;
pub mod types;
