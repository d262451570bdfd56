//! fidemo - command line front end for the demo Timeline API
//!
//! Lists sessions, materializes session details and prints aggregate stats
//! from a deterministic, seed-keyed demo dataset. With `--live` the read
//! commands query a real backend instead.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Cache: $XDG_DATA_HOME/fidemo/cache.db (~/.local/share/fidemo/cache.db)
//! - Config: $XDG_CONFIG_HOME/fidemo/config.toml (~/.config/fidemo/config.toml)
//! - Logs: $XDG_STATE_HOME/fidemo/fidemo.log

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use fidemo_core::format::{format_duration_ms, format_relative_time, truncate};
use fidemo_core::{
    Config, DemoAdapter, DemoConfigPatch, EventsProfile, LatencyRange, SessionDetail,
    SessionSummary, SortOrder, SqliteStore, SummaryQuery, TimelineApi, TimelineStats,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "fidemo")]
#[command(about = "Deterministic demo Timeline API")]
#[command(version)]
struct Args {
    /// Dataset seed (overrides FI_DEMO_SEED and config)
    #[arg(long, global = true)]
    seed: Option<String>,

    /// Number of sessions to generate
    #[arg(long, global = true)]
    sessions: Option<usize>,

    /// Event count profile: small, large or mix
    #[arg(long, global = true)]
    profile: Option<EventsProfile>,

    /// Simulated latency in ms, e.g. "80-140" or "0"
    #[arg(long, global = true)]
    latency: Option<LatencyRange>,

    /// Percentage of reads that fail with a simulated server error
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=100))]
    error_rate: Option<u8>,

    /// Query the live backend instead of the demo dataset
    #[arg(long, global = true)]
    live: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List sessions
    Sessions {
        /// Maximum number of sessions to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Number of sessions to skip
        #[arg(short, long, default_value_t = 0)]
        offset: usize,

        /// Sort order: recent, oldest, events_desc, events_asc
        #[arg(short, long, default_value_t = SortOrder::Recent)]
        sort: SortOrder,
    },

    /// Show one session with its events
    Detail {
        /// Session ID
        session_id: String,

        /// Number of events to print in text mode
        #[arg(short, long, default_value_t = 20)]
        events: usize,
    },

    /// Show aggregate statistics
    Stats,

    /// Show the manifest of the demo dataset
    Manifest,

    /// Show the effective demo configuration
    Config,

    /// Drop the cached dataset and regenerate it
    ClearCache,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Args {
    fn demo_patch(&self) -> DemoConfigPatch {
        DemoConfigPatch {
            enabled: Some(!self.live),
            seed: self.seed.clone(),
            sessions: self.sessions,
            events_profile: self.profile,
            latency_ms: self.latency,
            error_rate_pct: self.error_rate,
            anchor: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration, then layer command line flags on top
    let mut config = Config::load().context("failed to load configuration")?;
    config.demo.apply(&args.demo_patch());
    if args.verbose {
        config.logging.level = "debug".to_string();
    }

    let _log_guard =
        fidemo_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!(command = ?std::env::args().skip(1).collect::<Vec<_>>(), "fidemo starting");

    match &args.command {
        Command::Sessions {
            limit,
            offset,
            sort,
        } => {
            let api = connect(&config)?;
            let query = SummaryQuery {
                limit: *limit,
                offset: *offset,
                sort: *sort,
            };
            let sessions = api
                .get_session_summaries(query)
                .await
                .context("failed to list sessions")?;
            print_sessions(&sessions, args.format)
        }
        Command::Detail { session_id, events } => {
            let api = connect(&config)?;
            let detail = api
                .get_session_detail(session_id)
                .await
                .with_context(|| format!("failed to load session {}", session_id))?;
            print_detail(&detail, *events, args.format)
        }
        Command::Stats => {
            let api = connect(&config)?;
            let stats = api
                .get_timeline_stats()
                .await
                .context("failed to load timeline stats")?;
            print_stats(&stats, args.format)
        }
        Command::Manifest => {
            let adapter = open_demo(&config)?;
            let manifest = adapter.get_manifest()?;
            match args.format {
                OutputFormat::Json => print_json(&manifest),
                OutputFormat::Text => {
                    println!("Demo Dataset Manifest");
                    println!("=====================");
                    println!("Version:      {}", manifest.version);
                    println!("Seed:         {}", manifest.seed);
                    println!("Sessions:     {}", manifest.sessions);
                    println!("Profile:      {}", manifest.events_profile);
                    println!("Anchor:       {}", manifest.anchor.to_rfc3339());
                    println!("IDs digest:   {}", manifest.ids_digest);
                    Ok(())
                }
            }
        }
        Command::Config => {
            let demo = &config.demo;
            match args.format {
                OutputFormat::Json => print_json(demo),
                OutputFormat::Text => {
                    println!("Demo Configuration");
                    println!("==================");
                    println!("Enabled:      {}", demo.enabled);
                    println!("Seed:         {}", demo.seed);
                    println!("Sessions:     {}", demo.sessions);
                    println!("Profile:      {}", demo.events_profile);
                    println!("Latency:      {} ms", demo.latency_ms);
                    println!("Error rate:   {}%", demo.error_rate_pct);
                    println!(
                        "Backend URL:  {}",
                        config.backend.url.as_deref().unwrap_or("(not set)")
                    );
                    println!("Cache:        {}", Config::cache_path().display());
                    Ok(())
                }
            }
        }
        Command::ClearCache => {
            let adapter = open_demo(&config)?;
            adapter.clear_cache().context("failed to clear cache")?;
            let manifest = adapter.get_manifest()?;
            println!(
                "Cache cleared; regenerated {} sessions for seed {} (digest {})",
                manifest.sessions, manifest.seed, manifest.ids_digest
            );
            Ok(())
        }
    }
}

fn open_store() -> Result<SqliteStore> {
    let cache_path = Config::cache_path();
    tracing::debug!(path = %cache_path.display(), "Opening cache");
    SqliteStore::open(&cache_path).context("failed to open cache database")
}

fn connect(config: &Config) -> Result<Box<dyn TimelineApi>> {
    if config.demo.enabled {
        return Ok(Box::new(open_demo(config)?));
    }
    fidemo_core::connect(config, open_store()?).context("failed to connect to Timeline API")
}

/// Open the demo adapter, regenerating when the cached dataset for this seed
/// was built with a different session count or profile.
fn open_demo(config: &Config) -> Result<DemoAdapter<SqliteStore>> {
    if !config.demo.enabled {
        anyhow::bail!("this command is only available for the demo dataset");
    }
    let adapter = DemoAdapter::open(config.demo.clone(), open_store()?)
        .context("failed to load demo dataset")?;

    let manifest = adapter.get_manifest()?;
    if manifest.sessions != config.demo.sessions
        || manifest.events_profile != config.demo.events_profile
    {
        tracing::info!(
            cached_sessions = manifest.sessions,
            sessions = config.demo.sessions,
            "Cached dataset shape differs from request, regenerating"
        );
        adapter
            .update_config(&DemoConfigPatch::default())
            .context("failed to regenerate demo dataset")?;
    }
    Ok(adapter)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_sessions(sessions: &[SessionSummary], format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(sessions);
    }

    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    let now = Utc::now();
    println!(
        "{:<46} {:>10} {:>7} {:>10}  PREVIEW",
        "SESSION", "CREATED", "EVENTS", "SIZE"
    );
    for session in sessions {
        println!(
            "{:<46} {:>10} {:>7} {:>10}  {}",
            session.id(),
            format_relative_time(session.metadata.created_at, now),
            session.size.interaction_count,
            session.size.size_human,
            truncate(&session.preview, 60)
        );
    }
    Ok(())
}

fn print_detail(detail: &SessionDetail, max_events: usize, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(detail);
    }

    let summary = &detail.summary;
    println!("Session {}", summary.id());
    println!("{}", "=".repeat(8 + summary.id().len()));
    println!("Participants: {}", summary.metadata.participants.join(", "));
    println!(
        "Started:      {} ({})",
        summary.timespan.start.to_rfc3339(),
        format_duration_ms(summary.timespan.duration_ms)
    );
    println!(
        "Events:       {} ({} auto, {} manual, mode {})",
        detail.events.len(),
        detail.auto_events,
        detail.manual_events,
        detail.generation_mode.as_str()
    );
    let redactions: Vec<String> = detail
        .redaction_stats
        .iter()
        .map(|(policy, count)| format!("{}={}", policy.as_str(), count))
        .collect();
    println!("Redaction:    {}", redactions.join(" "));
    println!();

    for event in detail.events.iter().take(max_events) {
        println!(
            "{}  {:<24} {:<22} {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.event_type.as_str(),
            truncate(&event.who, 22),
            truncate(&event.what, 70)
        );
    }
    if detail.events.len() > max_events {
        println!("... {} more events", detail.events.len() - max_events);
    }
    Ok(())
}

fn print_stats(stats: &TimelineStats, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(stats);
    }

    println!("Timeline Statistics");
    println!("===================");
    println!("Sessions:        {}", stats.total_sessions);
    println!("Events:          {}", stats.total_events);
    println!("Tokens:          {}", stats.total_tokens);
    println!("Avg events:      {:.1}", stats.avg_events_per_session);
    if let Some(range) = &stats.date_range {
        println!(
            "Date range:      {} .. {}",
            range.earliest.format("%Y-%m-%d"),
            range.latest.format("%Y-%m-%d")
        );
    }
    println!();
    println!("Event types (approximate):");
    for (kind, count) in &stats.event_types {
        println!("  {:<24} {}", kind.as_str(), count);
    }
    println!(
        "Generation:      {} auto / {} manual",
        stats.generation_modes.auto, stats.generation_modes.manual
    );
    Ok(())
}
