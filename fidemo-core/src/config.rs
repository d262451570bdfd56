//! Configuration loading and management
//!
//! Configuration is layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. `~/.config/fidemo/config.toml`
//! 3. Environment variables (`FI_DEMO_*`, `FI_BACKEND_URL`)
//! 4. Explicit values passed by the caller (CLI flags, [`DemoConfigPatch`])
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/fidemo/` (~/.config/fidemo/)
//! - Data: `$XDG_DATA_HOME/fidemo/` (~/.local/share/fidemo/)
//! - State/Logs: `$XDG_STATE_HOME/fidemo/` (~/.local/state/fidemo/)

use crate::error::{Error, Result};
use crate::types::EventsProfile;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_DEMO_ENABLED: &str = "FI_DEMO_ENABLED";
pub const ENV_DEMO_SEED: &str = "FI_DEMO_SEED";
pub const ENV_DEMO_SESSIONS: &str = "FI_DEMO_SESSIONS";
pub const ENV_DEMO_EVENTS: &str = "FI_DEMO_EVENTS";
pub const ENV_DEMO_LATENCY_MS: &str = "FI_DEMO_LATENCY_MS";
pub const ENV_DEMO_ERROR_RATE: &str = "FI_DEMO_ERROR_RATE";
pub const ENV_BACKEND_URL: &str = "FI_BACKEND_URL";

pub const DEFAULT_SEED: &str = "fi-2025";
pub const DEFAULT_SESSIONS: usize = 24;
pub const DEFAULT_LATENCY_MIN_MS: u64 = 80;
pub const DEFAULT_LATENCY_MAX_MS: u64 = 140;

/// Upper bound for either end of a latency range
pub const MAX_LATENCY_MS: u64 = 60_000;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Demo dataset configuration
    #[serde(default)]
    pub demo: DemoConfig,

    /// Live Timeline API backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============================================
// Demo
// ============================================

/// Inclusive range of simulated request latency in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyRange {
    pub min: u64,
    pub max: u64,
}

impl Default for LatencyRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_LATENCY_MIN_MS,
            max: DEFAULT_LATENCY_MAX_MS,
        }
    }
}

impl LatencyRange {
    /// Fixed delay of `ms` milliseconds.
    pub fn fixed(ms: u64) -> Self {
        Self { min: ms, max: ms }
    }

    /// Cap both bounds at [`MAX_LATENCY_MS`] and swap reversed bounds.
    pub fn normalized(self) -> Self {
        let min = self.min.min(MAX_LATENCY_MS);
        let max = self.max.min(MAX_LATENCY_MS);
        if min > max {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }
}

impl std::fmt::Display for LatencyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl std::str::FromStr for LatencyRange {
    type Err = String;

    /// Parses `"<min>-<max>"` or a single `"<ms>"`; values above
    /// [`MAX_LATENCY_MS`] are rejected.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse = |part: &str| {
            let ms = part
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("invalid latency range: {}", s))?;
            if ms > MAX_LATENCY_MS {
                return Err(format!(
                    "latency {}ms exceeds the {}ms maximum",
                    ms, MAX_LATENCY_MS
                ));
            }
            Ok(ms)
        };

        match s.split_once('-') {
            Some((min, max)) => Ok(Self {
                min: parse(min)?,
                max: parse(max)?,
            }
            .normalized()),
            None => Ok(Self::fixed(parse(s)?)),
        }
    }
}

/// Settings that drive demo dataset generation and request simulation.
///
/// Changing `seed` is the only way to invalidate a cached dataset on startup;
/// [`crate::DemoAdapter::update_config`] always regenerates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Serve the Timeline API from generated data instead of the backend
    pub enabled: bool,
    /// Seed string for every random draw
    pub seed: String,
    /// Number of sessions to generate
    pub sessions: usize,
    /// Event volume policy
    pub events_profile: EventsProfile,
    /// Simulated request latency
    pub latency_ms: LatencyRange,
    /// Probability (percent) that a read fails with a simulated error
    pub error_rate_pct: u8,
    /// Instant timestamps are back-dated from. Defaults to the start of the
    /// current UTC day.
    pub anchor: Option<DateTime<Utc>>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            seed: DEFAULT_SEED.to_string(),
            sessions: DEFAULT_SESSIONS,
            events_profile: EventsProfile::Mix,
            latency_ms: LatencyRange::default(),
            error_rate_pct: 0,
            anchor: None,
        }
    }
}

impl DemoConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup` (an environment accessor).
    ///
    /// Malformed values are ignored with a warning, leaving the current value
    /// in place.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_DEMO_ENABLED) {
            match parse_bool(&raw) {
                Some(enabled) => self.enabled = enabled,
                None => warn_malformed(ENV_DEMO_ENABLED, &raw),
            }
        }

        if let Some(raw) = lookup(ENV_DEMO_SEED) {
            let seed = raw.trim();
            if seed.is_empty() {
                warn_malformed(ENV_DEMO_SEED, &raw);
            } else {
                self.seed = seed.to_string();
            }
        }

        if let Some(raw) = lookup(ENV_DEMO_SESSIONS) {
            match raw.trim().parse::<usize>() {
                Ok(sessions) => self.sessions = sessions,
                Err(_) => warn_malformed(ENV_DEMO_SESSIONS, &raw),
            }
        }

        if let Some(raw) = lookup(ENV_DEMO_EVENTS) {
            match raw.parse::<EventsProfile>() {
                Ok(profile) => self.events_profile = profile,
                Err(_) => warn_malformed(ENV_DEMO_EVENTS, &raw),
            }
        }

        if let Some(raw) = lookup(ENV_DEMO_LATENCY_MS) {
            match raw.parse::<LatencyRange>() {
                Ok(range) => self.latency_ms = range,
                Err(_) => warn_malformed(ENV_DEMO_LATENCY_MS, &raw),
            }
        }

        if let Some(raw) = lookup(ENV_DEMO_ERROR_RATE) {
            match raw.trim().parse::<i64>() {
                Ok(pct) => self.error_rate_pct = pct.clamp(0, 100) as u8,
                Err(_) => warn_malformed(ENV_DEMO_ERROR_RATE, &raw),
            }
        }

        self.normalized()
    }

    /// Clamp the error rate and fix reversed latency bounds.
    pub fn normalized(mut self) -> Self {
        self.error_rate_pct = self.error_rate_pct.min(100);
        self.latency_ms = self.latency_ms.normalized();
        self
    }

    /// Merge a partial update into this config.
    pub fn apply(&mut self, patch: &DemoConfigPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(seed) = &patch.seed {
            self.seed = seed.clone();
        }
        if let Some(sessions) = patch.sessions {
            self.sessions = sessions;
        }
        if let Some(profile) = patch.events_profile {
            self.events_profile = profile;
        }
        if let Some(latency) = patch.latency_ms {
            self.latency_ms = latency;
        }
        if let Some(pct) = patch.error_rate_pct {
            self.error_rate_pct = pct;
        }
        if let Some(anchor) = patch.anchor {
            self.anchor = Some(anchor);
        }
        *self = self.clone().normalized();
    }

    /// The anchor instant, defaulting to the start of the current UTC day.
    pub fn resolved_anchor(&self) -> DateTime<Utc> {
        self.anchor.unwrap_or_else(|| {
            Utc::now()
                .date_naive()
                .and_time(NaiveTime::MIN)
                .and_utc()
        })
    }
}

/// Partial [`DemoConfig`] update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfigPatch {
    pub enabled: Option<bool>,
    pub seed: Option<String>,
    pub sessions: Option<usize>,
    pub events_profile: Option<EventsProfile>,
    pub latency_ms: Option<LatencyRange>,
    pub error_rate_pct: Option<u8>,
    pub anchor: Option<DateTime<Utc>>,
}

impl DemoConfigPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn warn_malformed(key: &str, raw: &str) {
    tracing::warn!(key, value = raw, "Ignoring malformed configuration value");
}

// ============================================
// Backend
// ============================================

/// Live Timeline API backend configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g., `http://localhost:8000`)
    pub url: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_backend_timeout(),
        }
    }
}

impl BackendConfig {
    /// Overlay `FI_BACKEND_URL` from `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            let url = url.trim();
            if !url.is_empty() {
                self.url = Some(url.to_string());
            }
        }
        self
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        match self.url.as_deref() {
            None => Err(Error::Config(
                "backend.url is required when demo mode is disabled".to_string(),
            )),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => Err(
                Error::Config(format!("backend.url must be an http(s) URL, got {}", url)),
            ),
            Some(_) => Ok(()),
        }
    }
}

fn default_backend_timeout() -> u64 {
    30
}

// ============================================
// Logging
// ============================================

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path, then apply environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Config::default()
        };

        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Load configuration from a specific path (no environment overrides)
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.demo = config.demo.normalized();

        Ok(config)
    }

    /// Apply environment overrides from `lookup` to every section.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.demo = self.demo.with_env_overrides(&lookup);
        self.backend = self.backend.with_env_overrides(&lookup);
        self
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/fidemo/config.toml` (~/.config/fidemo/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("fidemo").join("config.toml")
    }

    /// Returns the data directory path (for the dataset cache)
    ///
    /// `$XDG_DATA_HOME/fidemo/` (~/.local/share/fidemo/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("fidemo")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/fidemo/` (~/.local/state/fidemo/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("fidemo")
    }

    /// Returns the dataset cache database path
    ///
    /// `$XDG_DATA_HOME/fidemo/cache.db` (~/.local/share/fidemo/cache.db)
    pub fn cache_path() -> PathBuf {
        Self::data_dir().join("cache.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/fidemo/fidemo.log` (~/.local/state/fidemo/fidemo.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("fidemo.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// For CLI binaries that want stable path behavior before invoking other
    /// components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
