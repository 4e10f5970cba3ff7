//! Configuration loading from environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use currency_hex::outbound::DEFAULT_CBR_URL;
use currency_hex::{WorkerConfig, WriteMode};

/// Which rate feed the sync loop talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Cbr,
    Static,
}

impl FromStr for FeedKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cbr" => Ok(FeedKind::Cbr),
            "static" | "reference" => Ok(FeedKind::Static),
            other => anyhow::bail!("unknown rate feed: {}", other),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub rate_feed: FeedKind,
    pub rate_feed_url: String,
    pub static_variance_percent: f64,
    pub sync_interval: Duration,
    pub sync_max_concurrent: usize,
    pub monitor_interval: Duration,
    pub ingest_capacity: usize,
    pub write_mode: WriteMode,
    pub shutdown_grace: Duration,
    pub log_json: bool,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let parse = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port = parse("PORT", "8080")
            .parse()
            .context("PORT must be a port number")?;
        let rate_feed = parse("RATE_FEED", "cbr").parse()?;
        let static_variance_percent = parse("STATIC_FEED_VARIANCE_PERCENT", "0")
            .parse()
            .context("STATIC_FEED_VARIANCE_PERCENT must be a number")?;
        let sync_interval_secs: u64 = parse("SYNC_INTERVAL_SECS", "3600")
            .parse()
            .context("SYNC_INTERVAL_SECS must be a whole number of seconds")?;
        let sync_max_concurrent = parse("SYNC_MAX_CONCURRENT", "3")
            .parse()
            .context("SYNC_MAX_CONCURRENT must be a positive integer")?;
        let monitor_interval_ms: u64 = parse("MONITOR_INTERVAL_MS", "200")
            .parse()
            .context("MONITOR_INTERVAL_MS must be a whole number of milliseconds")?;
        let ingest_capacity = parse("INGEST_CAPACITY", "10")
            .parse()
            .context("INGEST_CAPACITY must be a positive integer")?;
        let write_mode = parse("CONVERSION_WRITE_MODE", "queued")
            .parse::<WriteMode>()
            .map_err(anyhow::Error::msg)?;
        let shutdown_grace_secs: u64 = parse("SHUTDOWN_GRACE_SECS", "2")
            .parse()
            .context("SHUTDOWN_GRACE_SECS must be a whole number of seconds")?;

        if sync_interval_secs == 0 || monitor_interval_ms == 0 {
            anyhow::bail!("SYNC_INTERVAL_SECS and MONITOR_INTERVAL_MS must be greater than zero");
        }

        Ok(Self {
            port,
            data_dir: PathBuf::from(parse("DATA_DIR", "data")),
            rate_feed,
            rate_feed_url: parse("RATE_FEED_URL", DEFAULT_CBR_URL),
            static_variance_percent,
            sync_interval: Duration::from_secs(sync_interval_secs),
            sync_max_concurrent,
            monitor_interval: Duration::from_millis(monitor_interval_ms),
            ingest_capacity,
            write_mode,
            shutdown_grace: Duration::from_secs(shutdown_grace_secs),
            log_json: parse("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty()),
        })
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            ingest_capacity: self.ingest_capacity,
            sync_interval: self.sync_interval,
            sync_max_concurrent: self.sync_max_concurrent,
            monitor_interval: self.monitor_interval,
        }
    }
}
