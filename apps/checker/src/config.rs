use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_STORE_PATH: &str = ".ats_scan_store.json";
pub const DEFAULT_ANALYSIS_DELAY: Duration = Duration::from_millis(1500);
/// en-US short date, e.g. `3/8/2024`.
pub const DEFAULT_DATE_LABEL_FORMAT: &str = "%-m/%-d/%Y";

/// Checker configuration loaded from environment variables.
/// Every variable is optional; missing ones fall back to the defaults above.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: PathBuf,
    pub analysis_delay: Duration,
    pub date_label_format: String,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            analysis_delay: DEFAULT_ANALYSIS_DELAY,
            date_label_format: DEFAULT_DATE_LABEL_FORMAT.to_string(),
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            store_path: optional_env("ATS_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            analysis_delay: match optional_env("ATS_ANALYSIS_DELAY_MS") {
                Some(raw) => parse_delay_ms(&raw)?,
                None => defaults.analysis_delay,
            },
            date_label_format: optional_env("ATS_DATE_LABEL_FORMAT")
                .unwrap_or(defaults.date_label_format),
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_delay_ms(raw: &str) -> Result<Duration> {
    let ms = raw
        .trim()
        .parse::<u64>()
        .with_context(|| format!("ATS_ANALYSIS_DELAY_MS must be a whole number of milliseconds, got '{raw}'"))?;
    Ok(Duration::from_millis(ms))
}
