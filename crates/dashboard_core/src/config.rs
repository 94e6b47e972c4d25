use std::{fs, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const SETTINGS_FILE: &str = "dashboard.toml";
/// Upper bound for every interval and the request timeout: one day.
pub const MAX_INTERVAL_SECS: u64 = 86_400;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub poll_interval_secs: u64,
    pub rotation_interval_secs: u64,
    pub page_size: u32,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5050/api".into(),
            poll_interval_secs: 5,
            rotation_interval_secs: 7,
            page_size: 4,
            request_timeout_secs: 4,
        }
    }
}

impl Settings {
    // Fields are public, so the accessors bound them again for settings that
    // never went through `resolve_settings`.
    pub fn poll_interval(&self) -> Duration {
        bounded_secs(self.poll_interval_secs)
    }

    pub fn rotation_interval(&self) -> Duration {
        bounded_secs(self.rotation_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        bounded_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    poll_interval_secs: Option<u64>,
    rotation_interval_secs: Option<u64>,
    page_size: Option<u32>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    resolve_settings(file.as_deref(), |name| std::env::var(name).ok())
}

/// Defaults, then `dashboard.toml`, then environment. For each field the
/// later env var in the list wins.
pub fn resolve_settings(file: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.api_base_url {
                    settings.api_base_url = v;
                }
                if let Some(v) = file_cfg.poll_interval_secs {
                    settings.poll_interval_secs = v;
                }
                if let Some(v) = file_cfg.rotation_interval_secs {
                    settings.rotation_interval_secs = v;
                }
                if let Some(v) = file_cfg.page_size {
                    settings.page_size = v;
                }
                if let Some(v) = file_cfg.request_timeout_secs {
                    settings.request_timeout_secs = v;
                }
            }
            Err(error) => warn!(%error, file = SETTINGS_FILE, "ignoring unreadable settings file"),
        }
    }

    if let Some(v) = env("DASHBOARD_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = parsed_env(&env, "APP__POLL_INTERVAL_SECS") {
        settings.poll_interval_secs = v;
    }
    if let Some(v) = parsed_env(&env, "APP__ROTATION_INTERVAL_SECS") {
        settings.rotation_interval_secs = v;
    }
    if let Some(v) = parsed_env(&env, "APP__PAGE_SIZE") {
        settings.page_size = v;
    }
    if let Some(v) = parsed_env(&env, "APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v;
    }

    settings.poll_interval_secs = clamp_interval("poll_interval_secs", settings.poll_interval_secs);
    settings.rotation_interval_secs =
        clamp_interval("rotation_interval_secs", settings.rotation_interval_secs);
    settings.request_timeout_secs =
        clamp_interval("request_timeout_secs", settings.request_timeout_secs);
    settings.page_size = settings.page_size.max(1);
    settings
}

fn clamp_interval(field: &'static str, secs: u64) -> u64 {
    let clamped = secs.clamp(1, MAX_INTERVAL_SECS);
    if clamped != secs && secs != 0 {
        warn!(field, value = secs, clamped, "interval out of range");
    }
    clamped
}

fn bounded_secs(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(1, MAX_INTERVAL_SECS))
}

fn parsed_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = env(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring non-numeric override");
            None
        }
    }
}

/// Validates the backend base URL and strips trailing slashes so resource
/// paths can be appended directly.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid backend url '{trimmed}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("backend url '{trimmed}' must use http or https");
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
