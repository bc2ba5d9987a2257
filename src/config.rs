//! Client configuration.
//!
//! Defaults target the public READY server. A JSON file can override any
//! field, `WINDSCAN_BASE_URL` overrides the host, and CLI flags win last.
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.ready.noaa.gov";
pub const BASE_URL_ENV: &str = "WINDSCAN_BASE_URL";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Scheme and host of the READY server, without a trailing slash.
    pub base_url: String,
    /// Upper bound for each request, connect through body.
    pub timeout_secs: u64,
    /// Pause after each successful form step.
    pub step_pause_ms: u64,
    /// Wait before the archive download; the server gives no completion signal.
    pub retrieval_delay_secs: u64,
    pub max_redirects: u32,
    /// Browser header set sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
            step_pause_ms: 1000,
            retrieval_delay_secs: 10,
            max_redirects: 10,
            headers: default_headers(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn step_pause(&self) -> Duration {
        Duration::from_millis(self.step_pause_ms)
    }

    pub fn retrieval_delay(&self) -> Duration {
        Duration::from_secs(self.retrieval_delay_secs)
    }

    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url)
            .with_context(|| format!("parse base_url {}", self.base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "base_url must be http or https, got {}",
                parsed.scheme()
            ));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    fn normalize(mut self) -> Self {
        let trimmed = self.base_url.trim_end_matches('/').to_string();
        self.base_url = trimmed;
        self
    }
}

/// Load config from an optional JSON file, then apply the environment override.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => {
            let bytes =
                fs::read(path).with_context(|| format!("read config {}", path.display()))?;
            parse_config(&bytes).with_context(|| format!("parse config {}", path.display()))?
        }
        None => ClientConfig::default(),
    };
    let config = apply_env(config, env::var(BASE_URL_ENV).ok());
    config.validate()?;
    Ok(config)
}

pub fn parse_config(bytes: &[u8]) -> Result<ClientConfig> {
    let config: ClientConfig = serde_json::from_slice(bytes).context("parse client config JSON")?;
    Ok(config.normalize())
}

fn apply_env(mut config: ClientConfig, base_url: Option<String>) -> ClientConfig {
    if let Some(base_url) = base_url.filter(|value| !value.trim().is_empty()) {
        config.base_url = base_url;
    }
    config.normalize()
}

fn default_headers() -> BTreeMap<String, String> {
    [
        (
            "accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
        ),
        (
            "accept-language",
            "en-US,en;q=0.9,sv;q=0.8,ja;q=0.7,de;q=0.6,la;q=0.5",
        ),
        (
            "sec-ch-ua",
            r#""Google Chrome";v="135", "Not-A.Brand";v="8", "Chromium";v="135""#,
        ),
        ("sec-ch-ua-mobile", "?1"),
        ("sec-ch-ua-platform", r#""Android""#),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "same-origin"),
        ("upgrade-insecure-requests", "1"),
        ("referrer-policy", "strict-origin-when-cross-origin"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}
