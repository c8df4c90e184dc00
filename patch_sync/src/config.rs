use std::time::Duration;

use url::Url;

pub const DEFAULT_URL: &str = "http://metronome.local";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_NOTICE: Duration = Duration::from_millis(3000);
pub const DEFAULT_QUEUE_CAP: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub base_url: Url,
    pub http_timeout: Duration,
    pub notice_duration: Duration,
    pub queue_cap: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_URL).expect("DEFAULT_URL is a valid url"),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            notice_duration: DEFAULT_NOTICE,
            queue_cap: DEFAULT_QUEUE_CAP,
        }
    }
}

impl ConsoleConfig {
    /// Defaults overridden by `METRONOME_URL`, `METRONOME_HTTP_TIMEOUT_SECS`
    /// and `METRONOME_NOTICE_MS`. Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(raw) = lookup("METRONOME_URL") {
            match parse_base_url(&raw) {
                Ok(url) => cfg.base_url = url,
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring METRONOME_URL"),
            }
        }
        if let Some(raw) = lookup("METRONOME_HTTP_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => cfg.http_timeout = Duration::from_secs(secs),
                Ok(_) => tracing::warn!(value = %raw, "ignoring zero METRONOME_HTTP_TIMEOUT_SECS"),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "ignoring METRONOME_HTTP_TIMEOUT_SECS")
                }
            }
        }
        if let Some(raw) = lookup("METRONOME_NOTICE_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => cfg.notice_duration = Duration::from_millis(ms),
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring METRONOME_NOTICE_MS"),
            }
        }
        cfg
    }
}

/// Accepts `host`, `host:port` or a full `http://` URL. A path in the URL is
/// kept as a prefix for every endpoint.
pub fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let raw = raw.trim();
    if raw.contains("://") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("http://{raw}"))
    }
}
