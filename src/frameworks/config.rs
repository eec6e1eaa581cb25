use std::{env, path::PathBuf, time::Duration};

use crate::interface_adapters::net::FeedSettings;

// Runtime constants and environment-driven settings.

pub fn feed_url() -> String {
    env::var("FEED_URL").unwrap_or_else(|_| "ws://localhost:8080".to_string())
}

pub fn http_port() -> u16 {
    env::var("DASHBOARD_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3010)
}

pub fn data_dir() -> PathBuf {
    env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data"))
}

pub fn reconnect_delay() -> Duration {
    millis_var("RECONNECT_DELAY_MS", 5000)
}

pub fn connect_timeout() -> Duration {
    millis_var("CONNECT_TIMEOUT_MS", 3000)
}

pub fn console_enabled() -> bool {
    !matches!(
        env::var("DASHBOARD_CONSOLE").as_deref(),
        Ok("0") | Ok("false") | Ok("off")
    )
}

pub fn render_interval() -> Duration {
    millis_var("RENDER_INTERVAL_MS", 1000)
}

fn millis_var(name: &str, default: u64) -> Duration {
    let millis = env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default);
    Duration::from_millis(millis)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

pub fn log_format() -> LogFormat {
    LogFormat::parse(env::var("LOG_FORMAT").ok().as_deref())
}

pub const EVENT_CHANNEL_CAPACITY: usize = 256;
pub const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Everything `run` needs besides the listener.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub feed: FeedSettings,
    pub data_dir: PathBuf,
    pub console: bool,
    pub render_interval: Duration,
}

impl DashboardSettings {
    pub fn from_env() -> Self {
        Self {
            feed: FeedSettings {
                url: feed_url(),
                reconnect_delay: reconnect_delay(),
                connect_timeout: connect_timeout(),
            },
            data_dir: data_dir(),
            console: console_enabled(),
            render_interval: render_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_defaults_to_compact() {
        assert_eq!(LogFormat::parse(None), LogFormat::Compact);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Compact);
    }

    #[test]
    fn log_format_accepts_json_in_any_case() {
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
    }
}
