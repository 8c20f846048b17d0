use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub admission: AdmissionConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8081
}

/// Admission control configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdmissionConfig {
    /// Maximum number of batches dispatched at the same time.
    #[serde(default = "default_max_concurrent_batches")]
    pub max_concurrent_batches: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_batches: default_max_concurrent_batches(),
        }
    }
}

fn default_max_concurrent_batches() -> usize {
    100
}

/// Per-URL fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    /// Hard deadline for a single URL, in milliseconds.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
    /// Window raced against the deadline once the call has returned, in milliseconds.
    #[serde(default = "default_settle_window_ms")]
    pub settle_window_ms: u64,
    /// User-Agent header sent upstream.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl FetcherConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }

    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            deadline_ms: default_deadline_ms(),
            settle_window_ms: default_settle_window_ms(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_deadline_ms() -> u64 {
    1000
}

fn default_settle_window_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    concat!("fanout/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Batch request limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Maximum number of URLs accepted in one request.
    #[serde(default = "default_max_urls")]
    pub max_urls: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_urls: default_max_urls(),
        }
    }
}

fn default_max_urls() -> usize {
    20
}

/// Graceful shutdown configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShutdownConfig {
    /// Time in-flight requests get to finish once shutdown starts.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: default_grace_period_secs(),
        }
    }
}

fn default_grace_period_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.admission.max_concurrent_batches, 100);
        assert_eq!(config.fetcher.deadline(), Duration::from_secs(1));
        assert_eq!(config.fetcher.settle_window(), Duration::from_millis(500));
        assert_eq!(config.batch.max_urls, 20);
        assert_eq!(config.shutdown.grace_period(), Duration::from_secs(10));
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[fetcher]
deadline_ms = 2500
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.fetcher.deadline_ms, 2500);
        assert_eq!(config.fetcher.settle_window_ms, 500); // default
        assert_eq!(config.admission.max_concurrent_batches, 100);
    }

    #[test]
    fn test_default_user_agent_carries_version() {
        let config = FetcherConfig::default();
        assert!(config.user_agent.starts_with("fanout/"));
    }

    #[test]
    fn test_deserialize_rejects_bad_host() {
        let toml = r#"
[server]
host = "not-an-ip"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
