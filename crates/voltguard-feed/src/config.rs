use std::time::Duration;

use voltguard_wire::DEFAULT_MAX_PAYLOAD;

/// Default frame server address.
pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:8000";

/// Delay before re-requesting a frame after a server `error` event.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the frame feed client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// `host:port` of the frame server.
    pub endpoint: String,
    /// Fixed delay before the single retry that follows a server error.
    /// There is no backoff, so a failing server sees one request per delay.
    pub retry_delay: Duration,
    pub connect_timeout: Duration,
    /// Maximum wire payload in bytes. Default: 8 MiB.
    pub max_payload_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            retry_delay: DEFAULT_RETRY_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl FeedConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_frame_server() {
        let config = FeedConfig::default();
        assert_eq!(config.endpoint, "127.0.0.1:8000");
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert_eq!(config.max_payload_size, 8 * 1024 * 1024);
    }

    #[test]
    fn builders_override_fields() {
        let config = FeedConfig::default()
            .with_endpoint("cam.local:9000")
            .with_retry_delay(Duration::from_millis(250));
        assert_eq!(config.endpoint, "cam.local:9000");
        assert_eq!(config.retry_delay, Duration::from_millis(250));
    }
}
