//! Client configuration.

use std::time::Duration;

use nettime_core::{BaseUrl, PollConfig};

/// Timeout applied to a request unless the call overrides it.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for a [`NetTimeClient`](crate::NetTimeClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: BaseUrl,
    request_timeout: Duration,
    poll: PollConfig,
}

impl ClientConfig {
    /// Defaults for the given server.
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poll: PollConfig::default(),
        }
    }

    /// Set the default per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the async task polling bounds.
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn poll(&self) -> &PollConfig {
        &self.poll
    }
}
