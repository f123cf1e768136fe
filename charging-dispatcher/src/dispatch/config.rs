//! Dispatcher tuning knobs.

use std::time::Duration;

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Timeouts bounding a single host attempt. Expiry counts as a connectivity failure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DispatcherConfig {
    attempt_timeout: Duration,
    connect_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl DispatcherConfig {
    /// Upper bound for one remote invocation on one host.
    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    /// Upper bound for acquiring a connection to one host, including any wait behind
    /// another caller dialing the same host.
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}
