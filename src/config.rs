use std::time::Duration;

/// Applied separately to connecting, writing a request and each read of a reply.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Total attempts per request, the first one included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Upper bound for a reply that is still being received.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

/// Per-connection settings shared by a [`Client`](crate::Client) and every shard of a
/// [`Cluster`](crate::Cluster).
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub max_frame_size: usize,
}

impl ClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Clamped to at least one attempt.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}
