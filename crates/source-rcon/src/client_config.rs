use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RconClientConfig {
    pub address: String,
    pub port: u16,
    pub password: String,
    pub io_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_retries: usize,
    pub retry_delay: Duration,
}

const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_MAX_RETRIES: usize = 3;

impl Default for RconClientConfig {
    fn default() -> Self {
        RconClientConfig::new("", 0, "")
    }
}

impl RconClientConfig {
    pub fn new(address: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port,
            password: password.into(),
            io_timeout: DEFAULT_IO_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::ZERO,
        }
    }

    /// How long a single packet write or read may take before failing with a timeout.
    /// `Duration::ZERO` waits forever.
    pub fn io_timeout(mut self, t: Duration) -> Self { self.io_timeout = t; self }

    /// How long opening the transport may take. `Duration::ZERO` waits forever.
    pub fn connect_timeout(mut self, t: Duration) -> Self { self.connect_timeout = t; self }

    /// How many times a command is retried, reconnecting before each retry.
    /// Zero means a command fails as soon as anything goes wrong.
    pub fn max_retries(mut self, v: usize) -> Self { self.max_retries = v; self }

    /// Pause before each reconnect attempt.
    pub fn retry_delay(mut self, t: Duration) -> Self { self.retry_delay = t; self }

    pub fn retry_delay_secs(self, secs: u64) -> Self { self.retry_delay(Duration::from_secs(secs)) }

    pub fn requires_auth(&self) -> bool {
        !self.password.is_empty()
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
