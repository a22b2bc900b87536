// Shared transport configuration for building reqwest::Client instances.
//
// The killboard and scout clients share timeout and user-agent settings
// through this module, avoiding duplicated builder logic.

use std::time::Duration;

const DEFAULT_USER_AGENT: &str = concat!("holewatch/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// reqwest advertises gzip and brotli itself and decodes compressed
    /// bodies before they reach the JSON parser.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
