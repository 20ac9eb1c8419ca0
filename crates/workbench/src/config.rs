//! Client configuration.

use std::time::Duration;

/// Public Workbench REST root.
pub const DEFAULT_BASE_URL: &str = "https://www.metabolomicsworkbench.org/rest";

/// Default upstream request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable settings for [`crate::WorkbenchClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbenchConfig {
    /// REST root, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl WorkbenchConfig {
    /// Create a config for the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Set the request timeout. A zero duration disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
