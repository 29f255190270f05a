use std::time::Duration;

use super::error::{DashboardError, Result};

/// Base URL used when nothing else is configured: the dashboard backend on its dev port.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Configuration for the dashboard backend client
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// Root URL of the backend serving `/api/*` and `/proxy-filing`
    pub base_url: String,
    /// Rate limit in requests per second
    pub rate_limit: u32,
    /// HTTP request timeout
    pub timeout: Duration,
    /// How many times a rate-limited or failed request is retried
    pub max_retries: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("edgardash/{}", env!("CARGO_PKG_VERSION")),
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limit: 10,
            timeout: Duration::from_secs(30),
            max_retries: 5,
        }
    }
}

impl DashboardConfig {
    /// Creates a new DashboardConfig with custom settings
    ///
    /// # Basic usage
    ///
    /// ```rust
    /// use edgardash::DashboardConfig;
    /// use std::time::Duration;
    ///
    /// let config = DashboardConfig::new(
    ///     "research_tool/1.0",
    ///     "http://localhost:8000",
    ///     5,
    ///     Duration::from_secs(60),
    /// );
    /// assert_eq!(config.base_url, "http://localhost:8000");
    /// ```
    pub fn new(
        user_agent: impl Into<String>,
        base_url: impl Into<String>,
        rate_limit: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            base_url: base_url.into(),
            rate_limit,
            timeout,
            ..Self::default()
        }
    }

    /// Builds a configuration from `EDGARDASH_*` environment variables.
    ///
    /// Recognised variables are `EDGARDASH_BASE_URL`, `EDGARDASH_USER_AGENT`,
    /// `EDGARDASH_RATE_LIMIT` and `EDGARDASH_TIMEOUT_SECS`. Unset variables keep their
    /// defaults; numeric variables that fail to parse yield `DashboardError::Config`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup("EDGARDASH_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(user_agent) = lookup("EDGARDASH_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(rate) = lookup("EDGARDASH_RATE_LIMIT") {
            config.rate_limit = rate.trim().parse().map_err(|e| {
                DashboardError::Config(format!("Invalid EDGARDASH_RATE_LIMIT '{}': {}", rate, e))
            })?;
        }
        if let Some(secs) = lookup("EDGARDASH_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|e| {
                DashboardError::Config(format!("Invalid EDGARDASH_TIMEOUT_SECS '{}': {}", secs, e))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = DashboardConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.rate_limit, 10);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            ("EDGARDASH_BASE_URL", "https://dash.example.com/"),
            ("EDGARDASH_RATE_LIMIT", "3"),
            ("EDGARDASH_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://dash.example.com");
        assert_eq!(config.rate_limit, 3);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err =
            DashboardConfig::from_lookup(lookup_from(&[("EDGARDASH_RATE_LIMIT", "fast")]))
                .unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}
