//! Backend configuration.

use larder_core::{Error, Result};
use std::time::Duration;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the remote graph service.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    /// Base URL of the graph service API.
    pub api_url: String,
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// Identifier of the graph this deployment uses.
    pub graph_id: String,
    /// Bound applied to every remote request.
    pub timeout: Duration,
}

impl BackendConfig {
    /// Creates a config with the default timeout.
    pub fn new(
        api_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        graph_id: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            username: username.into(),
            password: password.into(),
            graph_id: graph_id.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Loads the config from the process environment.
    ///
    /// Reads `GRAPH_API_URL`, `GRAPH_USERNAME`, `GRAPH_PASSWORD`, and
    /// `GRAPH_ID`, plus the optional `GRAPH_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::config(format!("{key} is not set")))
        };

        let timeout_secs = match lookup("GRAPH_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::config(format!("GRAPH_TIMEOUT_SECS is not an integer: {raw:?}")))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url: require("GRAPH_API_URL")?,
            username: require("GRAPH_USERNAME")?,
            password: require("GRAPH_PASSWORD")?,
            graph_id: require("GRAPH_ID")?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_lookup_complete() {
        let vars = env(&[
            ("GRAPH_API_URL", "https://graph.example.com/api"),
            ("GRAPH_USERNAME", "alice"),
            ("GRAPH_PASSWORD", "secret"),
            ("GRAPH_ID", "recipes"),
        ]);
        let config = BackendConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.api_url, "https://graph.example.com/api");
        assert_eq!(config.graph_id, "recipes");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_from_lookup_missing_variable() {
        let vars = env(&[("GRAPH_API_URL", "https://graph.example.com/api")]);
        let err = BackendConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("GRAPH_USERNAME"));
    }

    #[test]
    fn test_from_lookup_custom_timeout() {
        let vars = env(&[
            ("GRAPH_API_URL", "u"),
            ("GRAPH_USERNAME", "a"),
            ("GRAPH_PASSWORD", "p"),
            ("GRAPH_ID", "g"),
            ("GRAPH_TIMEOUT_SECS", "3"),
        ]);
        let config = BackendConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_from_lookup_bad_timeout() {
        let vars = env(&[
            ("GRAPH_API_URL", "u"),
            ("GRAPH_USERNAME", "a"),
            ("GRAPH_PASSWORD", "p"),
            ("GRAPH_ID", "g"),
            ("GRAPH_TIMEOUT_SECS", "soon"),
        ]);
        let err = BackendConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_with_timeout() {
        let config =
            BackendConfig::new("u", "a", "p", "g").with_timeout(Duration::from_secs(30));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
