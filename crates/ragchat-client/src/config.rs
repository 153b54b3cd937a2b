//! Client configuration.

use ragchat_core::defaults;

/// Configuration for [`ApiClient`](crate::ApiClient).
///
/// Read once when the client is constructed; the client never looks at the
/// environment again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin (and optional path prefix) all API paths are resolved against.
    pub base_url: String,
    /// Whole-request timeout in seconds. `None` keeps the transport default.
    pub timeout_seconds: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_URL.to_string(),
            timeout_seconds: None,
        }
    }
}

impl ClientConfig {
    /// Config pointed at `base_url` with no timeout override.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Create from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `RAGCHAT_API_URL` | `http://localhost:8000` |
    /// | `RAGCHAT_TIMEOUT_SECS` | (transport default) |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            base_url: get(defaults::ENV_API_URL)
                .unwrap_or_else(|| defaults::API_URL.to_string()),
            timeout_seconds: get(defaults::ENV_TIMEOUT_SECS)
                .and_then(|s| s.trim().parse().ok())
                .filter(|secs: &u64| *secs > 0),
        }
    }

    /// Replace the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_seconds, None);
    }

    #[test]
    fn test_unset_env_uses_local_default() {
        let config = ClientConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_env_base_url() {
        let config = ClientConfig::from_lookup(lookup_from(&[(
            "RAGCHAT_API_URL",
            "https://example.com",
        )]));
        assert_eq!(config.base_url, "https://example.com");
    }

    #[test]
    fn test_empty_env_base_url_counts_as_unset() {
        let config = ClientConfig::from_lookup(lookup_from(&[("RAGCHAT_API_URL", "")]));
        assert_eq!(config.base_url, defaults::API_URL);
    }

    #[test]
    fn test_env_timeout() {
        let config = ClientConfig::from_lookup(lookup_from(&[("RAGCHAT_TIMEOUT_SECS", "30")]));
        assert_eq!(config.timeout_seconds, Some(30));

        let config = ClientConfig::from_lookup(lookup_from(&[("RAGCHAT_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.timeout_seconds, None);

        let config = ClientConfig::from_lookup(lookup_from(&[("RAGCHAT_TIMEOUT_SECS", "0")]));
        assert_eq!(config.timeout_seconds, None);
    }

    #[test]
    fn test_with_base_url() {
        let config = ClientConfig::default().with_base_url("http://10.0.0.2:9000");
        assert_eq!(config.base_url, "http://10.0.0.2:9000");
    }
}
