//! Astra DB configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

use mcrag_core::{CollectionDescriptor, CollectionRegistry, DEFAULT_TOP_K, Error, Result};

/// Keyspace used by the REST API when none is configured
pub const DEFAULT_NAMESPACE: &str = "default";

/// Collections queried when `ASTRA_DB_COLLECTIONS` is not set
pub const DEFAULT_COLLECTIONS: &[&str] = &[
    "skysafari",
    "starrynight",
    "starry_night_faq",
    "celestron_pdfs",
    "YouTube",
];

/// Configuration for Astra DB retrieval
#[derive(Clone, Serialize, Deserialize)]
pub struct AstraConfig {
    pub api_endpoint: String,
    #[serde(skip_serializing, default)]
    pub application_token: String,
    pub namespace: String,
    pub collections: Vec<String>,
    pub top_k: usize,
    /// Per-call time bound in milliseconds
    pub timeout_ms: u64,
}

impl AstraConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_endpoint = lookup("ASTRA_DB_API_ENDPOINT").ok_or_else(|| {
            Error::Configuration("ASTRA_DB_API_ENDPOINT environment variable not found".to_string())
        })?;

        let application_token = lookup("ASTRA_DB_APPLICATION_TOKEN").ok_or_else(|| {
            Error::Configuration(
                "ASTRA_DB_APPLICATION_TOKEN environment variable not found".to_string(),
            )
        })?;

        let mut config = Self::new(api_endpoint, application_token);

        if let Some(namespace) = lookup("ASTRA_DB_NAMESPACE") {
            config.namespace = namespace;
        }

        if let Some(collections) = lookup("ASTRA_DB_COLLECTIONS") {
            config.collections = collections
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(top_k) = lookup("ASTRA_DB_TOP_K") {
            config.top_k = parse_number("ASTRA_DB_TOP_K", &top_k)?;
        }

        if let Some(timeout) = lookup("ASTRA_DB_TIMEOUT_SECS") {
            let secs: u64 = parse_number("ASTRA_DB_TIMEOUT_SECS", &timeout)?;
            config.timeout_ms = secs.saturating_mul(1000);
        }

        config.validate()?;
        Ok(config)
    }

    /// Create configuration with explicit values and default collections
    pub fn new(api_endpoint: impl Into<String>, application_token: impl Into<String>) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            application_token: application_token.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            collections: DEFAULT_COLLECTIONS.iter().map(|c| c.to_string()).collect(),
            top_k: DEFAULT_TOP_K,
            timeout_ms: 10_000,
        }
    }

    pub fn with_collections<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections = collections.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reject settings that would make every query fail
    pub fn validate(&self) -> Result<()> {
        if self.collections.is_empty() {
            return Err(Error::Configuration("no collections configured".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(Error::Configuration("timeout must be at least one millisecond".to_string()));
        }
        if self.top_k == 0 {
            return Err(Error::Configuration("top_k must be positive".to_string()));
        }
        Ok(())
    }

    /// Build and validate the registry of configured collections
    pub fn registry(&self) -> Result<CollectionRegistry> {
        self.validate()?;

        let descriptors = self
            .collections
            .iter()
            .map(|c| CollectionDescriptor::new(c.as_str(), &self.api_endpoint, self.application_token.as_str()))
            .collect::<Result<Vec<_>>>()?;

        CollectionRegistry::from_descriptors(descriptors)
    }
}

impl fmt::Debug for AstraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AstraConfig")
            .field("api_endpoint", &self.api_endpoint)
            .field("application_token", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("collections", &self.collections)
            .field("top_k", &self.top_k)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Configuration(format!("{} must be a non-negative integer, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_endpoint_is_a_configuration_error() {
        let err = AstraConfig::from_lookup(lookup(&[("ASTRA_DB_APPLICATION_TOKEN", "t")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("ASTRA_DB_API_ENDPOINT")));
    }

    #[test]
    fn test_missing_token_is_a_configuration_error() {
        let err = AstraConfig::from_lookup(lookup(&[("ASTRA_DB_API_ENDPOINT", "https://db.example.com")]))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("ASTRA_DB_APPLICATION_TOKEN")));
    }

    #[test]
    fn test_defaults_cover_astronomy_collections() {
        let config = AstraConfig::from_lookup(lookup(&[
            ("ASTRA_DB_API_ENDPOINT", "https://db.example.com"),
            ("ASTRA_DB_APPLICATION_TOKEN", "AstraCS:token"),
        ]))
        .unwrap();

        assert_eq!(config.namespace, "default");
        assert_eq!(config.top_k, 5);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.registry().unwrap().identifiers(), DEFAULT_COLLECTIONS.to_vec());
    }

    #[test]
    fn test_overrides_from_variables() {
        let config = AstraConfig::from_lookup(lookup(&[
            ("ASTRA_DB_API_ENDPOINT", "https://db.example.com"),
            ("ASTRA_DB_APPLICATION_TOKEN", "AstraCS:token"),
            ("ASTRA_DB_NAMESPACE", "astronomy"),
            ("ASTRA_DB_COLLECTIONS", " skysafari, ,YouTube "),
            ("ASTRA_DB_TOP_K", "3"),
            ("ASTRA_DB_TIMEOUT_SECS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.namespace, "astronomy");
        assert_eq!(config.collections, vec!["skysafari", "YouTube"]);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let err = AstraConfig::from_lookup(lookup(&[
            ("ASTRA_DB_API_ENDPOINT", "https://db.example.com"),
            ("ASTRA_DB_APPLICATION_TOKEN", "AstraCS:token"),
            ("ASTRA_DB_TOP_K", "five"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_registry_validates_endpoint_up_front() {
        let err = AstraConfig::new("db.example.com", "token").registry().unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor(_)));
    }

    #[test]
    fn test_registry_rejects_duplicate_collections() {
        let err = AstraConfig::new("https://db.example.com", "token")
            .with_collections(["skysafari", "skysafari"])
            .registry()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateCollection(_)));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = AstraConfig::new("https://db.example.com", "AstraCS:very-secret");
        assert!(!format!("{:?}", config).contains("very-secret"));
    }

    #[test]
    fn test_sub_second_timeout_is_kept() {
        let config = AstraConfig::new("https://db.example.com", "token")
            .with_timeout(Duration::from_millis(500));
        assert_eq!(config.timeout(), Duration::from_millis(500));

        let config = config.with_timeout(Duration::from_millis(1500));
        assert_eq!(config.timeout(), Duration::from_millis(1500));
        assert!(config.registry().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = AstraConfig::from_lookup(lookup(&[
            ("ASTRA_DB_API_ENDPOINT", "https://db.example.com"),
            ("ASTRA_DB_APPLICATION_TOKEN", "AstraCS:token"),
            ("ASTRA_DB_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("timeout")));

        let err = AstraConfig::new("https://db.example.com", "token")
            .with_timeout(Duration::from_micros(200))
            .registry()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_empty_collection_list_is_rejected() {
        let err = AstraConfig::from_lookup(lookup(&[
            ("ASTRA_DB_API_ENDPOINT", "https://db.example.com"),
            ("ASTRA_DB_APPLICATION_TOKEN", "AstraCS:token"),
            ("ASTRA_DB_COLLECTIONS", " , "),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("collections")));
    }
}
