// Application configuration
// Read from environment variables with documented defaults

use crate::error::{JudgeError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_JDOODLE_URL: &str = "https://api.jdoodle.com/v1/execute";
pub const DEFAULT_EXECUTION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_EXECUTION_CONCURRENCY: usize = 5;
pub const DEFAULT_MODEL_NAME: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1";
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CACHE_CAPACITY: usize = 128;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Settings for the code execution backend and the batch harness.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    pub url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub timeout: Duration,
    pub concurrency: usize,
    pub languages_file: Option<PathBuf>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_JDOODLE_URL.to_string(),
            client_id: None,
            client_secret: None,
            timeout: Duration::from_secs(DEFAULT_EXECUTION_TIMEOUT_SECS),
            concurrency: DEFAULT_EXECUTION_CONCURRENCY,
            languages_file: None,
        }
    }
}

/// Settings for the text generation backend and its cache.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
    pub cache_capacity: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL_NAME.to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub execution: ExecutionConfig,
    pub generation: GenerationConfig,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            execution: ExecutionConfig::default(),
            generation: GenerationConfig::default(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset. Credentials are not required here;
    /// they are checked when a backend call is about to be made.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let concurrency = parse_or(&get, "EXECUTION_CONCURRENCY", DEFAULT_EXECUTION_CONCURRENCY)?;
        if concurrency == 0 {
            return Err(JudgeError::Config(
                "EXECUTION_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        let execution = ExecutionConfig {
            url: get("JDOODLE_URL").unwrap_or_else(|| DEFAULT_JDOODLE_URL.to_string()),
            client_id: get("JD_CLIENT_ID"),
            client_secret: get("JD_CLIENT_SECRET"),
            timeout: Duration::from_secs(parse_or(
                &get,
                "EXECUTION_TIMEOUT_SECS",
                DEFAULT_EXECUTION_TIMEOUT_SECS,
            )?),
            concurrency,
            languages_file: get("LANGUAGES_FILE").map(PathBuf::from),
        };

        let generation = GenerationConfig {
            api_key: get("GEMINI_API_KEY"),
            model: get("MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
            api_base: get("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            timeout: Duration::from_secs(parse_or(
                &get,
                "GEMINI_TIMEOUT",
                DEFAULT_GENERATION_TIMEOUT_SECS,
            )?),
            cache_capacity: parse_or(&get, "GENERATION_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?,
        };

        Ok(Self {
            execution,
            generation,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

fn parse_or<T, F>(get: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| JudgeError::Config(format!("Invalid value for {}: {} ({})", key, raw, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.execution.url, DEFAULT_JDOODLE_URL);
        assert_eq!(config.execution.timeout, Duration::from_secs(30));
        assert_eq!(config.execution.concurrency, 5);
        assert!(config.execution.client_id.is_none());
        assert_eq!(config.generation.model, "gemini-2.5-flash");
        assert_eq!(config.generation.timeout, Duration::from_secs(60));
        assert_eq!(config.generation.cache_capacity, 128);
        assert!(config.generation.api_key.is_none());
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("JD_CLIENT_ID", "id"),
            ("JD_CLIENT_SECRET", "secret"),
            ("EXECUTION_TIMEOUT_SECS", "10"),
            ("EXECUTION_CONCURRENCY", "2"),
            ("GEMINI_API_KEY", "key"),
            ("GENERATION_CACHE_CAPACITY", "4"),
            ("LANGUAGES_FILE", "config/languages.json"),
        ]))
        .unwrap();

        assert_eq!(config.execution.client_id.as_deref(), Some("id"));
        assert_eq!(config.execution.client_secret.as_deref(), Some("secret"));
        assert_eq!(config.execution.timeout, Duration::from_secs(10));
        assert_eq!(config.execution.concurrency, 2);
        assert_eq!(config.generation.api_key.as_deref(), Some("key"));
        assert_eq!(config.generation.cache_capacity, 4);
        assert_eq!(
            config.execution.languages_file,
            Some(PathBuf::from("config/languages.json"))
        );
    }

    #[test]
    fn blank_credentials_count_as_unset() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert!(config.generation.api_key.is_none());
    }

    #[test]
    fn invalid_number_is_config_error() {
        let err = Config::from_lookup(lookup(&[("GEMINI_TIMEOUT", "soon")])).unwrap_err();
        assert!(matches!(err, JudgeError::Config(ref msg) if msg.contains("GEMINI_TIMEOUT")));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = Config::from_lookup(lookup(&[("EXECUTION_CONCURRENCY", "0")])).unwrap_err();
        assert!(matches!(err, JudgeError::Config(_)));
    }
}
