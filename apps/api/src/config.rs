use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_TTL_SECS: u64 = 14 * 24 * 60 * 60;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a base URL is blank.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub upstream: UpstreamConfig,
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

/// Base URLs of the dealer/review and sentiment services.
/// All URLs are stored without trailing slashes.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub backend_url: String,
    pub fallback_urls: Vec<String>,
    pub sentiment_url: String,
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// The primary backend followed by the fallbacks, in walk order.
    pub fn backend_bases(&self) -> Vec<String> {
        std::iter::once(self.backend_url.clone())
            .chain(self.fallback_urls.iter().cloned())
            .collect()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let upstream = UpstreamConfig {
            backend_url: require_base_url("BACKEND_URL", &require("BACKEND_URL")?)?,
            fallback_urls: lookup("BACKEND_FALLBACK_URLS")
                .map(|raw| parse_url_list(&raw))
                .unwrap_or_default(),
            sentiment_url: require_base_url(
                "SENTIMENT_ANALYZER_URL",
                &require("SENTIMENT_ANALYZER_URL")?,
            )?,
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?),
        };

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            redis_url: require("REDIS_URL")?,
            upstream,
            session_ttl_secs: parse_or(&lookup, "SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?,
            port: parse_or(&lookup, "PORT", 8000u16).context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Strips whitespace and trailing slashes from a base URL.
pub fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn require_base_url(key: &str, raw: &str) -> Result<String> {
    let url = normalize_base(raw);
    if url.is_empty() {
        bail!("Environment variable '{key}' must be a non-empty base URL");
    }
    Ok(url)
}

/// Comma-separated list, order preserved, blanks dropped.
fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_base)
        .filter(|url| !url.is_empty())
        .collect()
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        None => Ok(default),
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

    fn base_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("BACKEND_URL", "http://backend:3030/"),
            ("SENTIMENT_ANALYZER_URL", "http://sentiment:5050//"),
            ("DATABASE_URL", "postgres://localhost/dealers"),
            ("REDIS_URL", "redis://localhost"),
        ]
    }

    #[test]
    fn test_base_urls_are_normalized() {
        let config = Config::from_lookup(lookup_from(&base_pairs())).unwrap();
        assert_eq!(config.upstream.backend_url, "http://backend:3030");
        assert_eq!(config.upstream.sentiment_url, "http://sentiment:5050");
        assert!(config.upstream.fallback_urls.is_empty());
        assert_eq!(config.upstream.timeout, Duration::from_secs(10));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_missing_backend_url_fails_fast() {
        let pairs: Vec<_> = base_pairs()
            .into_iter()
            .filter(|(k, _)| *k != "BACKEND_URL")
            .collect();
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("BACKEND_URL"));
    }

    #[test]
    fn test_blank_sentiment_url_is_rejected() {
        let mut pairs = base_pairs();
        pairs[1] = ("SENTIMENT_ANALYZER_URL", " / ");
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("SENTIMENT_ANALYZER_URL"));
    }

    #[test]
    fn test_fallback_list_keeps_order() {
        let mut pairs = base_pairs();
        pairs.push((
            "BACKEND_FALLBACK_URLS",
            "http://host.docker.internal:3030/, ,http://localhost:3030,http://127.0.0.1:3030",
        ));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(
            config.upstream.backend_bases(),
            vec![
                "http://backend:3030",
                "http://host.docker.internal:3030",
                "http://localhost:3030",
                "http://127.0.0.1:3030",
            ]
        );
    }

    #[test]
    fn test_invalid_timeout_is_an_error() {
        let mut pairs = base_pairs();
        pairs.push(("UPSTREAM_TIMEOUT_SECS", "soon"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }
}
