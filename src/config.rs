//! Configuration for the dashboard client

use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Origin the dashboard is served from when `SITE_URL` is not set
pub const DEFAULT_SITE_URL: &str = "http://localhost:5173";

/// Project coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Base URL of the hosted project, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public anonymous key
    pub anon_key: String,
    /// Origin used to build links in emails (password reset)
    pub site_url: String,
}

impl DashboardConfig {
    /// Validate and build a config
    pub fn new(url: &str, anon_key: &str) -> Result<Self> {
        let parsed = Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "project URL must be http or https, got {}",
                parsed.scheme()
            )));
        }
        if anon_key.trim().is_empty() {
            return Err(Error::config("anon key cannot be empty"));
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
        })
    }

    pub fn with_site_url(mut self, site_url: &str) -> Self {
        self.site_url = site_url.trim_end_matches('/').to_string();
        self
    }

    /// Read `SUPABASE_URL` and `SUPABASE_ANON_KEY` (or their `VITE_`
    /// prefixed forms) and the optional `SITE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            let set = |key: &str| lookup(key).filter(|value| !value.is_empty());
            set(name).or_else(|| set(&format!("VITE_{}", name)))
        };

        let url = read("SUPABASE_URL")
            .ok_or_else(|| Error::config("SUPABASE_URL environment variable not set"))?;
        let anon_key = read("SUPABASE_ANON_KEY")
            .ok_or_else(|| Error::config("SUPABASE_ANON_KEY environment variable not set"))?;

        let config = Self::new(&url, &anon_key)?;
        Ok(match lookup("SITE_URL") {
            Some(site_url) if !site_url.is_empty() => config.with_site_url(&site_url),
            _ => config,
        })
    }
}

/// Shortest period accepted for repeating timers
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Tuning knobs for the dashboard client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Keep the session returned by sign in
    pub persist_session: bool,

    /// HTTP request timeout
    pub request_timeout: Option<Duration>,

    /// Database schema queried through PostgREST
    pub db_schema: String,

    /// Delay before the first realtime connectivity check
    pub realtime_initial_check: Duration,

    /// Period of the realtime connectivity check
    pub realtime_check_interval: Duration,

    /// Websocket heartbeat period
    pub heartbeat_interval: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            persist_session: true,
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
            realtime_initial_check: Duration::from_secs(2),
            realtime_check_interval: Duration::from_secs(5),
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

impl ClientOptions {
    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set the realtime connectivity check schedule. A zero interval is
    /// raised to [`MIN_PERIOD`].
    pub fn with_realtime_checks(mut self, initial: Duration, interval: Duration) -> Self {
        self.realtime_initial_check = initial;
        self.realtime_check_interval = interval.max(MIN_PERIOD);
        self
    }

    /// Set the websocket heartbeat period, at least [`MIN_PERIOD`]
    pub fn with_heartbeat_interval(mut self, value: Duration) -> Self {
        self.heartbeat_interval = value.max(MIN_PERIOD);
        self
    }
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
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_new_validates() {
        assert!(DashboardConfig::new("not a url", "key").is_err());
        assert!(DashboardConfig::new("ftp://example.com", "key").is_err());
        assert!(matches!(
            DashboardConfig::new("https://abc.supabase.co", "  "),
            Err(Error::Config(_))
        ));

        let config = DashboardConfig::new("https://abc.supabase.co/", "key").unwrap();
        assert_eq!(config.url, "https://abc.supabase.co");
        assert_eq!(config.site_url, DEFAULT_SITE_URL);
    }

    #[test]
    fn test_env_prefers_plain_names() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://plain.supabase.co"),
            ("VITE_SUPABASE_URL", "https://vite.supabase.co"),
            ("VITE_SUPABASE_ANON_KEY", "vite-key"),
            ("SITE_URL", "https://admin.example.com/"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://plain.supabase.co");
        assert_eq!(config.anon_key, "vite-key");
        assert_eq!(config.site_url, "https://admin.example.com");
    }

    #[test]
    fn test_env_empty_plain_name_falls_back() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", ""),
            ("VITE_SUPABASE_URL", "https://vite.supabase.co"),
            ("SUPABASE_ANON_KEY", ""),
            ("VITE_SUPABASE_ANON_KEY", "vite-key"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://vite.supabase.co");
        assert_eq!(config.anon_key, "vite-key");
    }

    #[test]
    fn test_env_missing_key() {
        let result = DashboardConfig::from_lookup(lookup(&[(
            "SUPABASE_URL",
            "https://abc.supabase.co",
        )]));
        match result {
            Err(Error::Config(msg)) => assert!(msg.contains("SUPABASE_ANON_KEY")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_options_builder() {
        let options = ClientOptions::default()
            .with_persist_session(false)
            .with_db_schema("admin")
            .with_realtime_checks(Duration::from_millis(10), Duration::from_millis(20));
        assert!(!options.persist_session);
        assert_eq!(options.db_schema, "admin");
        assert_eq!(options.realtime_check_interval, Duration::from_millis(20));
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_periods_are_raised() {
        let options = ClientOptions::default()
            .with_realtime_checks(Duration::ZERO, Duration::ZERO)
            .with_heartbeat_interval(Duration::ZERO);
        assert_eq!(options.realtime_initial_check, Duration::ZERO);
        assert_eq!(options.realtime_check_interval, MIN_PERIOD);
        assert_eq!(options.heartbeat_interval, MIN_PERIOD);
    }
}
