use std::{env, fs, path::PathBuf, time::Duration};

use reqwest::Url;
use thiserror::Error;

use crate::{
    reload::DEFAULT_SPLASH_DELAY,
    routes::{RouteRules, RuleError},
};

const LOCAL_API_URL: &str = "http://localhost:8000";
const DEFAULT_AUTH_CHECK_PATH: &str = "/auth/check";

/// AppConfig
///
/// Holds the gateway's configuration. Loaded once at startup and immutable
/// afterwards; the gateway and the session probe each take what they need from it.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and which variables are mandatory.
    pub env: Env,
    // Base URL of the portal backend API.
    pub api_url: String,
    // Path of the "who am I" endpoint, appended to `api_url`.
    pub auth_check_path: String,
    // How long the splash screen is held after a full page reload.
    pub splash_delay: Duration,
    // Client-side timeout for the session probe. `None` keeps the HTTP client's default.
    pub probe_timeout: Option<Duration>,
    // Cookie header value seeded into the probe's cookie jar (e.g. `session=abc`).
    pub session_cookie: Option<String>,
    // JSON file replacing the canonical route rule table.
    pub route_rules_path: Option<PathBuf>,
}

/// Env
///
/// Defines the runtime context: pretty logs and permissive defaults locally,
/// JSON logs and mandatory backend settings in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// ConfigError
///
/// Failures resolving configuration that depends on more than a variable lookup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read route rules from {path}: {source}")]
    RulesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("route rules are not valid JSON: {0}")]
    RulesFormat(#[from] serde_json::Error),
    #[error("route rules are inconsistent: {0}")]
    RulesConflict(#[from] RuleError),
    #[error("auth-check URL `{url}` is invalid: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("could not build the HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl Default for AppConfig {
    /// Safe, non-panicking values for tests and local scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_url: LOCAL_API_URL.to_string(),
            auth_check_path: DEFAULT_AUTH_CHECK_PATH.to_string(),
            splash_delay: DEFAULT_SPLASH_DELAY,
            probe_timeout: None,
            session_cookie: None,
            route_rules_path: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in `Env::Production` when `PORTAL_API_URL` is missing, so the
    /// gateway never starts probing a guessed backend.
    pub fn load() -> Self {
        let env = env_var();

        let api_url = match env {
            Env::Production => {
                env::var("PORTAL_API_URL").expect("FATAL: PORTAL_API_URL required in prod")
            }
            Env::Local => env::var("PORTAL_API_URL").unwrap_or_else(|_| LOCAL_API_URL.to_string()),
        };

        Self {
            env,
            api_url,
            auth_check_path: env::var("PORTAL_AUTH_CHECK_PATH")
                .unwrap_or_else(|_| DEFAULT_AUTH_CHECK_PATH.to_string()),
            splash_delay: millis_var("PORTAL_SPLASH_DELAY_MS").unwrap_or(DEFAULT_SPLASH_DELAY),
            probe_timeout: millis_var("PORTAL_PROBE_TIMEOUT_MS"),
            session_cookie: env::var("PORTAL_SESSION_COOKIE").ok(),
            route_rules_path: rules_path_var(),
        }
    }

    /// load_offline
    ///
    /// Reads only the environment marker and the rule table location, for
    /// tooling that never talks to the backend. Unlike `load` it does not
    /// require `PORTAL_API_URL` in production.
    pub fn load_offline() -> Self {
        Self {
            env: env_var(),
            route_rules_path: rules_path_var(),
            ..Self::default()
        }
    }

    /// auth_check_url
    ///
    /// The fully-qualified auth-check endpoint.
    pub fn auth_check_url(&self) -> Result<Url, ConfigError> {
        let raw = format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            self.auth_check_path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })
    }

    /// route_rules
    ///
    /// The canonical rule table, or the JSON table at `route_rules_path`.
    /// Either way the returned table has passed `RouteRules::validate`.
    pub fn route_rules(&self) -> Result<RouteRules, ConfigError> {
        match &self.route_rules_path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::RulesFile {
                    path: path.clone(),
                    source,
                })?;
                tracing::info!(path = %path.display(), "loading route rules from file");
                RouteRules::from_json(&raw)
            }
            None => {
                let rules = RouteRules::default();
                rules.validate()?;
                Ok(rules)
            }
        }
    }
}

fn env_var() -> Env {
    match env::var("APP_ENV").as_deref() {
        Ok("production") => Env::Production,
        _ => Env::Local,
    }
}

fn rules_path_var() -> Option<PathBuf> {
    env::var("PORTAL_ROUTE_RULES").ok().map(PathBuf::from)
}

// Unparseable values fall back to the default rather than aborting startup.
fn millis_var(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}
