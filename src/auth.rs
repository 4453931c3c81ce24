use async_trait::async_trait;
use reqwest::{StatusCode, Url, cookie::Jar};
use serde::Deserialize;
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use thiserror::Error;

use crate::{
    config::{AppConfig, ConfigError},
    models::Role,
};

// 1. SessionProbe Contract
/// SessionProbe
///
/// Verifies the caller's session against the backend and reports the role.
///
/// A probe always resolves: authentication failure is a normal outcome meaning
/// "treat the caller as anonymous" and comes back as `Role::None`, never as an
/// error. Probes do not retry; every navigation that needs verification asks
/// for a fresh one.
#[async_trait]
pub trait SessionProbe: Send + Sync {
    async fn probe(&self) -> Role;
}

/// ProbeState
///
/// The shared handle the gateway holds on its probe.
pub type ProbeState = Arc<dyn SessionProbe>;

/// ProbeError
///
/// Why a probe fell back to `Role::None`. Only ever logged.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("auth-check request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("auth-check answered {0}")]
    Status(StatusCode),
    #[error("auth-check body is malformed: {0}")]
    Body(#[from] serde_json::Error),
    #[error("auth-check returned unknown role identifier {0}")]
    UnknownRole(i64),
}

/// AuthCheckResponse
///
/// The success body of the auth-check endpoint. Extra fields are ignored.
#[derive(Debug, Deserialize)]
pub struct AuthCheckResponse {
    #[serde(alias = "roleId")]
    pub role_id: i64,
}

// 2. The Real Implementation (HTTP)
/// HttpSessionProbe
///
/// Issues one `GET` to the auth-check endpoint per probe. The client carries a
/// cookie jar, so session cookies set by the backend (or seeded from the
/// configuration) are sent with every request.
#[derive(Clone)]
pub struct HttpSessionProbe {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSessionProbe {
    /// new
    ///
    /// Builds the client from `AppConfig`: endpoint, optional timeout and an
    /// optional seeded session cookie.
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        let endpoint = config.auth_check_url()?;

        let jar = Arc::new(Jar::default());
        if let Some(cookie) = &config.session_cookie {
            jar.add_cookie_str(cookie, &endpoint);
        }

        let mut builder = reqwest::Client::builder().cookie_provider(jar);
        if let Some(timeout) = config.probe_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ConfigError::HttpClient)?;

        Ok(Self { client, endpoint })
    }

    /// Wraps an already configured client.
    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn fetch_role(&self) -> Result<Role, ProbeError> {
        let response = self.client.get(self.endpoint.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status));
        }

        let body = response.bytes().await?;
        let payload: AuthCheckResponse = serde_json::from_slice(&body)?;

        Role::from_role_id(payload.role_id).ok_or(ProbeError::UnknownRole(payload.role_id))
    }
}

#[async_trait]
impl SessionProbe for HttpSessionProbe {
    async fn probe(&self) -> Role {
        match self.fetch_role().await {
            Ok(role) => {
                tracing::debug!(?role, endpoint = %self.endpoint, "session probe resolved");
                role
            }
            Err(err) => {
                tracing::warn!(error = %err, endpoint = %self.endpoint, "session probe failed, treating caller as anonymous");
                Role::None
            }
        }
    }
}

// 3. The Mock Implementation (For Tests)
/// MockSessionProbe
///
/// An in-memory probe answering from a script of `(role, delay)` steps, then
/// from a fallback role once the script runs out. The delay lets tests make
/// an early probe resolve after a later one.
pub struct MockSessionProbe {
    script: Mutex<VecDeque<(Role, Duration)>>,
    fallback: Role,
    calls: AtomicUsize,
}

impl MockSessionProbe {
    /// Always answers `role`, immediately.
    pub fn new(role: Role) -> Self {
        Self::scripted(role, [])
    }

    /// Answers each step in order, then `fallback` immediately.
    pub fn scripted(fallback: Role, steps: impl IntoIterator<Item = (Role, Duration)>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of probes issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProbe for MockSessionProbe {
    async fn probe(&self) -> Role {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let step = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let (role, delay) = step.unwrap_or((self.fallback, Duration::ZERO));

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        role
    }
}
