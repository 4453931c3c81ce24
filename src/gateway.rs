use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{
    sync::{broadcast, mpsc, watch},
    task::{JoinHandle, JoinSet},
};

use crate::{
    auth::ProbeState,
    config::{AppConfig, ConfigError},
    layout,
    models::{Category, Decision, NavigationEvent, Phase, Role},
    routes::RouteRules,
};

/// SessionState
///
/// What the gateway knows about the current tab's session.
///
/// * `role` starts as `Role::None` (unknown, not denied) and keeps its last
///   verified value across navigations.
/// * `checked` is true once the probe for the current path has resolved, or
///   immediately for a public path.
/// * `epoch` increases by one for every probe issued. A probe result is only
///   applied if the epoch it was issued under is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub role: Role,
    pub checked: bool,
    pub epoch: u64,
}

struct Inner {
    session: SessionState,
    // Bumped on every navigation, public ones included. A probe that outlives
    // its navigation may still record the role, but emits nothing.
    navigation: u64,
}

enum Started {
    Decided(Decision),
    Probing(PendingProbe),
}

// A protected navigation waiting on its probe, with the counters it was issued under.
struct PendingProbe {
    path: String,
    category: Category,
    epoch: u64,
    navigation: u64,
}

// Emitted decisions kept for `subscribe_all` receivers that fall behind.
const DECISION_BUFFER: usize = 64;

/// AuthorizationGateway
///
/// Turns navigation events into layout decisions. It is the only writer of
/// `SessionState`; everyone else observes the emitted `Decision` snapshots
/// through `subscribe`.
///
/// Per navigation the gateway moves through
/// `Classifying -> (PublicFastPath | Probing) -> Decided`, preceded once at
/// boot by `Splashing` when the page was reloaded. Overlapping navigations are
/// ordered by the probe epoch: the network request of a superseded navigation
/// is left to complete, and its result is dropped.
pub struct AuthorizationGateway {
    rules: RouteRules,
    probe: ProbeState,
    splash_delay: Duration,
    inner: Mutex<Inner>,
    booted: AtomicBool,
    decisions: watch::Sender<Option<Decision>>,
    emitted: broadcast::Sender<Decision>,
}

impl AuthorizationGateway {
    pub fn new(rules: RouteRules, probe: ProbeState, splash_delay: Duration) -> Self {
        let (decisions, _) = watch::channel(None);
        let (emitted, _) = broadcast::channel(DECISION_BUFFER);
        Self {
            rules,
            probe,
            splash_delay,
            inner: Mutex::new(Inner {
                session: SessionState::default(),
                navigation: 0,
            }),
            booted: AtomicBool::new(false),
            decisions,
            emitted,
        }
    }

    /// Builds a gateway with the configured rule table and splash delay.
    pub fn from_config(config: &AppConfig, probe: ProbeState) -> Result<Self, ConfigError> {
        Ok(Self::new(config.route_rules()?, probe, config.splash_delay))
    }

    /// A receiver of the latest emitted decision. `None` until the first
    /// navigation produces one.
    pub fn subscribe(&self) -> watch::Receiver<Option<Decision>> {
        self.decisions.subscribe()
    }

    /// A receiver of every decision emitted from now on, in emission order.
    /// Unlike `subscribe`, back-to-back decisions are not merged.
    pub fn subscribe_all(&self) -> broadcast::Receiver<Decision> {
        self.emitted.subscribe()
    }

    pub fn latest(&self) -> Option<Decision> {
        self.decisions.borrow().clone()
    }

    /// A copy of the session state. Mutating the copy has no effect.
    pub fn session(&self) -> SessionState {
        self.lock().session
    }

    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }

    /// boot
    ///
    /// Handles the application-start event: holds the splash screen if the
    /// page was reloaded, then navigates. The splash gate is only ever armed
    /// by the first call; later calls behave like `navigate`.
    pub async fn boot(&self, event: &NavigationEvent) -> Option<Decision> {
        self.hold_splash(event).await;
        self.navigate(&event.path).await
    }

    /// navigate
    ///
    /// Runs one navigation to completion. Returns the `Decided` decision, or
    /// `None` when a newer navigation superseded this one while its probe was
    /// in flight (nothing is emitted in that case).
    pub async fn navigate(&self, path: &str) -> Option<Decision> {
        let started = self.begin(path);
        self.complete(started).await
    }

    /// Runs a navigation on its own task so navigations can overlap. The
    /// navigation is classified and its probe epoch taken before the task is
    /// spawned, so calls are ordered by when they were made.
    pub fn spawn_navigation(self: &Arc<Self>, path: impl Into<String>) -> JoinHandle<Option<Decision>> {
        let started = self.begin(&path.into());
        let gateway = Arc::clone(self);
        tokio::spawn(async move { gateway.complete(started).await })
    }

    /// run
    ///
    /// Drives the gateway from a stream of navigation events. The boot event's
    /// splash (if any) is held before any queued event is looked at; after
    /// that each event is started in arrival order and its probe awaited on
    /// its own task. Returns once the sender side is dropped and every
    /// in-flight navigation has finished.
    pub async fn run(self: Arc<Self>, boot: NavigationEvent, mut events: mpsc::Receiver<NavigationEvent>) {
        let mut in_flight = JoinSet::new();

        self.hold_splash(&boot).await;
        let started = self.begin(&boot.path);
        let gateway = Arc::clone(&self);
        in_flight.spawn(async move { gateway.complete(started).await });

        while let Some(event) = events.recv().await {
            if event.is_reload {
                tracing::debug!(path = %event.path, "reload flag after boot ignored");
            }
            let started = self.begin(&event.path);
            let gateway = Arc::clone(&self);
            in_flight.spawn(async move { gateway.complete(started).await });

            while let Some(finished) = in_flight.try_join_next() {
                log_join_error(finished);
            }
        }

        while let Some(finished) = in_flight.join_next().await {
            log_join_error(finished);
        }
    }

    // Classifies the path and takes its place in the navigation order. Public
    // paths are decided on the spot; anything else issues a probe epoch.
    fn begin(&self, path: &str) -> Started {
        let category = self.rules.classify(path);
        tracing::debug!(path, ?category, "classified navigation");

        let mut inner = self.lock();
        inner.navigation += 1;

        if category == Category::Public {
            inner.session.checked = true;
            let decision = decide(Phase::Decided, path, category, &inner.session);
            tracing::info!(path, outcome = %decision.outcome, "public navigation, session probe skipped");
            self.publish(&decision);
            return Started::Decided(decision);
        }

        inner.session.epoch += 1;
        inner.session.checked = false;
        self.publish(&decide(Phase::Probing, path, category, &inner.session));
        Started::Probing(PendingProbe {
            path: path.to_string(),
            category,
            epoch: inner.session.epoch,
            navigation: inner.navigation,
        })
    }

    async fn complete(&self, started: Started) -> Option<Decision> {
        let pending = match started {
            Started::Decided(decision) => return Some(decision),
            Started::Probing(pending) => pending,
        };
        let PendingProbe {
            path,
            category,
            epoch,
            navigation,
        } = pending;

        let role = self.probe.probe().await;

        let mut inner = self.lock();
        if inner.session.epoch != epoch {
            tracing::debug!(
                path = %path,
                epoch,
                current_epoch = inner.session.epoch,
                "discarding stale session probe"
            );
            return None;
        }

        inner.session.role = role;
        inner.session.checked = true;

        if inner.navigation != navigation {
            tracing::debug!(path = %path, ?role, "probe outlived its navigation, role recorded without a decision");
            return None;
        }

        let decision = decide(Phase::Decided, &path, category, &inner.session);
        tracing::info!(path = %path, ?category, ?role, epoch, outcome = %decision.outcome, "navigation decided");
        self.publish(&decision);
        Some(decision)
    }

    async fn hold_splash(&self, event: &NavigationEvent) {
        if self.booted.swap(true, Ordering::SeqCst) || !event.is_reload {
            return;
        }

        let category = self.rules.classify(&event.path);
        {
            let inner = self.lock();
            self.publish(&decide(Phase::Splashing, &event.path, category, &inner.session));
        }

        tracing::info!(
            path = %event.path,
            delay_ms = self.splash_delay.as_millis() as u64,
            "page reload detected, holding splash screen"
        );
        tokio::time::sleep(self.splash_delay).await;
    }

    fn publish(&self, decision: &Decision) {
        tracing::debug!(phase = ?decision.phase, outcome = %decision.outcome, "emitting decision");
        self.decisions.send_replace(Some(decision.clone()));
        // No receivers is not an error: the watch view above still holds it.
        let _ = self.emitted.send(decision.clone());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn decide(phase: Phase, path: &str, category: Category, session: &SessionState) -> Decision {
    Decision {
        phase,
        path: path.to_string(),
        category,
        role: session.role,
        checked: session.checked,
        epoch: session.epoch,
        outcome: layout::select(phase, category, session.role, session.checked),
    }
}

fn log_join_error(finished: Result<Option<Decision>, tokio::task::JoinError>) {
    if let Err(err) = finished {
        tracing::warn!(error = %err, "navigation task did not complete");
    }
}
