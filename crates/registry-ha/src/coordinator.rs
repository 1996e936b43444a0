//! # Leadership Coordinator
//!
//! Chooses, once per process, how leadership is decided:
//!
//! ```text
//! NoHa ──(no haConfig)──────────────→ LeaderLocal                  (synchronous)
//! NoHa ──(haConfig)──→ AwaitingServerLive ──server live──→ Participating
//!                                          └─(any failure)─→ Failed (fatal)
//! ```
//!
//! The delegated branch runs on whatever context the routing layer fires
//! its liveness signal from, possibly long after every module was wired.
//! Only the first signal is acted upon.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use registry_telemetry::metrics::{BOOTSTRAP_FAILURES, LEADERSHIP_PUBLISHED};
use registry_types::{
    BootstrapError, FactoryRegistry, FatalReporter, HaConfig, ResourceRouter,
    ServerLifecycleListener,
};
use tracing::{debug, error, info, warn};

use crate::participant::{LeadershipParticipant, LocalLeader};
use crate::reference::LeadershipRef;

/// Coordinator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Not started yet.
    NoHa,
    /// No HA configured; the local always-leader was published.
    LeaderLocal,
    /// Delegated election configured; waiting for the routing layer.
    AwaitingServerLive,
    /// The configured participant is published and participating.
    Participating,
    /// Delegated election failed; the process must terminate.
    Failed,
}

/// Drives the leadership participant's lifecycle.
pub struct LeadershipCoordinator {
    ha_config: Option<HaConfig>,
    participants: Arc<FactoryRegistry<dyn LeadershipParticipant>>,
    leadership: LeadershipRef,
    fatal: FatalReporter,
    state: RwLock<CoordinatorState>,
    /// Set by the first liveness signal.
    triggered: AtomicBool,
}

impl LeadershipCoordinator {
    pub fn new(
        ha_config: Option<HaConfig>,
        participants: Arc<FactoryRegistry<dyn LeadershipParticipant>>,
        leadership: LeadershipRef,
        fatal: FatalReporter,
    ) -> Arc<Self> {
        Arc::new(Self {
            ha_config,
            participants,
            leadership,
            fatal,
            state: RwLock::new(CoordinatorState::NoHa),
            triggered: AtomicBool::new(false),
        })
    }

    pub fn state(&self) -> CoordinatorState {
        *self.state.read()
    }

    pub fn leadership(&self) -> LeadershipRef {
        self.leadership.clone()
    }

    pub fn is_delegated(&self) -> bool {
        self.ha_config.is_some()
    }

    /// Select a strategy. Must run before any module is wired.
    ///
    /// Without HA this publishes the local leader before returning. With HA
    /// it only subscribes to the routing layer's liveness signal.
    pub fn start(self: &Arc<Self>, router: &dyn ResourceRouter) -> Result<(), BootstrapError> {
        // Check and transition under one guard so only one caller selects.
        let mut state = self.state.write();
        if *state != CoordinatorState::NoHa {
            warn!(state = ?*state, "Leadership coordinator already started");
            return Ok(());
        }

        match &self.ha_config {
            None => {
                let leader: Arc<dyn LeadershipParticipant> = Arc::new(LocalLeader::new());
                self.leadership.publish(leader).map_err(|_| {
                    BootstrapError::Configuration(
                        "leadership reference was published before the coordinator started"
                            .to_string(),
                    )
                })?;
                LEADERSHIP_PUBLISHED.set(1.0);
                *state = CoordinatorState::LeaderLocal;
                info!(leadership = ?self.leadership, "No HA configuration exists, using local leader");
            }
            Some(ha) => {
                router.add_lifecycle_listener(Arc::new(ServerStartedHook {
                    coordinator: Arc::clone(self),
                }));
                *state = CoordinatorState::AwaitingServerLive;
                info!(
                    implementation_id = %ha.implementation_id,
                    "HA configured, leader election deferred until the server is live"
                );
            }
        }
        Ok(())
    }

    /// Handle the routing layer's liveness signal.
    ///
    /// Idempotent: repeated signals neither re-publish nor re-participate.
    pub async fn on_server_started(&self, server_url: &str) -> Result<(), BootstrapError> {
        let Some(ha) = &self.ha_config else {
            debug!(server_url, "Server started without HA, nothing to do");
            return Ok(());
        };

        if self
            .triggered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!(server_url, "Leader election already triggered, ignoring repeated signal");
            return Ok(());
        }

        info!(server_url, ha_config = ?ha, "Received callback as server is started");

        match self.elect(ha, server_url).await {
            Ok(()) => {
                *self.state.write() = CoordinatorState::Participating;
                Ok(())
            }
            Err(err) => {
                *self.state.write() = CoordinatorState::Failed;
                BOOTSTRAP_FAILURES.with_label_values(&[err.kind()]).inc();
                Err(err)
            }
        }
    }

    async fn elect(&self, ha: &HaConfig, server_url: &str) -> Result<(), BootstrapError> {
        let mut participant = self.participants.create(&ha.implementation_id)?;
        participant
            .init(&ha.config, server_url)
            .await
            .map_err(|source| {
                BootstrapError::initialization(
                    format!("leadership participant '{}'", ha.implementation_id),
                    source,
                )
            })?;

        let participant: Arc<dyn LeadershipParticipant> = Arc::from(participant);
        self.leadership
            .publish(Arc::clone(&participant))
            .map_err(|_| {
                BootstrapError::Configuration(
                    "leadership reference was published outside the coordinator".to_string(),
                )
            })?;
        LEADERSHIP_PUBLISHED.set(1.0);

        info!(participant = ?participant, "Registering for leadership");
        participant
            .participate_for_leadership()
            .await
            .map_err(|source| {
                error!(server_url, error = %source, "Error occurred while participating for leadership");
                BootstrapError::Participation {
                    server_url: server_url.to_string(),
                    source,
                }
            })?;
        info!(participant = ?participant, "Registered for leadership");
        Ok(())
    }

    /// Leave the election and release the participant. Errors are logged.
    pub async fn shutdown(&self) {
        let Some(participant) = self.leadership.get() else {
            debug!("No leadership participant to shut down");
            return;
        };
        if self.state() == CoordinatorState::Participating {
            if let Err(e) = participant.exit_from_leadership().await {
                warn!(error = %e, "Failed to exit leadership participation");
            }
        }
        if let Err(e) = participant.close().await {
            warn!(error = %e, "Failed to close leadership participant");
        }
        info!(participant = ?participant, "Leadership participant shut down");
    }
}

/// Liveness listener registered with the routing layer.
struct ServerStartedHook {
    coordinator: Arc<LeadershipCoordinator>,
}

#[async_trait]
impl ServerLifecycleListener for ServerStartedHook {
    async fn server_started(&self, server_url: &str) {
        if let Err(err) = self.coordinator.on_server_started(server_url).await {
            // Undecided leadership with HA configured is not a valid state.
            self.coordinator.fatal.report(err);
        }
    }
}
