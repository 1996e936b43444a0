//! # Leadership Participants
//!
//! A participant represents this process in a single-leader coordination
//! scheme. The election algorithm itself lives behind the trait; the
//! registry only drives its lifecycle.

use std::fmt;

use async_trait::async_trait;
use registry_types::{ComponentError, Settings};

/// Leader identifier reported by [`LocalLeader`].
pub const LOCAL_LEADER_ID: &str = "local";

/// This process's seat in a leader election.
///
/// Lifecycle: constructed by a factory, `init` once, published, then
/// `participate_for_leadership` once. `exit_from_leadership` and `close`
/// run at shutdown.
#[async_trait]
pub trait LeadershipParticipant: fmt::Debug + Send + Sync {
    /// Configure with `haConfig.config` and the URL peers can reach us at.
    async fn init(&mut self, config: &Settings, server_url: &str) -> Result<(), ComponentError>;

    /// Join the election. Fire-and-forget: no timeout is applied.
    async fn participate_for_leadership(&self) -> Result<(), ComponentError>;

    /// Identifier of the current leader, if one is known.
    fn current_leader(&self) -> Option<String>;

    fn is_leader(&self) -> bool;

    /// Give up leadership and stop participating.
    async fn exit_from_leadership(&self) -> Result<(), ComponentError>;

    /// Release any resources held by the participant.
    async fn close(&self) -> Result<(), ComponentError> {
        Ok(())
    }
}

/// Always-leader participant used when no HA configuration exists.
#[derive(Debug, Default)]
pub struct LocalLeader {
    _private: (),
}

impl LocalLeader {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadershipParticipant for LocalLeader {
    async fn init(&mut self, _config: &Settings, _server_url: &str) -> Result<(), ComponentError> {
        Ok(())
    }

    async fn participate_for_leadership(&self) -> Result<(), ComponentError> {
        Ok(())
    }

    fn current_leader(&self) -> Option<String> {
        Some(LOCAL_LEADER_ID.to_string())
    }

    fn is_leader(&self) -> bool {
        true
    }

    async fn exit_from_leadership(&self) -> Result<(), ComponentError> {
        Ok(())
    }
}
