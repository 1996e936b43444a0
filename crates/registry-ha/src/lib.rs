//! # Registry HA
//!
//! Leadership handling for the registry node.
//!
//! - [`LeadershipParticipant`]: pluggable election participant, resolved by
//!   identifier from `haConfig`.
//! - [`LocalLeader`]: always-leader participant used without HA.
//! - [`LeadershipRef`]: single-assignment slot shared with modules.
//! - [`LeadershipCoordinator`]: selects the strategy and drives the
//!   participant's lifecycle.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod coordinator;
pub mod participant;
pub mod reference;

pub use coordinator::{CoordinatorState, LeadershipCoordinator};
pub use participant::{LeadershipParticipant, LocalLeader, LOCAL_LEADER_ID};
pub use reference::{AlreadyPublished, LeadershipConsumer, LeadershipRef};
