//! # Leadership Reference
//!
//! Single-assignment slot through which the elected participant is handed
//! to modules. Modules receive the slot itself at wiring time because, with
//! delegated election, nothing has been decided yet.
//!
//! ## States
//!
//! ```text
//! Unset ──publish()──→ Set(participant)     (at most once, never reverts)
//! ```
//!
//! Reads are cheap snapshots from any thread. `Unset` is a valid,
//! non-final observation: callers re-check later instead of caching it.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::participant::LeadershipParticipant;

/// Returned when a participant has already been published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("leadership participant already published")]
pub struct AlreadyPublished;

type Slot = Option<Arc<dyn LeadershipParticipant>>;

/// Shared single-assignment cell holding the leadership participant.
///
/// Cloning shares the slot.
#[derive(Clone)]
pub struct LeadershipRef {
    slot: Arc<watch::Sender<Slot>>,
}

impl LeadershipRef {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { slot: Arc::new(tx) }
    }

    /// Current participant, or `None` while leadership is undecided.
    pub fn get(&self) -> Option<Arc<dyn LeadershipParticipant>> {
        self.slot.borrow().clone()
    }

    pub fn is_set(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Atomically publish `participant` if the slot is still unset.
    ///
    /// A second call leaves the first value in place.
    pub fn publish(&self, participant: Arc<dyn LeadershipParticipant>) -> Result<(), AlreadyPublished> {
        let published = self.slot.send_if_modified(move |slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(participant);
            true
        });
        if published {
            Ok(())
        } else {
            Err(AlreadyPublished)
        }
    }

    /// Resolve once a participant has been published.
    pub async fn wait(&self) -> Arc<dyn LeadershipParticipant> {
        let mut rx = self.slot.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(participant) = current {
                return participant;
            }
            // The sender is owned by `self`, so it outlives this future.
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }

    /// True when both handles share the same slot.
    pub fn same_slot(&self, other: &LeadershipRef) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl Default for LeadershipRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LeadershipRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(participant) => f.debug_tuple("LeadershipRef::Set").field(&participant).finish(),
            None => f.write_str("LeadershipRef::Unset"),
        }
    }
}

/// Capability: a module that wants to know about leadership.
///
/// Receives the slot, not its value; the slot may still be unset.
pub trait LeadershipConsumer {
    fn accept_leadership_ref(&mut self, leadership: LeadershipRef);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::LocalLeader;
    use std::time::Duration;

    #[test]
    fn test_starts_unset() {
        let leadership = LeadershipRef::new();
        assert!(!leadership.is_set());
        assert!(leadership.get().is_none());
        assert_eq!(format!("{leadership:?}"), "LeadershipRef::Unset");
    }

    #[test]
    fn test_publish_once() {
        let leadership = LeadershipRef::new();
        let first: Arc<dyn LeadershipParticipant> = Arc::new(LocalLeader::new());
        let second: Arc<dyn LeadershipParticipant> = Arc::new(LocalLeader::new());

        assert!(leadership.publish(Arc::clone(&first)).is_ok());
        assert_eq!(leadership.publish(Arc::clone(&second)), Err(AlreadyPublished));

        let current = leadership.get().unwrap();
        assert!(Arc::ptr_eq(&current, &first));
    }

    #[test]
    fn test_clones_share_slot() {
        let leadership = LeadershipRef::new();
        let handed_out = leadership.clone();
        assert!(leadership.same_slot(&handed_out));

        leadership.publish(Arc::new(LocalLeader::new())).unwrap();
        assert!(handed_out.is_set());
    }

    #[test]
    fn test_concurrent_publish_single_winner() {
        let leadership = LeadershipRef::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let leadership = leadership.clone();
                std::thread::spawn(move || leadership.publish(Arc::new(LocalLeader::new())).is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_wait_resolves_after_publish() {
        let leadership = LeadershipRef::new();
        let waiter = {
            let leadership = leadership.clone();
            tokio::spawn(async move { leadership.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        leadership.publish(Arc::new(LocalLeader::new())).unwrap();
        let participant = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait should resolve")
            .unwrap();
        assert!(participant.is_leader());
    }
}
