//! # Fatal Error Channel
//!
//! Some fatal failures happen after bootstrap has returned, on an execution
//! context owned by the routing layer (delegated leader election). They are
//! reported here and the process owner terminates on the first one.

use tokio::sync::mpsc;
use tracing::error;

use crate::errors::BootstrapError;

/// Create a connected reporter/receiver pair.
pub fn fatal_channel() -> (FatalReporter, FatalReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FatalReporter { tx }, FatalReceiver { rx })
}

/// Cloneable sending half, handed to background contexts.
#[derive(Clone, Debug)]
pub struct FatalReporter {
    tx: mpsc::UnboundedSender<BootstrapError>,
}

impl FatalReporter {
    pub fn report(&self, err: BootstrapError) {
        error!(kind = err.kind(), error = %err, "Fatal error reported");
        if self.tx.send(err).is_err() {
            // Nobody is left to terminate the process on our behalf.
            error!("Fatal error receiver dropped; aborting process");
            std::process::abort();
        }
    }
}

/// Receiving half, owned by whoever controls process exit.
#[derive(Debug)]
pub struct FatalReceiver {
    rx: mpsc::UnboundedReceiver<BootstrapError>,
}

impl FatalReceiver {
    /// Wait for the next fatal error. `None` once every reporter is gone.
    pub async fn recv(&mut self) -> Option<BootstrapError> {
        self.rx.recv().await
    }

    /// Non-blocking check, mostly for tests.
    pub fn try_recv(&mut self) -> Option<BootstrapError> {
        self.rx.try_recv().ok()
    }
}
