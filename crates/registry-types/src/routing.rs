//! # Routing Layer Contracts
//!
//! The request-routing layer is external. The bootstrap only needs to hand
//! it resources and to hear when it starts accepting traffic.

use std::sync::Arc;

use async_trait::async_trait;

use crate::resource::Resource;

/// Callback fired when the routing layer is live.
///
/// The routing layer may fire this more than once; listeners must be
/// idempotent.
#[async_trait]
pub trait ServerLifecycleListener: Send + Sync {
    async fn server_started(&self, server_url: &str);
}

/// Request-routing layer as seen by the bootstrap.
pub trait ResourceRouter: Send + Sync {
    /// Register one resource. Ownership moves to the routing layer.
    fn register(&self, resource: Resource) -> Result<(), RoutingError>;

    /// Subscribe to the "now accepting traffic" notification.
    fn add_lifecycle_listener(&self, listener: Arc<dyn ServerLifecycleListener>);
}

/// The routing layer refused a resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RoutingError(pub String);
