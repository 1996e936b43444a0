//! # In-Memory Routing Layer
//!
//! Stand-in for the HTTP routing layer: records registered resources in
//! order and fires lifecycle listeners when told the server is live.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use registry_types::{Resource, ResourceRouter, RoutingError, ServerLifecycleListener};
use tracing::info;

#[derive(Default)]
pub struct InMemoryRouter {
    resources: Mutex<Vec<Resource>>,
    listeners: Mutex<Vec<Arc<dyn ServerLifecycleListener>>>,
    server_url: RwLock<Option<String>>,
}

impl InMemoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the server live and notify every listener.
    ///
    /// Calling this again notifies listeners again.
    pub async fn go_live(&self, server_url: &str) {
        *self.server_url.write() = Some(server_url.to_string());
        let listeners = self.listeners.lock().clone();
        info!(server_url, listeners = listeners.len(), "Routing layer is accepting traffic");
        for listener in listeners {
            listener.server_started(server_url).await;
        }
    }

    pub fn is_live(&self) -> bool {
        self.server_url.read().is_some()
    }

    pub fn server_url(&self) -> Option<String> {
        self.server_url.read().clone()
    }

    /// Registered resources, in registration order.
    pub fn resources(&self) -> Vec<Resource> {
        self.resources.lock().clone()
    }

    pub fn resource_names(&self) -> Vec<String> {
        self.resources
            .lock()
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl ResourceRouter for InMemoryRouter {
    fn register(&self, resource: Resource) -> Result<(), RoutingError> {
        self.resources.lock().push(resource);
        Ok(())
    }

    fn add_lifecycle_listener(&self, listener: Arc<dyn ServerLifecycleListener>) {
        self.listeners.lock().push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    #[async_trait]
    impl ServerLifecycleListener for Counter {
        async fn server_started(&self, _server_url: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_go_live_notifies_each_time() {
        let router = InMemoryRouter::new();
        let counter = Arc::new(Counter::default());
        router.add_lifecycle_listener(counter.clone());
        assert!(!router.is_live());

        router.go_live("http://localhost:9090").await;
        router.go_live("http://localhost:9090").await;

        assert!(router.is_live());
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_register_keeps_order() {
        let router = InMemoryRouter::new();
        router.register(Resource::new("a", 1u8)).unwrap();
        router.register(Resource::new("b", 2u8)).unwrap();
        assert_eq!(router.resource_names(), vec!["a", "b"]);
    }
}
