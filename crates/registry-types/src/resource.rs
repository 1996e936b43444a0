//! Opaque resource handles contributed by modules.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A resource exposed by a module for the routing layer.
///
/// The bootstrap never looks inside; only the routing layer (or a test)
/// downcasts the payload back to its concrete type.
#[derive(Clone)]
pub struct Resource {
    name: String,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Resource {
    pub fn new<T: Any + Send + Sync>(name: impl Into<String>, payload: T) -> Self {
        Self {
            name: name.into(),
            payload: Arc::new(payload),
        }
    }

    /// Wrap an already shared payload.
    pub fn from_arc<T: Any + Send + Sync>(name: impl Into<String>, payload: Arc<T>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Endpoint(u16);

    #[test]
    fn test_downcast() {
        let resource = Resource::new("endpoint", Endpoint(8080));
        assert_eq!(resource.name(), "endpoint");
        assert_eq!(resource.downcast_ref::<Endpoint>().map(|e| e.0), Some(8080));
        assert!(resource.downcast_ref::<String>().is_none());
    }
}
