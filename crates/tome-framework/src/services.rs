//! Shared services handed to every handler.
//!
//! Services are keyed by their concrete type. The map is built once when the
//! dispatcher is assembled and shared read-only afterwards.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ServiceNotFound;

type ServiceArc = Arc<dyn Any + Send + Sync>;

/// A type-keyed map of shared services.
#[derive(Default, Clone)]
pub struct ServiceMap {
    entries: HashMap<TypeId, ServiceArc>,
}

impl ServiceMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a service, replacing any previous one of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, service: Arc<T>) {
        self.entries.insert(TypeId::of::<T>(), service);
    }

    /// Adds a service (builder pattern).
    pub fn with<T: Send + Sync + 'static>(mut self, service: Arc<T>) -> Self {
        self.insert(service);
        self
    }

    /// Looks up a service by type.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|arc| arc.downcast::<T>().ok())
    }

    /// Looks up a service by type, failing if it is absent.
    pub fn require<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ServiceNotFound> {
        self.get::<T>().ok_or(ServiceNotFound(type_name::<T>()))
    }

    /// Returns the number of registered services.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no service is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ServiceMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceMap")
            .field("len", &self.entries.len())
            .finish()
    }
}
