// port-binding-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Binding Store
// Description: Per-port locked in-memory binding state store.
// Purpose: Provide the single-writer-per-port discipline without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`BindingStateStore`].
//! Each port's state sits behind its own mutex: updates for one port
//! serialize, updates for different ports run in parallel, and the outer map
//! lock is never held across an update closure (driver bind calls may block).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::PortBindingState;
use crate::core::PortId;
use crate::interfaces::BindingStateStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory binding state store with per-port locking.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBindingStore {
    /// Per-port state cells behind the port index lock.
    ports: Arc<Mutex<BTreeMap<PortId, Arc<Mutex<PortBindingState>>>>>,
}

impl InMemoryBindingStore {
    /// Creates a new in-memory binding store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ports: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Fetches the state cell for a port, if present.
    fn cell(&self, port_id: &PortId) -> Result<Option<Arc<Mutex<PortBindingState>>>, StoreError> {
        let guard = self
            .ports
            .lock()
            .map_err(|_| StoreError::Store("port index mutex poisoned".to_string()))?;
        Ok(guard.get(port_id).cloned())
    }
}

impl BindingStateStore for InMemoryBindingStore {
    fn load(&self, port_id: &PortId) -> Result<Option<PortBindingState>, StoreError> {
        let Some(cell) = self.cell(port_id)? else {
            return Ok(None);
        };
        let state = cell
            .lock()
            .map_err(|_| StoreError::Store("port state mutex poisoned".to_string()))?;
        Ok(Some(state.clone()))
    }

    fn save(&self, state: &PortBindingState) -> Result<(), StoreError> {
        let mut guard = self
            .ports
            .lock()
            .map_err(|_| StoreError::Store("port index mutex poisoned".to_string()))?;
        let existing = guard.get(&state.port_id).cloned();
        match existing {
            Some(cell) => {
                drop(guard);
                let mut current = cell
                    .lock()
                    .map_err(|_| StoreError::Store("port state mutex poisoned".to_string()))?;
                *current = state.clone();
            }
            None => {
                guard.insert(state.port_id.clone(), Arc::new(Mutex::new(state.clone())));
            }
        }
        Ok(())
    }

    fn update(
        &self,
        port_id: &PortId,
        apply: &mut dyn FnMut(&mut PortBindingState),
    ) -> Result<PortBindingState, StoreError> {
        let cell = self
            .cell(port_id)?
            .ok_or_else(|| StoreError::NotFound(port_id.to_string()))?;
        let mut state = cell
            .lock()
            .map_err(|_| StoreError::Store("port state mutex poisoned".to_string()))?;
        apply(&mut state);
        Ok(state.clone())
    }
}

// ============================================================================
// SECTION: Shared Store Wrapper
// ============================================================================

/// Shared binding state store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedBindingStore {
    /// Inner store implementation.
    inner: Arc<dyn BindingStateStore + Send + Sync>,
}

impl SharedBindingStore {
    /// Wraps a binding state store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl BindingStateStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn BindingStateStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl BindingStateStore for SharedBindingStore {
    fn load(&self, port_id: &PortId) -> Result<Option<PortBindingState>, StoreError> {
        self.inner.load(port_id)
    }

    fn save(&self, state: &PortBindingState) -> Result<(), StoreError> {
        self.inner.save(state)
    }

    fn update(
        &self,
        port_id: &PortId,
        apply: &mut dyn FnMut(&mut PortBindingState),
    ) -> Result<PortBindingState, StoreError> {
        self.inner.update(port_id, apply)
    }
}
