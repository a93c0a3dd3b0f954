// port-binding-drivers/src/registry.rs
// ============================================================================
// Module: Driver Registry
// Description: Priority-ordered registry of binding drivers.
// Purpose: Fix the driver consultation order at registration time.
// Dependencies: port-binding-core
// ============================================================================

//! ## Overview
//! The driver registry keeps registered binding drivers in a total order:
//! ascending priority, ties broken by registration sequence. It implements
//! the core [`port_binding_core::DriverCatalog`] interface so the negotiator
//! consults candidates in that fixed order on every attempt.

// ============================================================================
// SECTION: Imports
// ============================================================================

use port_binding_core::BindingDriver;
use port_binding_core::DriverCandidate;
use port_binding_core::DriverCatalog;
use port_binding_core::DriverId;

use crate::MacvtapDriver;
use crate::MacvtapDriverConfig;
use crate::OvsDriver;
use crate::OvsDriverConfig;
use crate::SriovDriver;
use crate::SriovDriverConfig;

// ============================================================================
// SECTION: Registrations
// ============================================================================

/// One registered driver with its ordering keys.
struct DriverRegistration {
    /// Driver identifier.
    driver_id: DriverId,
    /// Consultation priority; lower values are consulted first.
    priority: u32,
    /// Registration sequence number, the tiebreaker within a priority.
    seq: u64,
    /// Driver implementation.
    driver: Box<dyn BindingDriver + Send + Sync>,
}

/// Priority-ordered binding driver registry.
#[derive(Default)]
pub struct DriverRegistry {
    /// Registrations kept sorted by (priority, seq).
    entries: Vec<DriverRegistration>,
    /// Next registration sequence number.
    next_seq: u64,
}

impl DriverRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Creates a registry with the built-in drivers registered under their
    /// default configurations: Open vSwitch first, then SR-IOV, then macvtap.
    #[must_use]
    pub fn with_builtin_drivers() -> Self {
        let mut registry = Self::new();
        registry.register("ovs", 10, OvsDriver::new(OvsDriverConfig::default()));
        registry.register("sriov", 20, SriovDriver::new(SriovDriverConfig::default()));
        registry.register("macvtap", 30, MacvtapDriver::new(MacvtapDriverConfig::default()));
        registry
    }

    /// Registers a driver under the given identifier and priority.
    ///
    /// Drivers registered at the same priority keep their registration order.
    pub fn register(
        &mut self,
        driver_id: impl Into<DriverId>,
        priority: u32,
        driver: impl BindingDriver + Send + Sync + 'static,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(DriverRegistration {
            driver_id: driver_id.into(),
            priority,
            seq,
            driver: Box::new(driver),
        });
        self.entries.sort_by_key(|entry| (entry.priority, entry.seq));
    }

    /// Returns the number of registered drivers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no drivers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DriverCatalog for DriverRegistry {
    fn candidates(&self) -> Vec<DriverCandidate<'_>> {
        self.entries
            .iter()
            .map(|entry| DriverCandidate {
                driver_id: &entry.driver_id,
                driver: entry.driver.as_ref(),
            })
            .collect()
    }
}
