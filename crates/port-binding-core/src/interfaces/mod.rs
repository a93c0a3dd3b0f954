// port-binding-core/src/interfaces/mod.rs
// ============================================================================
// Module: Port Binding Interfaces
// Description: Backend-agnostic interfaces for drivers, policy, and storage.
// Purpose: Define the contract surfaces used by the screening and negotiation runtime.
// Dependencies: crate::core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Port Binding integrates with external systems without
//! embedding backend-specific details. Implementations must be deterministic
//! for unchanged inputs and fail closed on missing or invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::DriverId;
use crate::core::HostId;
use crate::core::PortBindingState;
use crate::core::PortId;
use crate::core::VifDetails;
use crate::core::VifType;
use crate::core::VnicType;
use crate::core::attributes::Operation;
use crate::core::identifiers::AttributeName;

// ============================================================================
// SECTION: Binding Drivers
// ============================================================================

/// Inputs a driver receives when asked to bind a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRequest {
    /// Port being bound.
    pub port_id: PortId,
    /// Requested vNIC type.
    pub vnic_type: VnicType,
    /// Host the port should be bound on, when known.
    pub host_id: Option<HostId>,
    /// Validated caller-supplied driver profile.
    pub profile: BTreeMap<String, Value>,
}

impl BindingRequest {
    /// Builds a request from the current binding state of a port.
    #[must_use]
    pub fn from_state(state: &PortBindingState) -> Self {
        Self {
            port_id: state.port_id.clone(),
            vnic_type: state.vnic_type,
            host_id: state.host_id.clone(),
            profile: state.profile.clone(),
        }
    }
}

/// Concrete binding produced by a driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindOutcome {
    /// VIF type the driver declares for the port.
    pub vif_type: VifType,
    /// VIF details the driver populates for the port.
    pub vif_details: VifDetails,
}

/// Driver-level binding errors.
///
/// Errors at this layer are never retried against the same driver; the
/// negotiator records the failure and consults the next candidate.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Driver reported a binding failure.
    #[error("driver bind error: {0}")]
    Bind(String),
    /// Driver did not complete within its deadline.
    #[error("driver bind timed out after {timeout_ms} ms")]
    Timeout {
        /// Deadline the call exceeded, in milliseconds.
        timeout_ms: u64,
    },
}

/// Backend-agnostic binding driver.
pub trait BindingDriver {
    /// Returns true when the driver can serve the request.
    ///
    /// Must be cheap and side-effect free; `supports` is consulted for every
    /// candidate on every negotiation attempt.
    fn supports(&self, request: &BindingRequest) -> bool;

    /// Produces a concrete binding for the request.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when the driver cannot bind the port.
    fn bind(&self, request: &BindingRequest) -> Result<BindOutcome, DriverError>;
}

// ============================================================================
// SECTION: Driver Catalog
// ============================================================================

/// One driver candidate yielded by a catalog.
#[derive(Clone, Copy)]
pub struct DriverCandidate<'a> {
    /// Driver identifier.
    pub driver_id: &'a DriverId,
    /// Driver implementation.
    pub driver: &'a dyn BindingDriver,
}

/// Ordered source of driver candidates for negotiation.
///
/// The order is a total order fixed at registration time; repeated calls with
/// an unchanged registry must yield the same sequence.
pub trait DriverCatalog {
    /// Returns driver candidates in negotiation order.
    fn candidates(&self) -> Vec<DriverCandidate<'_>>;
}

// ============================================================================
// SECTION: Policy Decider
// ============================================================================

/// Attribute policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Permit the access.
    Permit,
    /// Deny the access.
    Deny,
}

/// Policy decision errors.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Policy engine reported an error.
    #[error("policy decision error: {0}")]
    DecisionFailed(String),
}

/// External policy hook consulted for policy-gated attributes.
///
/// The mutability gate fails closed: a decision error on a policy-gated
/// attribute denies the access.
pub trait PolicyDecider {
    /// Decides whether the caller may access the attribute for the operation.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when policy evaluation fails.
    fn authorize(
        &self,
        caller: &str,
        attribute: &AttributeName,
        operation: Operation,
    ) -> Result<PolicyDecision, PolicyError>;
}

// ============================================================================
// SECTION: Binding State Store
// ============================================================================

/// Binding state store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No binding state exists for the port.
    #[error("unknown port: {0}")]
    NotFound(String),
    /// Store reported an error.
    #[error("binding state store error: {0}")]
    Store(String),
}

/// Binding state store with single-writer-per-port update semantics.
pub trait BindingStateStore {
    /// Loads the binding state for a port.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, port_id: &PortId) -> Result<Option<PortBindingState>, StoreError>;

    /// Saves binding state, creating the port entry if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails.
    fn save(&self, state: &PortBindingState) -> Result<(), StoreError>;

    /// Applies a closure to a port's state under that port's exclusive lock.
    ///
    /// Concurrent updates for the same port serialize; updates for different
    /// ports proceed in parallel. Returns the post-update snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the port has no state.
    fn update(
        &self,
        port_id: &PortId,
        apply: &mut dyn FnMut(&mut PortBindingState),
    ) -> Result<PortBindingState, StoreError>;
}
