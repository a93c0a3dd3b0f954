// port-binding-core/src/runtime/negotiator.rs
// ============================================================================
// Module: Binding Negotiator
// Description: Driver selection, binding attempts, and transactional state application.
// Purpose: Pick the first capable driver deterministically and record every attempt.
// Dependencies: crate::core, crate::interfaces, serde, thiserror
// ============================================================================

//! ## Overview
//! A negotiation attempt walks the registered drivers in their fixed order:
//! the attempt begins `Pending`, moves to `Evaluating` while candidates are
//! consulted, and terminates `Bound` with the first successful driver's
//! result or `Failed` when no driver binds. Driver-level errors are recorded
//! and the next candidate is consulted; they are never retried against the
//! same driver and never propagate as top-level failures. A failed binding is
//! a user-visible state (`binding_failed`), not an error: the port stays
//! queryable and may be renegotiated later. State application is atomic —
//! `vif_type` and `vif_details` are written together.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::AttributeMap;
use crate::core::BindingUpdateError;
use crate::core::DriverId;
use crate::core::PortBindingState;
use crate::core::PortId;
use crate::core::VifDetails;
use crate::core::VifType;
use crate::interfaces::BindingRequest;
use crate::interfaces::BindingStateStore;
use crate::interfaces::DriverCatalog;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Attempt Records
// ============================================================================

/// Phase of a negotiation attempt.
///
/// Attempts move `Pending -> Evaluating -> {Bound, Failed}`; the two final
/// phases are terminal for the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationPhase {
    /// Attempt created, no candidate consulted yet.
    Pending,
    /// Candidates are being consulted in order.
    Evaluating,
    /// A driver produced a binding.
    Bound,
    /// No driver produced a binding.
    Failed,
}

impl NegotiationPhase {
    /// Returns true for the terminal phases.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Bound | Self::Failed)
    }
}

/// Outcome of consulting one driver candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriverAttemptOutcome {
    /// Driver does not support the request.
    Skipped,
    /// Driver supports the request but its bind call failed.
    Failed {
        /// Driver-reported failure reason.
        reason: String,
    },
    /// Driver produced the binding.
    Bound,
}

/// One consulted candidate within a negotiation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverAttempt {
    /// Driver that was consulted.
    pub driver_id: DriverId,
    /// What happened when it was consulted.
    pub outcome: DriverAttemptOutcome,
}

/// Final outcome of a negotiation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NegotiationOutcome {
    /// The named driver bound the port.
    Bound {
        /// Driver that produced the binding.
        driver_id: DriverId,
        /// Negotiated VIF type.
        vif_type: VifType,
        /// Negotiated VIF details.
        vif_details: VifDetails,
    },
    /// No driver bound the port.
    Failed,
}

/// Audit record for one negotiation attempt.
///
/// # Invariants
/// - `attempts` lists every candidate in consultation order.
/// - `phase` is terminal and consistent with `outcome`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationRecord {
    /// Request the attempt ran with.
    pub request: BindingRequest,
    /// Terminal phase of the attempt.
    pub phase: NegotiationPhase,
    /// Per-candidate consultation log.
    pub attempts: Vec<DriverAttempt>,
    /// Final outcome.
    pub outcome: NegotiationOutcome,
}

impl NegotiationRecord {
    /// Applies the attempt's outcome to binding state.
    ///
    /// `vif_type` and `vif_details` are written together; a failed attempt
    /// sets `binding_failed` and clears the details.
    pub fn apply_to(&self, state: &mut PortBindingState) {
        match &self.outcome {
            NegotiationOutcome::Bound {
                vif_type,
                vif_details,
                ..
            } => {
                state.vif_type = vif_type.clone();
                state.vif_details = vif_details.clone();
            }
            NegotiationOutcome::Failed => {
                state.vif_type = VifType::BindingFailed;
                state.vif_details.clear();
            }
        }
    }
}

// ============================================================================
// SECTION: Negotiator
// ============================================================================

/// Deterministic first-match driver negotiator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingNegotiator;

impl BindingNegotiator {
    /// Creates a negotiator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs one negotiation attempt over the catalog's candidates.
    ///
    /// Deterministic: unchanged inputs and an unchanged driver set yield an
    /// identical record.
    #[must_use]
    pub fn negotiate(
        &self,
        request: BindingRequest,
        catalog: &dyn DriverCatalog,
    ) -> NegotiationRecord {
        let mut attempts = Vec::new();
        let mut bound = None;

        for candidate in catalog.candidates() {
            if !candidate.driver.supports(&request) {
                attempts.push(DriverAttempt {
                    driver_id: candidate.driver_id.clone(),
                    outcome: DriverAttemptOutcome::Skipped,
                });
                continue;
            }
            match candidate.driver.bind(&request) {
                Ok(outcome) => {
                    attempts.push(DriverAttempt {
                        driver_id: candidate.driver_id.clone(),
                        outcome: DriverAttemptOutcome::Bound,
                    });
                    bound = Some(NegotiationOutcome::Bound {
                        driver_id: candidate.driver_id.clone(),
                        vif_type: outcome.vif_type,
                        vif_details: outcome.vif_details,
                    });
                    break;
                }
                Err(err) => attempts.push(DriverAttempt {
                    driver_id: candidate.driver_id.clone(),
                    outcome: DriverAttemptOutcome::Failed {
                        reason: err.to_string(),
                    },
                }),
            }
        }

        let (phase, outcome) = match bound {
            Some(outcome) => (NegotiationPhase::Bound, outcome),
            None => (NegotiationPhase::Failed, NegotiationOutcome::Failed),
        };
        NegotiationRecord {
            request,
            phase,
            attempts,
            outcome,
        }
    }
}

// ============================================================================
// SECTION: Negotiation Service
// ============================================================================

/// Errors surfaced by the negotiation service.
///
/// A failed binding is not among them: `binding_failed` is an ordinary
/// outcome carried in the [`NegotiationRecord`].
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// Port already has binding state.
    #[error("port already exists: {0}")]
    PortAlreadyExists(String),
    /// Binding state store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Payload could not be applied to binding state.
    #[error(transparent)]
    Update(#[from] BindingUpdateError),
}

/// Result of applying a screened payload to a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadApplied {
    /// Post-update binding state snapshot.
    pub state: PortBindingState,
    /// Negotiation record when the update triggered renegotiation.
    pub negotiation: Option<NegotiationRecord>,
}

/// Negotiation service composing a state store with the negotiator.
///
/// All mutation runs inside the store's per-port update lock, so concurrent
/// requests for one port serialize while different ports proceed in parallel.
#[derive(Debug)]
pub struct NegotiationService<S> {
    /// Binding state store.
    store: S,
    /// Driver negotiator.
    negotiator: BindingNegotiator,
}

impl<S> NegotiationService<S>
where
    S: BindingStateStore,
{
    /// Creates a service over a binding state store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            negotiator: BindingNegotiator::new(),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Creates unbound binding state for a new port.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError::PortAlreadyExists`] when state exists, or a
    /// store error.
    pub fn create_port(&self, port_id: PortId) -> Result<PortBindingState, NegotiationError> {
        if self.store.load(&port_id)?.is_some() {
            return Err(NegotiationError::PortAlreadyExists(port_id.to_string()));
        }
        let state = PortBindingState::new(port_id);
        self.store.save(&state)?;
        Ok(state)
    }

    /// Runs a negotiation attempt for a port and applies the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError`] when the port is unknown or the store
    /// fails.
    pub fn negotiate(
        &self,
        port_id: &PortId,
        catalog: &dyn DriverCatalog,
    ) -> Result<NegotiationRecord, NegotiationError> {
        let mut record = None;
        self.store.update(port_id, &mut |state| {
            let request = BindingRequest::from_state(state);
            let attempt = self.negotiator.negotiate(request, catalog);
            attempt.apply_to(state);
            record = Some(attempt);
        })?;
        record.ok_or_else(|| {
            NegotiationError::Store(StoreError::Store(
                "store update completed without applying the negotiation".to_string(),
            ))
        })
    }

    /// Applies a screened payload to a port, renegotiating when the update
    /// changed the host or vNIC type.
    ///
    /// The payload is applied to a copy and committed only when it applies
    /// cleanly, so readers never observe a partial update. Application and
    /// renegotiation run under the same per-port lock.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError`] when the port is unknown, the payload
    /// cannot be applied, or the store fails.
    pub fn apply_payload(
        &self,
        port_id: &PortId,
        payload: &AttributeMap,
        catalog: &dyn DriverCatalog,
    ) -> Result<PayloadApplied, NegotiationError> {
        let mut applied: Result<Option<NegotiationRecord>, BindingUpdateError> = Ok(None);
        let state = self.store.update(port_id, &mut |state| {
            let mut next = state.clone();
            match next.apply_attributes(payload) {
                Ok(rebind) => {
                    let negotiation = rebind.then(|| {
                        let request = BindingRequest::from_state(&next);
                        let attempt = self.negotiator.negotiate(request, catalog);
                        attempt.apply_to(&mut next);
                        attempt
                    });
                    *state = next;
                    applied = Ok(negotiation);
                }
                Err(err) => applied = Err(err),
            }
        })?;
        let negotiation = applied?;
        Ok(PayloadApplied {
            state,
            negotiation,
        })
    }
}
