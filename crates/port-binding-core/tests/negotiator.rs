// port-binding-core/tests/negotiator.rs
// ============================================================================
// Module: Binding Negotiator Tests
// Description: Tests for driver selection, fallback, and outcome application.
// Purpose: Ensure negotiation is deterministic and records every attempt.
// Dependencies: port-binding-core, serde_json
// ============================================================================
//! ## Overview
//! Exercises first-match driver selection, fall-through on driver errors,
//! failure recording, and atomic application of outcomes to binding state.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use port_binding_core::BindOutcome;
use port_binding_core::BindingDriver;
use port_binding_core::BindingNegotiator;
use port_binding_core::BindingRequest;
use port_binding_core::DriverAttemptOutcome;
use port_binding_core::DriverCandidate;
use port_binding_core::DriverCatalog;
use port_binding_core::DriverError;
use port_binding_core::DriverId;
use port_binding_core::HostId;
use port_binding_core::NegotiationOutcome;
use port_binding_core::NegotiationPhase;
use port_binding_core::PortBindingState;
use port_binding_core::PortId;
use port_binding_core::VifDetails;
use port_binding_core::VifType;
use port_binding_core::VnicType;
use serde_json::json;

// ============================================================================
// SECTION: Test Drivers
// ============================================================================

/// Driver scripted with fixed supports/bind behavior.
struct ScriptedDriver {
    /// vNIC types the driver claims to support.
    supported: Vec<VnicType>,
    /// Bind result: `Ok` VIF type or `Err` failure reason.
    result: Result<VifType, String>,
}

impl BindingDriver for ScriptedDriver {
    fn supports(&self, request: &BindingRequest) -> bool {
        self.supported.contains(&request.vnic_type)
    }

    fn bind(&self, _request: &BindingRequest) -> Result<BindOutcome, DriverError> {
        match &self.result {
            Ok(vif_type) => {
                let mut vif_details = VifDetails::new();
                vif_details.insert("port_filter".to_string(), json!(true));
                Ok(BindOutcome {
                    vif_type: vif_type.clone(),
                    vif_details,
                })
            }
            Err(reason) => Err(DriverError::Bind(reason.clone())),
        }
    }
}

/// Fixed-order catalog over scripted drivers.
struct ScriptedCatalog {
    /// Drivers with their identifiers, in consultation order.
    drivers: Vec<(DriverId, ScriptedDriver)>,
}

impl DriverCatalog for ScriptedCatalog {
    fn candidates(&self) -> Vec<DriverCandidate<'_>> {
        self.drivers
            .iter()
            .map(|(driver_id, driver)| DriverCandidate {
                driver_id,
                driver,
            })
            .collect()
    }
}

fn normal_request() -> BindingRequest {
    BindingRequest {
        port_id: PortId::new("port-1"),
        vnic_type: VnicType::Normal,
        host_id: Some(HostId::new("compute-7")),
        profile: std::collections::BTreeMap::new(),
    }
}

// ============================================================================
// SECTION: Driver Selection
// ============================================================================

#[test]
fn first_supporting_driver_wins() {
    let catalog = ScriptedCatalog {
        drivers: vec![
            (
                DriverId::new("sriov"),
                ScriptedDriver {
                    supported: vec![VnicType::Direct],
                    result: Ok(VifType::HwVeb),
                },
            ),
            (
                DriverId::new("ovs"),
                ScriptedDriver {
                    supported: vec![VnicType::Normal],
                    result: Ok(VifType::Ovs),
                },
            ),
        ],
    };

    let record = BindingNegotiator::new().negotiate(normal_request(), &catalog);
    assert_eq!(record.phase, NegotiationPhase::Bound);
    assert!(record.phase.is_terminal());
    assert!(matches!(
        &record.outcome,
        NegotiationOutcome::Bound { driver_id, vif_type, .. }
            if driver_id.as_str() == "ovs" && *vif_type == VifType::Ovs
    ));
    assert_eq!(record.attempts[0].outcome, DriverAttemptOutcome::Skipped);
    assert_eq!(record.attempts[1].outcome, DriverAttemptOutcome::Bound);
}

#[test]
fn failed_driver_falls_through_and_is_recorded() {
    let catalog = ScriptedCatalog {
        drivers: vec![
            (
                DriverId::new("flaky"),
                ScriptedDriver {
                    supported: vec![VnicType::Normal],
                    result: Err("agent unreachable".to_string()),
                },
            ),
            (
                DriverId::new("ovs"),
                ScriptedDriver {
                    supported: vec![VnicType::Normal],
                    result: Ok(VifType::Ovs),
                },
            ),
        ],
    };

    let record = BindingNegotiator::new().negotiate(normal_request(), &catalog);
    assert!(matches!(
        &record.outcome,
        NegotiationOutcome::Bound { driver_id, .. } if driver_id.as_str() == "ovs"
    ));
    assert!(matches!(
        &record.attempts[0].outcome,
        DriverAttemptOutcome::Failed { reason } if reason.contains("agent unreachable")
    ));
}

#[test]
fn no_capable_driver_fails_the_attempt() {
    let catalog = ScriptedCatalog {
        drivers: vec![(
            DriverId::new("ovs"),
            ScriptedDriver {
                supported: vec![VnicType::Normal],
                result: Ok(VifType::Ovs),
            },
        )],
    };
    let request = BindingRequest {
        vnic_type: VnicType::Direct,
        ..normal_request()
    };

    let record = BindingNegotiator::new().negotiate(request, &catalog);
    assert_eq!(record.phase, NegotiationPhase::Failed);
    assert_eq!(record.outcome, NegotiationOutcome::Failed);
    assert_eq!(record.attempts[0].outcome, DriverAttemptOutcome::Skipped);
}

#[test]
fn all_supporting_drivers_failing_fails_the_attempt() {
    let catalog = ScriptedCatalog {
        drivers: vec![
            (
                DriverId::new("a"),
                ScriptedDriver {
                    supported: vec![VnicType::Normal],
                    result: Err("first failure".to_string()),
                },
            ),
            (
                DriverId::new("b"),
                ScriptedDriver {
                    supported: vec![VnicType::Normal],
                    result: Err("second failure".to_string()),
                },
            ),
        ],
    };

    let record = BindingNegotiator::new().negotiate(normal_request(), &catalog);
    assert_eq!(record.outcome, NegotiationOutcome::Failed);
    assert_eq!(record.attempts.len(), 2);
    assert!(
        record
            .attempts
            .iter()
            .all(|attempt| matches!(attempt.outcome, DriverAttemptOutcome::Failed { .. }))
    );
}

// ============================================================================
// SECTION: Determinism
// ============================================================================

#[test]
fn repeated_negotiation_yields_identical_records() {
    let catalog = ScriptedCatalog {
        drivers: vec![
            (
                DriverId::new("flaky"),
                ScriptedDriver {
                    supported: vec![VnicType::Normal],
                    result: Err("agent unreachable".to_string()),
                },
            ),
            (
                DriverId::new("ovs"),
                ScriptedDriver {
                    supported: vec![VnicType::Normal],
                    result: Ok(VifType::Ovs),
                },
            ),
        ],
    };

    let negotiator = BindingNegotiator::new();
    let first = negotiator.negotiate(normal_request(), &catalog);
    let second = negotiator.negotiate(normal_request(), &catalog);
    assert_eq!(first, second);
}

// ============================================================================
// SECTION: Outcome Application
// ============================================================================

#[test]
fn bound_outcomes_write_type_and_details_together() {
    let catalog = ScriptedCatalog {
        drivers: vec![(
            DriverId::new("ovs"),
            ScriptedDriver {
                supported: vec![VnicType::Normal],
                result: Ok(VifType::Ovs),
            },
        )],
    };
    let mut state = PortBindingState::new(PortId::new("port-1"));

    let record = BindingNegotiator::new().negotiate(BindingRequest::from_state(&state), &catalog);
    record.apply_to(&mut state);
    assert_eq!(state.vif_type, VifType::Ovs);
    assert_eq!(state.vif_details.get("port_filter"), Some(&json!(true)));
}

#[test]
fn failed_outcomes_clear_previous_details() {
    let catalog = ScriptedCatalog {
        drivers: Vec::new(),
    };
    let mut state = PortBindingState::new(PortId::new("port-1"));
    state.vif_type = VifType::Ovs;
    state.vif_details.insert("port_filter".to_string(), json!(true));

    let record = BindingNegotiator::new().negotiate(BindingRequest::from_state(&state), &catalog);
    record.apply_to(&mut state);
    assert_eq!(state.vif_type, VifType::BindingFailed);
    assert!(state.vif_details.is_empty());
}
