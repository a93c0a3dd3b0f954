// port-binding-core/tests/gate.rs
// ============================================================================
// Module: Mutability Gate Tests
// Description: Tests for create/update gating, policy denials, and visibility.
// Purpose: Ensure writes and reads fail closed for unauthorized callers.
// Dependencies: port-binding-core, serde_json
// ============================================================================
//! ## Overview
//! Exercises the mutability gate, the combined payload screen, and the
//! read-side visibility projection. Authorization denials must stay distinct
//! from value violations, and policy errors must deny rather than allow.

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

use port_binding_core::AttributeMap;
use port_binding_core::AttributeName;
use port_binding_core::ForbiddenReason;
use port_binding_core::PolicyDecider;
use port_binding_core::PolicyDecision;
use port_binding_core::PolicyError;
use port_binding_core::PortBindingState;
use port_binding_core::PortId;
use port_binding_core::VifType;
use port_binding_core::Violation;
use port_binding_core::attributes;
use port_binding_core::attributes::Operation;
use port_binding_core::binding_attributes;
use port_binding_core::runtime::PayloadScreen;
use port_binding_core::runtime::authorize;
use port_binding_core::runtime::render_visible;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decider that permits every caller.
struct PermitAll;

impl PolicyDecider for PermitAll {
    fn authorize(
        &self,
        _caller: &str,
        _attribute: &AttributeName,
        _operation: Operation,
    ) -> Result<PolicyDecision, PolicyError> {
        Ok(PolicyDecision::Permit)
    }
}

/// Decider that denies every caller.
struct DenyAll;

impl PolicyDecider for DenyAll {
    fn authorize(
        &self,
        _caller: &str,
        _attribute: &AttributeName,
        _operation: Operation,
    ) -> Result<PolicyDecision, PolicyError> {
        Ok(PolicyDecision::Deny)
    }
}

/// Decider that fails on every decision.
struct BrokenDecider;

impl PolicyDecider for BrokenDecider {
    fn authorize(
        &self,
        _caller: &str,
        _attribute: &AttributeName,
        _operation: Operation,
    ) -> Result<PolicyDecision, PolicyError> {
        Err(PolicyError::DecisionFailed("policy backend unreachable".to_string()))
    }
}

fn binding_screen() -> PayloadScreen {
    PayloadScreen::new(binding_attributes().expect("binding schema")).expect("screen")
}

fn payload(entries: &[(&str, serde_json::Value)]) -> AttributeMap {
    entries.iter().map(|(key, value)| ((*key).to_string(), value.clone())).collect()
}

// ============================================================================
// SECTION: Operation Gating
// ============================================================================

#[test]
fn vif_type_is_rejected_on_create_even_with_privilege() {
    let schema = binding_attributes().expect("binding schema");
    let entry = schema.get(attributes::VIF_TYPE).expect("entry");

    let denial = authorize(entry, Operation::Create, true).expect_err("denied");
    assert!(matches!(
        denial,
        Violation::Forbidden { reason: ForbiddenReason::NotAllowedOnCreate, .. }
    ));

    let denial = authorize(entry, Operation::Update, true).expect_err("denied");
    assert!(matches!(
        denial,
        Violation::Forbidden { reason: ForbiddenReason::NotAllowedOnUpdate, .. }
    ));
}

#[test]
fn policy_gated_write_requires_privilege() {
    let schema = binding_attributes().expect("binding schema");
    let entry = schema.get(attributes::VNIC_TYPE).expect("entry");

    assert!(authorize(entry, Operation::Create, true).is_ok());
    let denial = authorize(entry, Operation::Create, false).expect_err("denied");
    assert!(matches!(
        denial,
        Violation::Forbidden { reason: ForbiddenReason::PolicyDenied, .. }
    ));
}

// ============================================================================
// SECTION: Payload Screening
// ============================================================================

#[test]
fn privileged_create_screens_to_normalized_payload() {
    let screen = binding_screen();
    let payload = payload(&[(attributes::VNIC_TYPE, json!("direct"))]);

    let normalized =
        screen.screen(&payload, Operation::Create, "admin", &PermitAll).expect("accepted");
    assert_eq!(normalized.get(attributes::VNIC_TYPE), Some(&json!("direct")));
    assert!(!normalized.contains_key(attributes::HOST_ID));
    assert!(!normalized.contains_key(attributes::PROFILE));
}

#[test]
fn denial_and_value_violations_are_reported_together() {
    let screen = binding_screen();
    let payload = payload(&[
        (attributes::VIF_TYPE, json!("ovs")),
        (attributes::VNIC_TYPE, json!("warp-core")),
    ]);

    let violations =
        screen.screen(&payload, Operation::Update, "admin", &PermitAll).expect_err("violations");
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().any(|violation| matches!(violation, Violation::Forbidden { .. })));
    assert!(violations.iter().any(|violation| matches!(violation, Violation::InvalidValue { .. })));
}

#[test]
fn unprivileged_writes_are_forbidden_not_invalid() {
    let screen = binding_screen();
    let payload = payload(&[(attributes::VNIC_TYPE, json!("direct"))]);

    let violations =
        screen.screen(&payload, Operation::Create, "guest", &DenyAll).expect_err("violations");
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        &violations[0],
        Violation::Forbidden { reason: ForbiddenReason::PolicyDenied, .. }
    ));
}

#[test]
fn policy_errors_deny_rather_than_allow() {
    let screen = binding_screen();
    let payload = payload(&[(attributes::HOST_ID, json!("compute-7"))]);

    let violations = screen
        .screen(&payload, Operation::Update, "admin", &BrokenDecider)
        .expect_err("violations");
    assert!(matches!(
        &violations[0],
        Violation::Forbidden { reason: ForbiddenReason::PolicyDenied, .. }
    ));
}

// ============================================================================
// SECTION: Visibility Projection
// ============================================================================

#[test]
fn policy_gated_attributes_are_hidden_from_unprivileged_readers() {
    let schema = binding_attributes().expect("binding schema");
    let state = PortBindingState::new(PortId::new("port-1"));

    let visible = render_visible(&state, &schema, false);
    assert!(visible.is_empty());

    let visible = render_visible(&state, &schema, true);
    assert_eq!(visible.get(attributes::VIF_TYPE), Some(&json!("unbound")));
    assert_eq!(visible.get(attributes::VNIC_TYPE), Some(&json!("normal")));
    assert_eq!(visible.get(attributes::HOST_ID), Some(&json!(null)));
}

#[test]
fn rendered_state_reflects_negotiated_binding() {
    let schema = binding_attributes().expect("binding schema");
    let mut state = PortBindingState::new(PortId::new("port-1"));
    state.vif_type = VifType::Ovs;
    state.vif_details.insert("port_filter".to_string(), json!(true));

    let visible = render_visible(&state, &schema, true);
    assert_eq!(visible.get(attributes::VIF_TYPE), Some(&json!("ovs")));
    assert_eq!(visible.get(attributes::VIF_DETAILS), Some(&json!({"port_filter": true})));
}
