// port-binding-core/tests/proptest_validator.rs
// ============================================================================
// Module: Validator Property-Based Tests
// Description: Property tests for validation totality and idempotence.
// Purpose: Detect panics and invariant breaks across wide payload ranges.
// ============================================================================

//! Property-based tests for validator and negotiation invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use port_binding_core::AttributeMap;
use port_binding_core::BindOutcome;
use port_binding_core::BindingDriver;
use port_binding_core::BindingNegotiator;
use port_binding_core::BindingRequest;
use port_binding_core::DriverCandidate;
use port_binding_core::DriverCatalog;
use port_binding_core::DriverError;
use port_binding_core::DriverId;
use port_binding_core::PortId;
use port_binding_core::VifDetails;
use port_binding_core::VifType;
use port_binding_core::VnicType;
use port_binding_core::Violation;
use port_binding_core::attributes::Operation;
use port_binding_core::binding_attributes;
use port_binding_core::runtime::Validator;
use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Strategies
// ============================================================================

fn binding_validator() -> Validator {
    Validator::new(&binding_attributes().expect("binding schema")).expect("validator")
}

/// Payload values drawn from valid, invalid, and oddly typed candidates.
fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(json!("normal")),
        Just(json!("direct")),
        Just(json!("warp-core")),
        Just(json!({"vf_pci_slot": "0000:03:00.1"})),
        Just(json!({"bogus_key": "x"})),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|v| Value::Number(v.into())),
        "[a-z:_]{0,24}".prop_map(Value::String),
    ]
}

/// Payload keys drawn from schema names and arbitrary strings.
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("binding:vnic_type".to_string()),
        Just("binding:host_id".to_string()),
        Just("binding:profile".to_string()),
        Just("binding:vif_type".to_string()),
        "[a-z:_]{1,24}",
    ]
}

fn payload_strategy() -> impl Strategy<Value = AttributeMap> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..6)
}

// ============================================================================
// SECTION: Validator Properties
// ============================================================================

proptest! {
    #[test]
    fn validation_never_panics_and_collects_totally(payload in payload_strategy()) {
        let validator = binding_validator();
        match validator.validate(&payload, Operation::Create) {
            Ok(normalized) => {
                // Accepted payloads re-validate to themselves.
                let again = validator.validate(&normalized, Operation::Create);
                prop_assert_eq!(again, Ok(normalized));
            }
            Err(violations) => {
                prop_assert!(!violations.is_empty());
            }
        }
    }

    #[test]
    fn unknown_keys_each_get_exactly_one_violation(keys in prop::collection::btree_set("[a-y]{1,12}", 1..5)) {
        let validator = binding_validator();
        let payload: AttributeMap =
            keys.iter().map(|key| (key.clone(), json!("x"))).collect();

        let violations = validator.validate(&payload, Operation::Update).expect_err("violations");
        let unknown: Vec<_> = violations
            .iter()
            .filter(|violation| matches!(violation, Violation::UnknownAttribute { .. }))
            .collect();
        prop_assert_eq!(unknown.len(), keys.len());
        prop_assert_eq!(violations.len(), keys.len());
    }
}

// ============================================================================
// SECTION: Negotiation Determinism
// ============================================================================

/// Driver whose behavior is derived from its identifier seed.
struct SeededDriver {
    /// Seed selecting supports/bind behavior.
    seed: u8,
}

impl BindingDriver for SeededDriver {
    fn supports(&self, request: &BindingRequest) -> bool {
        match self.seed % 3 {
            0 => request.vnic_type == VnicType::Normal,
            1 => true,
            _ => false,
        }
    }

    fn bind(&self, _request: &BindingRequest) -> Result<BindOutcome, DriverError> {
        if self.seed % 2 == 0 {
            Ok(BindOutcome {
                vif_type: VifType::Ovs,
                vif_details: VifDetails::new(),
            })
        } else {
            Err(DriverError::Bind(format!("seeded failure {}", self.seed)))
        }
    }
}

/// Catalog over seeded drivers in a fixed order.
struct SeededCatalog {
    /// Driver identifiers and implementations.
    drivers: Vec<(DriverId, SeededDriver)>,
}

impl DriverCatalog for SeededCatalog {
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

proptest! {
    #[test]
    fn negotiation_is_deterministic_for_fixed_driver_sets(seeds in prop::collection::vec(any::<u8>(), 0..6)) {
        let catalog = SeededCatalog {
            drivers: seeds
                .iter()
                .enumerate()
                .map(|(index, seed)| (DriverId::new(format!("driver-{index}")), SeededDriver { seed: *seed }))
                .collect(),
        };
        let request = BindingRequest {
            port_id: PortId::new("port-1"),
            vnic_type: VnicType::Normal,
            host_id: None,
            profile: std::collections::BTreeMap::new(),
        };

        let negotiator = BindingNegotiator::new();
        let first = negotiator.negotiate(request.clone(), &catalog);
        let second = negotiator.negotiate(request, &catalog);
        prop_assert_eq!(first, second);
    }
}
