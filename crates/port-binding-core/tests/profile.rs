// port-binding-core/tests/profile.rs
// ============================================================================
// Module: Profile Codec Tests
// Description: Tests for profile decoding against constraint sets.
// Purpose: Ensure profile payloads fail closed on unknown or malformed keys.
// Dependencies: port-binding-core, serde_json
// ============================================================================
//! ## Overview
//! Exercises the profile codec over the SR-IOV reference constraints and over
//! custom sets with required and must-be-omitted keys.

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

use std::collections::BTreeMap;

use port_binding_core::ProfileConstraint;
use port_binding_core::ProfileConstraintSet;
use port_binding_core::ProfileViolation;
use port_binding_core::runtime::ProfileCodec;
use port_binding_core::sriov_profile_constraints;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn sriov_codec() -> ProfileCodec {
    ProfileCodec::new(&sriov_profile_constraints()).expect("codec")
}

// ============================================================================
// SECTION: Reference Constraints
// ============================================================================

#[test]
fn valid_pci_addressing_is_accepted() {
    let codec = sriov_codec();
    let profile = json!({
        "vf_pci_slot": "0000:03:00.1",
        "pf_pci_vendor_info": "8086:10ed",
        "vf_vlan_filter": "1,5-9,100",
    });

    let decoded = codec.decode(&profile).expect("accepted");
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded.get("vf_pci_slot"), Some(&json!("0000:03:00.1")));
}

#[test]
fn unknown_keys_are_rejected_by_name() {
    let codec = sriov_codec();
    let profile = json!({"vf_pci_slot": "0000:03:00.1", "bogus_key": "x"});

    let violations = codec.decode(&profile).expect_err("violations");
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        &violations[0],
        ProfileViolation::UnknownKey { key } if key == "bogus_key"
    ));
}

#[test]
fn pattern_mismatches_carry_the_pattern() {
    let codec = sriov_codec();
    let profile = json!({"vf_pci_slot": "not-a-pci-slot"});

    let violations = codec.decode(&profile).expect_err("violations");
    assert!(matches!(
        &violations[0],
        ProfileViolation::PatternMismatch { key, pattern, .. }
            if key == "vf_pci_slot" && !pattern.is_empty()
    ));
}

#[test]
fn non_string_values_do_not_match_patterns() {
    let codec = sriov_codec();
    let profile = json!({"vf_vlan_filter": 5});

    let violations = codec.decode(&profile).expect_err("violations");
    assert!(matches!(&violations[0], ProfileViolation::PatternMismatch { .. }));
}

// ============================================================================
// SECTION: Shapes and Sentinels
// ============================================================================

#[test]
fn null_decodes_to_the_empty_mapping() {
    let codec = sriov_codec();
    assert_eq!(codec.decode(&Value::Null).expect("accepted"), BTreeMap::new());
}

#[test]
fn non_mapping_values_are_rejected() {
    let codec = sriov_codec();
    for value in [json!("text"), json!(7), json!([1, 2])] {
        let violations = codec.decode(&value).expect_err("violations");
        assert_eq!(violations, vec![ProfileViolation::NotAMapping]);
    }
}

// ============================================================================
// SECTION: Required and Omitted Keys
// ============================================================================

#[test]
fn required_keys_must_be_present() {
    let mut constraints = ProfileConstraintSet::new();
    constraints.insert("interface", ProfileConstraint::required("[a-z0-9]+"));
    let codec = ProfileCodec::new(&constraints).expect("codec");

    let violations = codec.decode(&json!({})).expect_err("violations");
    assert!(matches!(
        &violations[0],
        ProfileViolation::MissingKey { key } if key == "interface"
    ));
}

#[test]
fn omit_only_keys_reject_even_null_values() {
    let mut constraints = ProfileConstraintSet::new();
    constraints.insert("reserved", ProfileConstraint::omitted());
    let codec = ProfileCodec::new(&constraints).expect("codec");

    for value in [json!(null), json!("anything")] {
        let violations = codec.decode(&json!({"reserved": value})).expect_err("violations");
        assert!(matches!(
            &violations[0],
            ProfileViolation::MustBeOmitted { key } if key == "reserved"
        ));
    }
}

// ============================================================================
// SECTION: Encoding
// ============================================================================

#[test]
fn encoding_is_the_identity_for_accepted_mappings() {
    let codec = sriov_codec();
    let profile = json!({"vf_pci_slot": "0000:03:00.1"});

    let decoded = codec.decode(&profile).expect("accepted");
    assert_eq!(ProfileCodec::encode(&decoded), profile);
}
