// port-binding-drivers/src/sriov.rs
// ============================================================================
// Module: SR-IOV Binding Driver
// Description: Binding driver for direct and direct-physical ports.
// Purpose: Produce hw_veb and hostdev_physical VIFs from profile PCI addressing.
// Dependencies: port-binding-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The SR-IOV driver serves `direct` and `direct-physical` vNIC ports on a
//! known host. Virtual functions bind as `hw_veb` and carry the profile's
//! `vf_pci_slot` plus the configured VLAN; physical functions bind as
//! `hostdev_physical` from the profile's `pf_pci_slot`. Missing PCI
//! addressing is a driver-level bind failure, letting negotiation fall
//! through to another candidate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use port_binding_core::BindOutcome;
use port_binding_core::BindingDriver;
use port_binding_core::BindingRequest;
use port_binding_core::DriverError;
use port_binding_core::VifDetails;
use port_binding_core::VifType;
use port_binding_core::VnicType;
use port_binding_core::binding;
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the SR-IOV driver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SriovDriverConfig {
    /// VLAN declared in VIF details for virtual-function ports.
    pub vlan: u16,
}

impl Default for SriovDriverConfig {
    fn default() -> Self {
        Self {
            vlan: 0,
        }
    }
}

// ============================================================================
// SECTION: Driver Implementation
// ============================================================================

/// Binding driver for SR-IOV backends.
#[derive(Debug)]
pub struct SriovDriver {
    /// Driver configuration.
    config: SriovDriverConfig,
}

impl SriovDriver {
    /// Creates a new SR-IOV driver with the given configuration.
    #[must_use]
    pub const fn new(config: SriovDriverConfig) -> Self {
        Self {
            config,
        }
    }
}

impl BindingDriver for SriovDriver {
    fn supports(&self, request: &BindingRequest) -> bool {
        matches!(request.vnic_type, VnicType::Direct | VnicType::DirectPhysical)
            && request.host_id.is_some()
    }

    fn bind(&self, request: &BindingRequest) -> Result<BindOutcome, DriverError> {
        match request.vnic_type {
            VnicType::Direct => {
                let pci_slot = profile_string(request, "vf_pci_slot")?;
                let mut vif_details = VifDetails::new();
                vif_details.insert(binding::PORT_FILTER.to_string(), Value::Bool(false));
                vif_details.insert(
                    binding::VLAN.to_string(),
                    Value::String(self.config.vlan.to_string()),
                );
                vif_details.insert("pci_slot".to_string(), Value::String(pci_slot));
                Ok(BindOutcome {
                    vif_type: VifType::HwVeb,
                    vif_details,
                })
            }
            VnicType::DirectPhysical => {
                let pci_slot = profile_string(request, "pf_pci_slot")?;
                let mut vif_details = VifDetails::new();
                vif_details.insert("pci_slot".to_string(), Value::String(pci_slot));
                Ok(BindOutcome {
                    vif_type: VifType::HostdevPhysical,
                    vif_details,
                })
            }
            _ => Err(DriverError::Bind(format!(
                "vnic type not served by sriov: {}",
                request.vnic_type
            ))),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a required string value out of the request profile.
fn profile_string(request: &BindingRequest, key: &str) -> Result<String, DriverError> {
    match request.profile.get(key) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(DriverError::Bind(format!("profile key {key} must be a string"))),
        None => Err(DriverError::Bind(format!("profile missing required key: {key}"))),
    }
}
