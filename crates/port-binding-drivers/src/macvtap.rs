// port-binding-drivers/src/macvtap.rs
// ============================================================================
// Module: Macvtap Binding Driver
// Description: Binding driver for macvtap-attached ports.
// Purpose: Produce macvtap VIFs with their source-interface details.
// Dependencies: port-binding-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The macvtap driver serves `macvtap` vNIC ports on a known host, declaring
//! the source interface, macvtap mode, and backing physical interface in the
//! VIF details.

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

/// Macvtap operating mode declared in VIF details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MacvtapMode {
    /// Frames switch between endpoints on the same interface.
    #[default]
    Bridge,
    /// Frames hairpin through the adjacent switch.
    Vepa,
    /// Interface is passed through exclusively.
    Passthru,
}

impl MacvtapMode {
    /// Returns the wire string for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bridge => "bridge",
            Self::Vepa => "vepa",
            Self::Passthru => "passthru",
        }
    }
}

/// Configuration for the macvtap driver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MacvtapDriverConfig {
    /// Physical interface backing macvtap attachments.
    pub physical_interface: String,
    /// Macvtap operating mode.
    pub mode: MacvtapMode,
}

impl Default for MacvtapDriverConfig {
    fn default() -> Self {
        Self {
            physical_interface: "eth0".to_string(),
            mode: MacvtapMode::default(),
        }
    }
}

// ============================================================================
// SECTION: Driver Implementation
// ============================================================================

/// Binding driver for macvtap backends.
#[derive(Debug)]
pub struct MacvtapDriver {
    /// Driver configuration.
    config: MacvtapDriverConfig,
}

impl MacvtapDriver {
    /// Creates a new macvtap driver with the given configuration.
    #[must_use]
    pub const fn new(config: MacvtapDriverConfig) -> Self {
        Self {
            config,
        }
    }
}

impl BindingDriver for MacvtapDriver {
    fn supports(&self, request: &BindingRequest) -> bool {
        request.vnic_type == VnicType::Macvtap && request.host_id.is_some()
    }

    fn bind(&self, request: &BindingRequest) -> Result<BindOutcome, DriverError> {
        if !self.supports(request) {
            return Err(DriverError::Bind(format!(
                "vnic type not served by macvtap: {}",
                request.vnic_type
            )));
        }
        let mut vif_details = VifDetails::new();
        vif_details.insert(
            binding::MACVTAP_SOURCE.to_string(),
            Value::String(self.config.physical_interface.clone()),
        );
        vif_details.insert(
            binding::MACVTAP_MODE.to_string(),
            Value::String(self.config.mode.as_str().to_string()),
        );
        vif_details.insert(
            binding::PHYSICAL_INTERFACE.to_string(),
            Value::String(self.config.physical_interface.clone()),
        );
        Ok(BindOutcome {
            vif_type: VifType::Macvtap,
            vif_details,
        })
    }
}
