// port-binding-drivers/src/ovs.rs
// ============================================================================
// Module: Open vSwitch Binding Driver
// Description: Binding driver for software-switched normal ports.
// Purpose: Produce ovs or vhost-user VIFs with their plugging details.
// Dependencies: port-binding-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The Open vSwitch driver serves `normal` vNIC ports. In its default mode it
//! declares an `ovs` VIF with port-filtering and hybrid-plug details; when a
//! vhost-user socket directory is configured it declares a `vhostuser` VIF
//! instead, carrying the socket mode, path, and plug method.

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

/// Mode of the vhost-user socket declared in VIF details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VhostUserMode {
    /// Socket created by the hypervisor.
    Server,
    /// Socket created by the vswitch.
    Client,
}

impl VhostUserMode {
    /// Returns the wire string for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => binding::VHOST_USER_MODE_SERVER,
            Self::Client => binding::VHOST_USER_MODE_CLIENT,
        }
    }
}

/// vhost-user socket configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VhostUserConfig {
    /// Socket mode declared to the hypervisor.
    pub mode: VhostUserMode,
    /// Directory the vswitch creates sockets in.
    pub socket_dir: String,
}

/// Configuration for the Open vSwitch driver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OvsDriverConfig {
    /// Whether the backend provides port filtering.
    pub port_filter: bool,
    /// Whether the hybrid plugging strategy applies.
    pub hybrid_plug: bool,
    /// Integration bridge name, when declared in details.
    pub bridge_name: Option<String>,
    /// vhost-user configuration; when set, ports bind as `vhostuser`.
    pub vhost_user: Option<VhostUserConfig>,
}

impl Default for OvsDriverConfig {
    fn default() -> Self {
        Self {
            port_filter: true,
            hybrid_plug: false,
            bridge_name: None,
            vhost_user: None,
        }
    }
}

// ============================================================================
// SECTION: Driver Implementation
// ============================================================================

/// Binding driver for Open vSwitch backends.
#[derive(Debug)]
pub struct OvsDriver {
    /// Driver configuration.
    config: OvsDriverConfig,
}

impl OvsDriver {
    /// Creates a new Open vSwitch driver with the given configuration.
    #[must_use]
    pub const fn new(config: OvsDriverConfig) -> Self {
        Self {
            config,
        }
    }
}

impl BindingDriver for OvsDriver {
    fn supports(&self, request: &BindingRequest) -> bool {
        request.vnic_type == VnicType::Normal
    }

    fn bind(&self, request: &BindingRequest) -> Result<BindOutcome, DriverError> {
        if !self.supports(request) {
            return Err(DriverError::Bind(format!(
                "vnic type not served by ovs: {}",
                request.vnic_type
            )));
        }
        match &self.config.vhost_user {
            Some(vhost_user) => Ok(vhost_user_outcome(vhost_user, request)),
            None => Ok(switch_outcome(&self.config)),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the ovs VIF outcome with plugging details.
fn switch_outcome(config: &OvsDriverConfig) -> BindOutcome {
    let mut vif_details = VifDetails::new();
    vif_details.insert(binding::PORT_FILTER.to_string(), Value::Bool(config.port_filter));
    vif_details.insert(binding::OVS_HYBRID_PLUG.to_string(), Value::Bool(config.hybrid_plug));
    if let Some(bridge_name) = &config.bridge_name {
        vif_details.insert(binding::BRIDGE_NAME.to_string(), Value::String(bridge_name.clone()));
    }
    BindOutcome {
        vif_type: VifType::Ovs,
        vif_details,
    }
}

/// Builds the vhost-user VIF outcome with socket details.
fn vhost_user_outcome(vhost_user: &VhostUserConfig, request: &BindingRequest) -> BindOutcome {
    let socket = format!("{}/vhu{}", vhost_user.socket_dir, request.port_id);
    let mut vif_details = VifDetails::new();
    vif_details.insert(
        binding::VHOST_USER_MODE.to_string(),
        Value::String(vhost_user.mode.as_str().to_string()),
    );
    vif_details.insert(binding::VHOST_USER_SOCKET.to_string(), Value::String(socket));
    vif_details.insert(binding::VHOST_USER_OVS_PLUG.to_string(), Value::Bool(true));
    BindOutcome {
        vif_type: VifType::Vhostuser,
        vif_details,
    }
}
