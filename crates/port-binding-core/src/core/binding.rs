// port-binding-core/src/core/binding.rs
// ============================================================================
// Module: Port Binding State
// Description: vNIC types, VIF types, VIF detail keys, and per-port binding state.
// Purpose: Capture the evolving binding of a port with stable wire strings.
// Dependencies: crate::core::identifiers, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A port binding associates a virtual port with a concrete backend VIF. The
//! requested vNIC type constrains which drivers may serve the port; the VIF
//! type and VIF details are the negotiated result and are read-only to
//! callers. `vif_type` and `vif_details` always change together.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::attributes;
use crate::core::identifiers::HostId;
use crate::core::identifiers::PortId;

// ============================================================================
// SECTION: VIF Detail Keys
// ============================================================================

/// Detail key: whether the backend provides port filtering (security groups,
/// anti MAC/IP spoofing).
pub const PORT_FILTER: &str = "port_filter";
/// Detail key: whether the hybrid plugging strategy for Open vSwitch applies.
pub const OVS_HYBRID_PLUG: &str = "ovs_hybrid_plug";
/// Detail key: VLAN identifier assigned to the VIF.
pub const VLAN: &str = "vlan";
/// Detail key: source interface for a macvtap VIF.
pub const MACVTAP_SOURCE: &str = "macvtap_source";
/// Detail key: macvtap operating mode.
pub const MACVTAP_MODE: &str = "macvtap_mode";
/// Detail key: physical interface backing the VIF.
pub const PHYSICAL_INTERFACE: &str = "physical_interface";
/// Detail key: bridge the VIF is attached to.
pub const BRIDGE_NAME: &str = "bridge_name";
/// Detail key: mode of a vhost-user socket.
pub const VHOST_USER_MODE: &str = "vhostuser_mode";
/// vhost-user mode value: socket created by the hypervisor.
pub const VHOST_USER_MODE_SERVER: &str = "server";
/// vhost-user mode value: socket created by the vswitch.
pub const VHOST_USER_MODE_CLIENT: &str = "client";
/// Detail key: vhost-user socket path.
pub const VHOST_USER_SOCKET: &str = "vhostuser_socket";
/// Detail key: whether the Open vSwitch plug method applies to the vhost-user VIF.
pub const VHOST_USER_OVS_PLUG: &str = "vhostuser_ovs_plug";

// ============================================================================
// SECTION: vNIC Types
// ============================================================================

/// Requested vNIC kind constraining which drivers can serve a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VnicType {
    /// Standard virtual interface served by software switches.
    #[default]
    Normal,
    /// SR-IOV virtual function passed through to the instance.
    Direct,
    /// Macvtap attachment on the host.
    Macvtap,
    /// Bare-metal attachment.
    Baremetal,
    /// SR-IOV physical function passed through to the instance.
    #[serde(rename = "direct-physical")]
    DirectPhysical,
}

impl VnicType {
    /// All vNIC types in declaration order.
    pub const ALL: [Self; 5] =
        [Self::Normal, Self::Direct, Self::Macvtap, Self::Baremetal, Self::DirectPhysical];

    /// Returns the stable wire string for the vNIC type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Direct => "direct",
            Self::Macvtap => "macvtap",
            Self::Baremetal => "baremetal",
            Self::DirectPhysical => "direct-physical",
        }
    }

    /// Returns the wire strings of every vNIC type, in declaration order.
    #[must_use]
    pub fn wire_names() -> Vec<String> {
        Self::ALL.iter().map(|vnic| vnic.as_str().to_string()).collect()
    }
}

impl fmt::Display for VnicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown vNIC type string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown vnic type: {0}")]
pub struct UnknownVnicType(pub String);

impl FromStr for VnicType {
    type Err = UnknownVnicType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|vnic| vnic.as_str() == value)
            .ok_or_else(|| UnknownVnicType(value.to_string()))
    }
}

// ============================================================================
// SECTION: VIF Types
// ============================================================================

/// Negotiated VIF kind reported back to callers.
///
/// The set is open: drivers may declare VIF types beyond the built-in ones,
/// which round-trip through [`VifType::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VifType {
    /// No binding has been negotiated yet.
    Unbound,
    /// Negotiation ran and no driver produced a binding.
    BindingFailed,
    /// Distributed virtual routing attachment.
    Distributed,
    /// Open vSwitch attachment.
    Ovs,
    /// Linux bridge attachment.
    Bridge,
    /// Macvtap attachment.
    Macvtap,
    /// SR-IOV hardware virtual embedded bridge.
    HwVeb,
    /// SR-IOV physical-function host device.
    HostdevPhysical,
    /// vhost-user socket attachment.
    Vhostuser,
    /// Backend-specific attachment with no dedicated wire string.
    Other,
    /// Driver-defined VIF type outside the built-in set.
    Custom(String),
}

impl VifType {
    /// Returns the stable wire string for the VIF type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unbound => "unbound",
            Self::BindingFailed => "binding_failed",
            Self::Distributed => "distributed",
            Self::Ovs => "ovs",
            Self::Bridge => "bridge",
            Self::Macvtap => "macvtap",
            Self::HwVeb => "hw_veb",
            Self::HostdevPhysical => "hostdev_physical",
            Self::Vhostuser => "vhostuser",
            Self::Other => "other",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for VifType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for VifType {
    fn from(value: &str) -> Self {
        match value {
            "unbound" => Self::Unbound,
            "binding_failed" => Self::BindingFailed,
            "distributed" => Self::Distributed,
            "ovs" => Self::Ovs,
            "bridge" => Self::Bridge,
            "macvtap" => Self::Macvtap,
            "hw_veb" => Self::HwVeb,
            "hostdev_physical" => Self::HostdevPhysical,
            "vhostuser" => Self::Vhostuser,
            "other" => Self::Other,
            _ => Self::Custom(value.to_string()),
        }
    }
}

impl From<String> for VifType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<VifType> for String {
    fn from(value: VifType) -> Self {
        value.as_str().to_string()
    }
}

// ============================================================================
// SECTION: Binding State
// ============================================================================

/// Driver-populated details describing the negotiated VIF.
pub type VifDetails = BTreeMap<String, Value>;

/// The evolving binding state of a single port.
///
/// # Invariants
/// - `vif_type` and `vif_details` are written together, never independently.
/// - A change to `host_id` or `vnic_type` invalidates the current binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBindingState {
    /// Port identifier owning this binding.
    pub port_id: PortId,
    /// Requested vNIC type.
    pub vnic_type: VnicType,
    /// Negotiated VIF type.
    pub vif_type: VifType,
    /// Driver-populated VIF details, read-only to callers.
    pub vif_details: VifDetails,
    /// Physical host the port is bound to, when known.
    pub host_id: Option<HostId>,
    /// Caller-supplied driver profile, validated by the profile codec.
    pub profile: BTreeMap<String, Value>,
}

impl PortBindingState {
    /// Creates an unbound state for a port with the default vNIC type.
    #[must_use]
    pub fn new(port_id: PortId) -> Self {
        Self {
            port_id,
            vnic_type: VnicType::default(),
            vif_type: VifType::Unbound,
            vif_details: VifDetails::new(),
            host_id: None,
            profile: BTreeMap::new(),
        }
    }

    /// Applies a normalized attribute payload to the binding state.
    ///
    /// Returns true when the update changed `host_id` or `vnic_type`, which
    /// invalidates any existing binding and requires renegotiation.
    ///
    /// # Errors
    ///
    /// Returns [`BindingUpdateError`] when a payload value has a type the
    /// binding fields cannot hold. Payloads screened by the validator do not
    /// trigger this.
    pub fn apply_attributes(
        &mut self,
        payload: &BTreeMap<String, Value>,
    ) -> Result<bool, BindingUpdateError> {
        let mut rebind = false;

        if let Some(value) = payload.get(attributes::VNIC_TYPE) {
            let Value::String(raw) = value else {
                return Err(BindingUpdateError::UnexpectedType {
                    attribute: attributes::VNIC_TYPE.to_string(),
                });
            };
            let vnic = VnicType::from_str(raw).map_err(BindingUpdateError::UnknownVnicType)?;
            if vnic != self.vnic_type {
                self.vnic_type = vnic;
                rebind = true;
            }
        }

        if let Some(value) = payload.get(attributes::HOST_ID) {
            let host = match value {
                Value::Null => None,
                Value::String(raw) => Some(HostId::new(raw.clone())),
                _ => {
                    return Err(BindingUpdateError::UnexpectedType {
                        attribute: attributes::HOST_ID.to_string(),
                    });
                }
            };
            if host != self.host_id {
                self.host_id = host;
                rebind = true;
            }
        }

        if let Some(value) = payload.get(attributes::PROFILE) {
            let profile = match value {
                Value::Null => BTreeMap::new(),
                Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                _ => {
                    return Err(BindingUpdateError::UnexpectedType {
                        attribute: attributes::PROFILE.to_string(),
                    });
                }
            };
            self.profile = profile;
        }

        Ok(rebind)
    }
}

/// Errors applying a payload to binding state.
#[derive(Debug, Error)]
pub enum BindingUpdateError {
    /// Payload carried a vNIC type outside the declared set.
    #[error(transparent)]
    UnknownVnicType(#[from] UnknownVnicType),
    /// Payload value has a type the binding field cannot hold.
    #[error("attribute {attribute} has an unexpected value type")]
    UnexpectedType {
        /// Attribute whose value was malformed.
        attribute: String,
    },
}
